//! Mock HTTP client for testing.
//!
//! Provides a scriptable transport that returns predefined byte streams,
//! transport errors, or a live stream driven by the test itself.

use async_trait::async_trait;
use bytes::Bytes;
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::mpsc;

use crate::traits::{ByteStream, Headers, HttpClient, HttpError};

/// A recorded HTTP request for verification in tests.
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    /// HTTP method
    pub method: String,
    /// Request URL
    pub url: String,
    /// Request headers
    pub headers: Headers,
    /// Request body
    pub body: String,
}

type LiveItem = Result<Bytes, HttpError>;

/// Receiving half of a live response; consumed by the first request served.
#[derive(Debug, Clone)]
pub struct LiveStream {
    receiver: Arc<Mutex<Option<mpsc::UnboundedReceiver<LiveItem>>>>,
}

/// Test-side handle that feeds a [`LiveStream`].
#[derive(Debug, Clone)]
pub struct LiveSender {
    tx: mpsc::UnboundedSender<LiveItem>,
}

impl LiveSender {
    /// Deliver one body chunk. Returns false once the body reader is gone
    /// (for example after the session was cancelled).
    pub fn send(&self, chunk: impl Into<Bytes>) -> bool {
        self.tx.send(Ok(chunk.into())).is_ok()
    }

    /// Fail the body with a transport error.
    pub fn fail(&self, err: HttpError) -> bool {
        self.tx.send(Err(err)).is_ok()
    }

    /// Whether the body reader has gone away.
    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}

/// Configuration for a mock response.
#[derive(Debug, Clone)]
pub enum MockResponse {
    /// Deliver these chunks, then end the body cleanly
    Stream(Vec<Bytes>),
    /// Deliver these chunks, then fail the body
    StreamThenError(Vec<Bytes>, HttpError),
    /// Fail before any body (connection error or non-2xx status)
    Error(HttpError),
    /// Body driven chunk by chunk through a [`LiveSender`]; it ends when every
    /// sender is dropped
    Live(LiveStream),
    /// Wait before answering with the inner response
    Delayed(Duration, Box<MockResponse>),
}

impl MockResponse {
    /// Create a live response and the sender that drives it.
    pub fn live() -> (MockResponse, LiveSender) {
        let (tx, rx) = mpsc::unbounded_channel();
        let stream = LiveStream {
            receiver: Arc::new(Mutex::new(Some(rx))),
        };
        (MockResponse::Live(stream), LiveSender { tx })
    }

    /// Convenience for a body made of string chunks.
    pub fn chunks<I, S>(chunks: I) -> MockResponse
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        MockResponse::Stream(
            chunks
                .into_iter()
                .map(|c| Bytes::from(c.into()))
                .collect(),
        )
    }
}

/// Mock HTTP client for testing.
///
/// Responses are queued per URL: each request takes the next queued response,
/// and the last one is reused once the queue is down to a single entry.
///
/// # Example
///
/// ```ignore
/// use mindflow::adapters::mock::{MockHttpClient, MockResponse};
///
/// let client = MockHttpClient::new();
/// client.set_response(
///     "http://localhost:8000/api/search",
///     MockResponse::chunks(["data: {\"event\":\"end\"}\n\n"]),
/// );
/// ```
#[derive(Debug, Clone, Default)]
pub struct MockHttpClient {
    /// Queued responses by URL pattern
    responses: Arc<Mutex<HashMap<String, VecDeque<MockResponse>>>>,
    /// Default response when no specific match
    default_response: Arc<Mutex<Option<MockResponse>>>,
    /// Recorded requests for verification
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
}

impl MockHttpClient {
    /// Create a new mock HTTP client.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the responses for `url` with a single response.
    pub fn set_response(&self, url: &str, response: MockResponse) {
        let mut responses = self.responses.lock().unwrap();
        responses.insert(url.to_string(), VecDeque::from([response]));
    }

    /// Queue another response for `url`.
    pub fn push_response(&self, url: &str, response: MockResponse) {
        let mut responses = self.responses.lock().unwrap();
        responses
            .entry(url.to_string())
            .or_default()
            .push_back(response);
    }

    /// Set a default response for URLs without specific matches.
    pub fn set_default_response(&self, response: MockResponse) {
        let mut default = self.default_response.lock().unwrap();
        *default = Some(response);
    }

    /// Get all recorded requests.
    pub fn get_requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().unwrap().clone()
    }

    /// Clear all recorded requests.
    pub fn clear_requests(&self) {
        self.requests.lock().unwrap().clear();
    }

    fn record_request(&self, method: &str, url: &str, headers: &Headers, body: &str) {
        let mut requests = self.requests.lock().unwrap();
        requests.push(RecordedRequest {
            method: method.to_string(),
            url: url.to_string(),
            headers: headers.clone(),
            body: body.to_string(),
        });
    }

    /// Take the response for a URL.
    fn next_response(&self, url: &str) -> Option<MockResponse> {
        let mut responses = self.responses.lock().unwrap();

        // First try exact match, then prefix match (for URL patterns)
        let key = if responses.contains_key(url) {
            Some(url.to_string())
        } else {
            responses
                .keys()
                .find(|pattern| url.starts_with(pattern.as_str()))
                .cloned()
        };

        if let Some(queue) = key.as_ref().and_then(|k| responses.get_mut(k)) {
            if queue.len() > 1 {
                return queue.pop_front();
            }
            if let Some(response) = queue.front() {
                return Some(response.clone());
            }
        }
        drop(responses);

        // Finally use default
        let default = self.default_response.lock().unwrap();
        default.clone()
    }
}

async fn serve(response: MockResponse) -> Result<ByteStream, HttpError> {
    let mut response = response;
    while let MockResponse::Delayed(delay, inner) = response {
        tokio::time::sleep(delay).await;
        response = *inner;
    }

    match response {
        MockResponse::Stream(chunks) => Ok(Box::pin(futures::stream::iter(
            chunks.into_iter().map(Ok),
        ))),
        MockResponse::StreamThenError(chunks, err) => {
            let items: Vec<LiveItem> = chunks
                .into_iter()
                .map(Ok)
                .chain(std::iter::once(Err(err)))
                .collect();
            Ok(Box::pin(futures::stream::iter(items)))
        }
        MockResponse::Error(err) => Err(err),
        MockResponse::Live(live) => {
            let receiver = live
                .receiver
                .lock()
                .unwrap()
                .take()
                .ok_or_else(|| HttpError::Other("Live stream already consumed".to_string()))?;
            Ok(Box::pin(futures::stream::unfold(receiver, |mut rx| async move {
                rx.recv().await.map(|item| (item, rx))
            })))
        }
        MockResponse::Delayed(..) => unreachable!("delays are unwrapped above"),
    }
}

#[async_trait]
impl HttpClient for MockHttpClient {
    async fn post_stream(
        &self,
        url: &str,
        body: &str,
        headers: &Headers,
    ) -> Result<ByteStream, HttpError> {
        self.record_request("POST", url, headers, body);

        match self.next_response(url) {
            Some(response) => serve(response).await,
            None => Err(HttpError::Other(format!("No mock response for URL: {}", url))),
        }
    }
}
