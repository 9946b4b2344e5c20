//! Reqwest-based HTTP client adapter.
//!
//! This module provides the production transport implementation using reqwest,
//! implementing the [`HttpClient`] trait from `crate::traits`.

use async_trait::async_trait;
use futures_util::StreamExt;
use std::time::Duration;

use crate::config::SearchConfig;
use crate::traits::{ByteStream, Headers, HttpClient, HttpError};

/// HTTP client implementation using reqwest.
///
/// # Example
///
/// ```ignore
/// use mindflow::adapters::ReqwestHttpClient;
/// use mindflow::config::SearchConfig;
///
/// let client = ReqwestHttpClient::from_config(&SearchConfig::from_env())?;
/// ```
#[derive(Debug, Clone)]
pub struct ReqwestHttpClient {
    client: reqwest::Client,
    /// Longest allowed gap between body chunks
    idle_timeout: Option<Duration>,
}

impl ReqwestHttpClient {
    /// Create a new ReqwestHttpClient with default settings.
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
            idle_timeout: None,
        }
    }

    /// Create a new ReqwestHttpClient with a custom reqwest::Client.
    pub fn with_client(client: reqwest::Client) -> Self {
        Self {
            client,
            idle_timeout: None,
        }
    }

    /// Build a client with the transport settings of `config`.
    ///
    /// No overall request timeout is set: a search body stays open for as
    /// long as the backend keeps streaming.
    pub fn from_config(config: &SearchConfig) -> Result<Self, HttpError> {
        let client = reqwest::Client::builder()
            .connect_timeout(config.connect_timeout)
            .build()
            .map_err(|e| HttpError::Other(e.to_string()))?;

        Ok(Self {
            client,
            idle_timeout: config.idle_timeout,
        })
    }

    /// Set the idle timeout between body chunks.
    pub fn with_idle_timeout(mut self, timeout: Duration) -> Self {
        self.idle_timeout = Some(timeout);
        self
    }

    /// Get a reference to the underlying reqwest::Client.
    pub fn inner(&self) -> &reqwest::Client {
        &self.client
    }

    /// Convert a reqwest error raised before the body started.
    fn convert_error(err: reqwest::Error) -> HttpError {
        if err.is_timeout() {
            HttpError::Timeout(err.to_string())
        } else if err.is_connect() {
            HttpError::ConnectionFailed(err.to_string())
        } else if err.is_builder() {
            HttpError::InvalidUrl(err.to_string())
        } else {
            HttpError::Other(err.to_string())
        }
    }

    /// Convert a reqwest error raised while reading the body.
    fn convert_body_error(err: reqwest::Error) -> HttpError {
        if err.is_timeout() {
            HttpError::Timeout(err.to_string())
        } else {
            HttpError::Io(err.to_string())
        }
    }

    /// Apply headers to a request builder.
    fn apply_headers(
        builder: reqwest::RequestBuilder,
        headers: &Headers,
    ) -> reqwest::RequestBuilder {
        let mut builder = builder;
        for (key, value) in headers {
            builder = builder.header(key, value);
        }
        builder
    }
}

impl Default for ReqwestHttpClient {
    fn default() -> Self {
        Self::new()
    }
}

/// End the stream with [`HttpError::Timeout`] when no chunk arrives within `limit`.
fn with_idle_timeout(stream: ByteStream, limit: Duration) -> ByteStream {
    let timed = futures_util::stream::unfold(Some(stream), move |state| async move {
        let mut stream = state?;
        match tokio::time::timeout(limit, stream.next()).await {
            Ok(Some(item)) => Some((item, Some(stream))),
            Ok(None) => None,
            Err(_) => Some((
                Err(HttpError::Timeout(format!(
                    "no data received for {} seconds",
                    limit.as_secs()
                ))),
                None,
            )),
        }
    });
    Box::pin(timed)
}

#[async_trait]
impl HttpClient for ReqwestHttpClient {
    async fn post_stream(
        &self,
        url: &str,
        body: &str,
        headers: &Headers,
    ) -> Result<ByteStream, HttpError> {
        let builder = self.client.post(url).body(body.to_string());
        let builder = Self::apply_headers(builder, headers);

        let response = builder.send().await.map_err(Self::convert_error)?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let message = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(HttpError::ServerError { status, message });
        }

        let stream: ByteStream = Box::pin(
            response
                .bytes_stream()
                .map(|result| result.map_err(Self::convert_body_error)),
        );

        Ok(match self.idle_timeout {
            Some(limit) => with_idle_timeout(stream, limit),
            None => stream,
        })
    }
}
