//! HTTP transport trait abstraction.
//!
//! Provides a trait-based abstraction for the streaming HTTP request a search
//! session issues, enabling dependency injection and mocking in tests.

use async_trait::async_trait;
use bytes::Bytes;
use futures::Stream;
use std::collections::HashMap;
use std::pin::Pin;

/// HTTP headers represented as a key-value map.
pub type Headers = HashMap<String, String>;

/// Incrementally delivered response body.
///
/// The stream ends (`None`) when the server finishes the body; an `Err` item
/// is a transport failure mid-stream.
pub type ByteStream = Pin<Box<dyn Stream<Item = Result<Bytes, HttpError>> + Send>>;

/// HTTP transport errors.
#[derive(Debug, Clone, PartialEq)]
pub enum HttpError {
    /// Connection failed (DNS, refused, TLS)
    ConnectionFailed(String),
    /// Request timeout
    Timeout(String),
    /// Server answered with a non-2xx status
    ServerError { status: u16, message: String },
    /// Request was cancelled
    Cancelled,
    /// Body read failed after the response started (e.g. connection reset)
    Io(String),
    /// Invalid URL
    InvalidUrl(String),
    /// Other error
    Other(String),
}

impl HttpError {
    /// Get a user-friendly error message.
    pub fn user_message(&self) -> String {
        match self {
            HttpError::ConnectionFailed(_) | HttpError::Io(_) => {
                "Unable to reach the search service. Please check your connection.".to_string()
            }
            HttpError::Timeout(_) => {
                "The search service took too long to respond. Please check your connection."
                    .to_string()
            }
            HttpError::ServerError { status, .. } => match *status {
                401 | 403 => "Access denied by the search service.".to_string(),
                429 => "Too many requests. Please wait a moment and try again.".to_string(),
                500..=599 => {
                    "The search service is experiencing issues. Please try again later."
                        .to_string()
                }
                _ => format!("The search service returned an error (HTTP {}).", status),
            },
            HttpError::Cancelled => "The request was cancelled.".to_string(),
            HttpError::InvalidUrl(_) => "The search service address is invalid.".to_string(),
            HttpError::Other(msg) => format!("Network error: {}", msg),
        }
    }
}

impl std::fmt::Display for HttpError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            HttpError::ConnectionFailed(msg) => write!(f, "Connection failed: {}", msg),
            HttpError::Timeout(msg) => write!(f, "Request timeout: {}", msg),
            HttpError::ServerError { status, message } => {
                write!(f, "Server error ({}): {}", status, message)
            }
            HttpError::Cancelled => write!(f, "Request cancelled"),
            HttpError::Io(msg) => write!(f, "IO error: {}", msg),
            HttpError::InvalidUrl(msg) => write!(f, "Invalid URL: {}", msg),
            HttpError::Other(msg) => write!(f, "HTTP error: {}", msg),
        }
    }
}

impl std::error::Error for HttpError {}

/// Trait for the streaming HTTP transport.
///
/// Implementations include the production reqwest-based client and a
/// scriptable mock for tests. Aborting a request is done by dropping the
/// returned stream (or the task polling it).
///
/// # Example
///
/// ```ignore
/// use mindflow::traits::{HttpClient, Headers};
/// use futures::StreamExt;
///
/// async fn dump<C: HttpClient>(client: &C) -> Result<(), HttpError> {
///     let mut body = client.post_stream("http://localhost:8000/api/search", "{}", &Headers::new()).await?;
///     while let Some(chunk) = body.next().await {
///         println!("{} bytes", chunk?.len());
///     }
///     Ok(())
/// }
/// ```
#[async_trait]
pub trait HttpClient: Send + Sync {
    /// Perform a POST request and return the response body as a stream.
    ///
    /// Resolves once response headers arrive. A non-2xx status is reported as
    /// [`HttpError::ServerError`] before any body bytes are delivered.
    ///
    /// # Arguments
    /// * `url` - The URL to request
    /// * `body` - Request body as a string
    /// * `headers` - Request headers
    async fn post_stream(
        &self,
        url: &str,
        body: &str,
        headers: &Headers,
    ) -> Result<ByteStream, HttpError>;
}
