//! Error handling for the streaming search core.
//!
//! | Error | Fatal | Surfaced as |
//! |-------|-------|-------------|
//! | Transport ([`HttpError`]) | Yes | `on_session_failed(_, true)` |
//! | Application (`error` event) | Yes | `on_session_failed(message, false)` |
//! | Decode ([`DecodeError`]) | No | `on_decode_warning` + log |
//! | Cancelled | - | nothing |
//!
//! [`SearchError`] covers mistakes by the caller (blank query, bad config)
//! and is returned directly from `submit`.

mod category;
mod stream;

use thiserror::Error;

pub use category::ErrorCategory;
pub use stream::StreamError;

pub use crate::sse::{DecodeError, DecodeErrorKind};
pub use crate::traits::HttpError;

/// Errors returned synchronously to the caller of the search API.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SearchError {
    #[error("search query is empty")]
    EmptyQuery,
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

impl SearchError {
    /// Get the error category.
    pub fn category(&self) -> ErrorCategory {
        ErrorCategory::Configuration
    }
}
