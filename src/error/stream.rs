//! Session outcome errors.
//!
//! This module defines the fatal ways a streaming search can end, plus the
//! silent cancellation outcome.

use std::fmt;

use super::category::ErrorCategory;
use crate::traits::HttpError;

/// How a streaming search ended, when it did not complete.
#[derive(Debug, Clone, PartialEq)]
pub enum StreamError {
    /// Connection-level failure before or during the body.
    Transport(HttpError),

    /// The backend sent an `error` event.
    Application { message: String },

    /// The caller cancelled the session. Never reported to listeners.
    Cancelled,
}

impl StreamError {
    /// Whether the failure came from the network rather than the server.
    pub fn is_transport(&self) -> bool {
        matches!(self, StreamError::Transport(_))
    }

    /// Get the error category.
    pub fn category(&self) -> ErrorCategory {
        match self {
            StreamError::Transport(_) => ErrorCategory::Transport,
            StreamError::Application { .. } => ErrorCategory::Application,
            StreamError::Cancelled => ErrorCategory::Cancelled,
        }
    }

    /// Get the message handed to listeners.
    ///
    /// Application failures carry the server message verbatim.
    pub fn user_message(&self) -> String {
        match self {
            StreamError::Transport(err) => err.user_message(),
            StreamError::Application { message } => message.clone(),
            StreamError::Cancelled => "The search was cancelled.".to_string(),
        }
    }

    /// Get a short error code for logging.
    pub fn error_code(&self) -> &'static str {
        match self {
            StreamError::Transport(HttpError::ServerError { .. }) => "E_STREAM_STATUS",
            StreamError::Transport(HttpError::Timeout(_)) => "E_STREAM_TIMEOUT",
            StreamError::Transport(_) => "E_STREAM_CONN",
            StreamError::Application { .. } => "E_STREAM_BACKEND",
            StreamError::Cancelled => "E_STREAM_CANCEL",
        }
    }
}

impl fmt::Display for StreamError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StreamError::Transport(err) => write!(f, "Transport error: {}", err),
            StreamError::Application { message } => write!(f, "Backend error: {}", message),
            StreamError::Cancelled => write!(f, "Stream cancelled"),
        }
    }
}

impl std::error::Error for StreamError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            StreamError::Transport(err) => Some(err),
            _ => None,
        }
    }
}

impl From<HttpError> for StreamError {
    fn from(err: HttpError) -> Self {
        StreamError::Transport(err)
    }
}
