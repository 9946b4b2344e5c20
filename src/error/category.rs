//! Error category classification.
//!
//! This module provides a high-level categorization of errors so that callers
//! and logs can tell a connectivity problem from a failure the server chose
//! to report.

use std::fmt;

/// High-level categorization of errors for handling decisions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    /// Connection-level failure (DNS, reset, non-2xx status).
    /// Fatal to the session; a new submit may succeed.
    Transport,

    /// The server delivered a structured failure (`error` event).
    /// Fatal to the search outcome, not a network fault.
    Application,

    /// A single frame could not be decoded. Never fatal.
    Decode,

    /// The caller cancelled the search. Never shown to users.
    Cancelled,

    /// Invalid query or configuration supplied by the caller.
    Configuration,
}

impl ErrorCategory {
    /// Returns true if the category ends the session.
    pub fn is_fatal(&self) -> bool {
        matches!(self, ErrorCategory::Transport | ErrorCategory::Application)
    }

    /// Returns a short label for the category suitable for logging.
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCategory::Transport => "transport",
            ErrorCategory::Application => "application",
            ErrorCategory::Decode => "decode",
            ErrorCategory::Cancelled => "cancelled",
            ErrorCategory::Configuration => "configuration",
        }
    }

    /// Returns suggested recovery actions for this category.
    pub fn recovery_hint(&self) -> &'static str {
        match self {
            ErrorCategory::Transport => "Check your internet connection and try again",
            ErrorCategory::Application => "The search service could not answer this query",
            ErrorCategory::Decode => "Some streamed data was skipped",
            ErrorCategory::Cancelled => "",
            ErrorCategory::Configuration => "Check your query and configuration settings",
        }
    }
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
