//! Session lifecycle types.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

static NEXT_SESSION_ID: AtomicU64 = AtomicU64::new(1);

/// Process-unique identifier of one streaming session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SessionId(u64);

impl SessionId {
    /// Allocate the next identifier.
    pub fn next() -> Self {
        SessionId(NEXT_SESSION_ID.fetch_add(1, Ordering::Relaxed))
    }

    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "session-{}", self.0)
    }
}

/// Lifecycle of a streaming session.
///
/// ```text
/// Idle -> Connecting -> Streaming -> Completed
///             |             |------> Failed
///             |------------ +------> Cancelled
///             '---------------------> Failed
/// ```
///
/// `Completed`, `Failed` and `Cancelled` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SessionState {
    Idle,
    Connecting,
    Streaming,
    Completed,
    Failed,
    Cancelled,
}

impl SessionState {
    /// Returns true once the session can no longer change state.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            SessionState::Completed | SessionState::Failed | SessionState::Cancelled
        )
    }

    /// Returns true while a request is in flight.
    pub fn is_active(&self) -> bool {
        matches!(self, SessionState::Connecting | SessionState::Streaming)
    }

    /// Whether moving from `self` to `next` is a legal transition.
    pub fn can_transition_to(&self, next: SessionState) -> bool {
        use SessionState::*;
        matches!(
            (self, next),
            (Idle, Connecting)
                | (Connecting, Streaming)
                | (Connecting, Failed)
                | (Connecting, Cancelled)
                | (Streaming, Completed)
                | (Streaming, Failed)
                | (Streaming, Cancelled)
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SessionState::Idle => "idle",
            SessionState::Connecting => "connecting",
            SessionState::Streaming => "streaming",
            SessionState::Completed => "completed",
            SessionState::Failed => "failed",
            SessionState::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
