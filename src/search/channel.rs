//! Forwarding of session callbacks onto the orchestrator's channel.

use tokio::sync::mpsc;

use crate::session::{SessionId, SessionObserver};
use crate::sse::{DecodeError, StreamEvent};
use crate::traits::HttpError;

/// What a session reported.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionUpdate {
    Event(StreamEvent),
    DecodeWarning(DecodeError),
    /// The body ended cleanly
    Completed,
    /// Transport failure, before or during the body
    Failed(HttpError),
}

/// A session update tagged with the session that produced it.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionMessage {
    pub session_id: SessionId,
    pub update: SessionUpdate,
}

impl SessionMessage {
    pub fn new(session_id: SessionId, update: SessionUpdate) -> Self {
        Self { session_id, update }
    }
}

/// [`SessionObserver`] that tags every callback with its session id and
/// queues it for the orchestrator.
pub(crate) struct ChannelObserver {
    session_id: SessionId,
    tx: mpsc::UnboundedSender<SessionMessage>,
}

impl ChannelObserver {
    pub(crate) fn new(session_id: SessionId, tx: mpsc::UnboundedSender<SessionMessage>) -> Self {
        Self { session_id, tx }
    }

    fn forward(&self, update: SessionUpdate) {
        if self
            .tx
            .send(SessionMessage::new(self.session_id, update))
            .is_err()
        {
            tracing::trace!("Orchestrator gone, dropping update from {}", self.session_id);
        }
    }
}

impl SessionObserver for ChannelObserver {
    fn on_event(&mut self, event: StreamEvent) {
        self.forward(SessionUpdate::Event(event));
    }

    fn on_decode_warning(&mut self, warning: DecodeError) {
        self.forward(SessionUpdate::DecodeWarning(warning));
    }

    fn on_completion(&mut self) {
        self.forward(SessionUpdate::Completed);
    }

    fn on_error(&mut self, error: HttpError) {
        self.forward(SessionUpdate::Failed(error));
    }
}
