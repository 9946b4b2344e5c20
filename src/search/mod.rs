//! Search query orchestration.
//!
//! The [`SearchOrchestrator`] turns a user query into exactly one active
//! [`StreamSession`], folds the session's events into the accumulated answer
//! and reports the search lifecycle to a [`SearchListener`].
//!
//! Sessions forward their callbacks into a channel owned by the orchestrator.
//! The owner drains it with [`process_next`](SearchOrchestrator::process_next),
//! [`try_process_pending`](SearchOrchestrator::try_process_pending) or
//! [`run_until_idle`](SearchOrchestrator::run_until_idle), so all folding and
//! all listener callbacks happen on the owner's context. Messages carry their
//! session id, and anything from a session other than the current one is
//! dropped.

mod channel;
mod listener;

pub use channel::{SessionMessage, SessionUpdate};
pub use listener::SearchListener;

use std::sync::Arc;
use tokio::sync::mpsc;

use crate::config::SearchConfig;
use crate::error::{SearchError, StreamError};
use crate::session::{SessionId, SessionRequest, SessionState, StreamSession};
use crate::sse::{ResultItem, StreamEvent};
use crate::traits::HttpClient;
use channel::ChannelObserver;

/// The current search and whether it has already reported its outcome.
#[derive(Debug)]
struct ActiveSearch {
    session: StreamSession,
    query: String,
    /// Set once a terminal notification was sent or the search was cancelled
    finished: bool,
}

/// Drives at most one streaming search at a time.
///
/// # Example
///
/// ```ignore
/// let mut search = SearchOrchestrator::new(client, config, listener);
/// search.submit("how do lifetimes work")?;
/// search.run_until_idle().await;
/// println!("{}", search.accumulated_content());
/// ```
pub struct SearchOrchestrator<C: ?Sized, L> {
    client: Arc<C>,
    config: SearchConfig,
    listener: L,
    tx: mpsc::UnboundedSender<SessionMessage>,
    rx: mpsc::UnboundedReceiver<SessionMessage>,
    active: Option<ActiveSearch>,
    content: String,
    results: Vec<ResultItem>,
}

impl<C, L> SearchOrchestrator<C, L>
where
    C: HttpClient + ?Sized + 'static,
    L: SearchListener,
{
    pub fn new(client: Arc<C>, config: SearchConfig, listener: L) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            client,
            config,
            listener,
            tx,
            rx,
            active: None,
            content: String::new(),
            results: Vec::new(),
        }
    }

    /// Start a search for `query`.
    ///
    /// Cancels the current search (without notifying the listener), clears
    /// the accumulated content and results, then opens a new session.
    /// Blank queries are rejected and leave the current search untouched.
    ///
    /// Must be called from within a tokio runtime.
    pub fn submit(&mut self, query: &str) -> Result<SessionId, SearchError> {
        let query = query.trim();
        if query.is_empty() {
            return Err(SearchError::EmptyQuery);
        }

        self.cancel_active();
        self.content.clear();
        self.results.clear();

        let id = SessionId::next();
        let request = SessionRequest::search(&self.config, query);
        let observer = ChannelObserver::new(id, self.tx.clone());
        let session =
            StreamSession::open_with_id(id, Arc::clone(&self.client), request, Box::new(observer));

        tracing::info!("Searching for '{}' ({})", query, id);
        self.active = Some(ActiveSearch {
            session,
            query: query.to_string(),
            finished: false,
        });
        self.listener.on_thinking_started(query);

        Ok(id)
    }

    /// Cancel the current search.
    ///
    /// The session is stopped before this returns and no further
    /// notification is delivered for it. Returns false when no search was
    /// running.
    pub fn cancel_active(&mut self) -> bool {
        match self.active.as_mut() {
            Some(active) if !active.finished => {
                active.finished = true;
                active.session.cancel();
                let outcome = StreamError::Cancelled;
                tracing::info!(
                    "Cancelled search '{}' ({}) [{}/{}]",
                    active.query,
                    active.session.id(),
                    outcome.category(),
                    outcome.error_code()
                );
                true
            }
            _ => false,
        }
    }

    /// Fold one session message into the search state.
    ///
    /// Messages from sessions other than the current one, and messages that
    /// arrive after the current search finished, are dropped.
    pub fn handle_message(&mut self, message: SessionMessage) {
        let Some(active) = self.active.as_ref() else {
            tracing::debug!("Dropping message from {}: no active search", message.session_id);
            return;
        };
        if active.session.id() != message.session_id {
            tracing::debug!("Dropping stale message from {}", message.session_id);
            return;
        }
        if active.finished {
            tracing::trace!(
                "Dropping message from {} after it finished",
                message.session_id
            );
            return;
        }

        match message.update {
            SessionUpdate::Event(event) => self.fold_event(event),
            SessionUpdate::DecodeWarning(warning) => {
                tracing::warn!(
                    "Skipping undecodable frame from {}: {}",
                    message.session_id,
                    warning
                );
                self.listener.on_decode_warning(&warning);
            }
            SessionUpdate::Completed => {
                tracing::info!("Search {} completed without end event", message.session_id);
                self.mark_finished();
                self.listener.on_session_completed();
            }
            SessionUpdate::Failed(err) => {
                let error = StreamError::from(err);
                tracing::error!(
                    "Search {} failed [{}/{}]: {}",
                    message.session_id,
                    error.category(),
                    error.error_code(),
                    error
                );
                self.mark_finished();
                self.listener
                    .on_session_failed(&error.user_message(), error.is_transport());
            }
        }
    }

    fn fold_event(&mut self, event: StreamEvent) {
        match event {
            StreamEvent::Start { query } => {
                self.listener.on_session_started(&query);
            }
            StreamEvent::Chunk { content } => {
                self.content.push_str(&content);
                self.listener.on_content_appended(&content);
            }
            StreamEvent::Results { results } => {
                tracing::debug!("Received {} results", results.len());
                self.results = results;
                self.listener.on_results_available(&self.results);
            }
            StreamEvent::Error { message } => {
                // The session task has already stopped in `Failed`
                let error = StreamError::Application { message };
                tracing::warn!(
                    "Search failed [{}/{}]: {}",
                    error.category(),
                    error.error_code(),
                    error
                );
                self.mark_finished();
                self.listener
                    .on_session_failed(&error.user_message(), error.is_transport());
            }
            StreamEvent::End => {
                tracing::info!(
                    "Search completed ({} bytes of content)",
                    self.content.len()
                );
                self.mark_finished();
                self.listener.on_session_completed();
            }
        }
    }

    fn mark_finished(&mut self) {
        if let Some(active) = self.active.as_mut() {
            active.finished = true;
        }
    }

    /// Wait for the next session message and handle it.
    pub async fn process_next(&mut self) {
        if let Some(message) = self.rx.recv().await {
            self.handle_message(message);
        }
    }

    /// Handle every message already queued, without waiting.
    /// Returns how many messages were taken off the queue.
    pub fn try_process_pending(&mut self) -> usize {
        let mut handled = 0;
        while let Ok(message) = self.rx.try_recv() {
            self.handle_message(message);
            handled += 1;
        }
        handled
    }

    /// Process messages until the current search has finished.
    pub async fn run_until_idle(&mut self) {
        while self.is_searching() {
            self.process_next().await;
        }
    }

    /// Answer text accumulated for the current search.
    pub fn accumulated_content(&self) -> &str {
        &self.content
    }

    /// Latest results received for the current search.
    pub fn results(&self) -> &[ResultItem] {
        &self.results
    }

    pub fn active_query(&self) -> Option<&str> {
        self.active.as_ref().map(|a| a.query.as_str())
    }

    pub fn active_session_id(&self) -> Option<SessionId> {
        self.active.as_ref().map(|a| a.session.id())
    }

    /// Transport state of the current session.
    pub fn active_state(&self) -> Option<SessionState> {
        self.active.as_ref().map(|a| a.session.state())
    }

    /// Returns true until the current search reports its outcome or is
    /// cancelled.
    pub fn is_searching(&self) -> bool {
        self.active.as_ref().is_some_and(|a| !a.finished)
    }

    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    pub fn listener(&self) -> &L {
        &self.listener
    }

    pub fn listener_mut(&mut self) -> &mut L {
        &mut self.listener
    }
}
