//! Stream session: one in-flight search request and its event stream.
//!
//! A [`StreamSession`] owns a spawned tokio task that issues the request,
//! splits the body into frames with [`ByteFramer`], decodes each frame and
//! hands the result to a [`SessionObserver`], in wire order.
//!
//! The session state lives behind a mutex shared by the handle and the task.
//! The task holds that lock while it invokes the observer and re-checks the
//! state before every delivery, and [`StreamSession::cancel`] takes the same
//! lock. Once `cancel()` returns no further callback can fire.

mod request;
mod state;

pub use request::SessionRequest;
pub use state::{SessionId, SessionState};

use futures_util::StreamExt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::task::JoinHandle;

use crate::sse::{decode, ByteFramer, DecodeError, StreamEvent};
use crate::traits::{HttpClient, HttpError};

/// Receives everything a session produces.
///
/// Callbacks run on the session task while the session lock is held, so they
/// must not call back into the [`StreamSession`] that owns them. Forward to a
/// channel instead (see `crate::search`).
pub trait SessionObserver: Send {
    /// A decoded event, in wire order.
    fn on_event(&mut self, event: StreamEvent);

    /// A frame that failed to decode. The session keeps going.
    fn on_decode_warning(&mut self, warning: DecodeError);

    /// The body ended cleanly. Final callback.
    fn on_completion(&mut self);

    /// The request could not be made or the body failed. Final callback.
    fn on_error(&mut self, error: HttpError);
}

type SharedState = Arc<Mutex<SessionState>>;

fn lock(state: &Mutex<SessionState>) -> MutexGuard<'_, SessionState> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Handle to one streaming request.
///
/// Dropping the handle cancels the session if it is still active.
///
/// # Example
///
/// ```ignore
/// let request = SessionRequest::search(&config, "rust ownership");
/// let session = StreamSession::open(client, request, Box::new(observer));
/// // ...
/// session.cancel();
/// ```
pub struct StreamSession {
    id: SessionId,
    url: String,
    state: SharedState,
    task: Option<JoinHandle<()>>,
}

impl StreamSession {
    /// Open a session: moves to `Connecting` and spawns the transport task.
    ///
    /// Must be called from within a tokio runtime.
    pub fn open<C>(
        client: Arc<C>,
        request: SessionRequest,
        observer: Box<dyn SessionObserver>,
    ) -> Self
    where
        C: HttpClient + ?Sized + 'static,
    {
        Self::open_with_id(SessionId::next(), client, request, observer)
    }

    /// Open a session under an id allocated by the caller, so the observer
    /// can be tagged with it before the task starts.
    pub(crate) fn open_with_id<C>(
        id: SessionId,
        client: Arc<C>,
        request: SessionRequest,
        observer: Box<dyn SessionObserver>,
    ) -> Self
    where
        C: HttpClient + ?Sized + 'static,
    {
        let state = Arc::new(Mutex::new(SessionState::Connecting));
        let url = request.url.clone();

        tracing::debug!("Opening {} to {}", id, url);
        let task = tokio::spawn(run_session(
            client,
            request,
            SessionTask {
                id,
                state: Arc::clone(&state),
                observer,
            },
        ));

        Self {
            id,
            url,
            state,
            task: Some(task),
        }
    }

    pub fn id(&self) -> SessionId {
        self.id
    }

    /// Endpoint this session is streaming from.
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Current lifecycle state.
    pub fn state(&self) -> SessionState {
        *lock(&self.state)
    }

    /// Returns true while the request is connecting or streaming.
    pub fn is_active(&self) -> bool {
        self.state().is_active()
    }

    /// Cancel the session.
    ///
    /// Aborts the transport task and discards buffered bytes. No observer
    /// callback fires after this returns. Returns false (and does nothing)
    /// when the session had already reached a terminal state.
    pub fn cancel(&self) -> bool {
        let mut state = lock(&self.state);
        if state.is_terminal() {
            return false;
        }

        tracing::debug!("Cancelling {} while {}", self.id, *state);
        transition(self.id, &mut state, SessionState::Cancelled);
        if let Some(task) = &self.task {
            task.abort();
        }
        true
    }

    /// Wait for the transport task to finish and return the final state.
    pub async fn wait(&mut self) -> SessionState {
        if let Some(task) = self.task.take() {
            if let Err(e) = task.await {
                if e.is_panic() {
                    tracing::error!("Session task for {} panicked", self.id);
                }
            }
        }
        self.state()
    }
}

impl std::fmt::Debug for StreamSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StreamSession")
            .field("id", &self.id)
            .field("url", &self.url)
            .field("state", &self.state())
            .finish()
    }
}

impl Drop for StreamSession {
    fn drop(&mut self) {
        if self.cancel() {
            tracing::debug!("{} dropped while active", self.id);
        }
    }
}

fn transition(id: SessionId, current: &mut SessionState, next: SessionState) {
    debug_assert!(
        current.can_transition_to(next),
        "{}: illegal transition {} -> {}",
        id,
        current,
        next
    );
    *current = next;
}

/// What the transport task owns.
///
/// Every normal exit of `run_session` leaves a terminal state and `cancel`
/// sets one before aborting, so a non-terminal state at drop means the task
/// panicked (tokio drops the future after catching the unwind) or the
/// runtime shut down. Either way the observer gets a final failure.
struct SessionTask {
    id: SessionId,
    state: SharedState,
    observer: Box<dyn SessionObserver>,
}

impl Drop for SessionTask {
    fn drop(&mut self) {
        let mut current = lock(&self.state);
        if current.is_terminal() {
            return;
        }
        tracing::error!("{} task stopped while {}", self.id, *current);
        transition(self.id, &mut current, SessionState::Failed);
        self.observer.on_error(HttpError::Other(
            "session task stopped unexpectedly".to_string(),
        ));
    }
}

async fn run_session<C>(client: Arc<C>, request: SessionRequest, mut task: SessionTask)
where
    C: HttpClient + ?Sized,
{
    let id = task.id;
    let mut body = match client
        .post_stream(&request.url, &request.body, &request.headers)
        .await
    {
        Ok(body) => body,
        Err(err) => {
            let mut current = lock(&task.state);
            if current.is_terminal() {
                return;
            }
            tracing::warn!("{} failed to connect: {}", id, err);
            transition(id, &mut current, SessionState::Failed);
            task.observer.on_error(err);
            return;
        }
    };

    {
        let mut current = lock(&task.state);
        if current.is_terminal() {
            return;
        }
        transition(id, &mut current, SessionState::Streaming);
    }
    tracing::debug!("{} streaming", id);

    let mut framer = ByteFramer::new();
    while let Some(chunk) = body.next().await {
        match chunk {
            Ok(bytes) => {
                let frames = framer.feed(&bytes);
                if frames.is_empty() {
                    continue;
                }
                let mut current = lock(&task.state);
                if current.is_terminal() {
                    return;
                }
                if deliver(id, frames, &mut current, task.observer.as_mut()) {
                    return;
                }
            }
            Err(err) => {
                let mut current = lock(&task.state);
                if current.is_terminal() {
                    return;
                }
                tracing::warn!("{} failed mid-stream: {}", id, err);
                transition(id, &mut current, SessionState::Failed);
                task.observer.on_error(err);
                return;
            }
        }
    }

    let mut current = lock(&task.state);
    if current.is_terminal() {
        return;
    }
    if let Some(tail) = framer.finish() {
        if deliver(id, Some(tail), &mut current, task.observer.as_mut()) {
            return;
        }
    }
    tracing::debug!("{} completed", id);
    transition(id, &mut current, SessionState::Completed);
    task.observer.on_completion();
}

/// Decode and hand over frames. Returns true when a server `error` event
/// ended the session; the state is already `Failed` when the observer sees it.
fn deliver(
    id: SessionId,
    frames: impl IntoIterator<Item = String>,
    current: &mut SessionState,
    observer: &mut dyn SessionObserver,
) -> bool {
    for frame in frames {
        match decode(&frame) {
            Ok(event) => {
                tracing::trace!("{} event: {}", id, event.kind());
                let failed = matches!(event, StreamEvent::Error { .. });
                if failed {
                    tracing::warn!("{} ended by server error event", id);
                    transition(id, current, SessionState::Failed);
                }
                observer.on_event(event);
                if failed {
                    return true;
                }
            }
            Err(warning) => {
                tracing::debug!("{} skipped frame: {}", id, warning);
                observer.on_decode_warning(warning);
            }
        }
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::mock::{MockHttpClient, MockResponse};
    use crate::traits::Headers;
    use std::time::Duration;
    use tokio::sync::mpsc;

    const URL: &str = "http://localhost:8000/api/search";

    #[derive(Debug, PartialEq)]
    enum Observed {
        Event(StreamEvent),
        Warning(String),
        Completed,
        Error(HttpError),
    }

    struct ForwardingObserver(mpsc::UnboundedSender<Observed>);

    impl SessionObserver for ForwardingObserver {
        fn on_event(&mut self, event: StreamEvent) {
            let _ = self.0.send(Observed::Event(event));
        }

        fn on_decode_warning(&mut self, warning: DecodeError) {
            let _ = self.0.send(Observed::Warning(warning.frame));
        }

        fn on_completion(&mut self) {
            let _ = self.0.send(Observed::Completed);
        }

        fn on_error(&mut self, error: HttpError) {
            let _ = self.0.send(Observed::Error(error));
        }
    }

    fn observer() -> (Box<dyn SessionObserver>, mpsc::UnboundedReceiver<Observed>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Box::new(ForwardingObserver(tx)), rx)
    }

    /// Drain until the session task drops its observer.
    async fn collect(mut rx: mpsc::UnboundedReceiver<Observed>) -> Vec<Observed> {
        let mut observed = Vec::new();
        while let Some(item) = rx.recv().await {
            observed.push(item);
        }
        observed
    }

    fn request() -> SessionRequest {
        SessionRequest::new(URL, r#"{"query":"rust"}"#, Headers::new())
    }

    fn chunk(content: &str) -> StreamEvent {
        StreamEvent::Chunk {
            content: content.to_string(),
        }
    }

    #[tokio::test]
    async fn test_delivers_events_in_order_then_completes() {
        let client = Arc::new(MockHttpClient::new());
        client.set_response(
            URL,
            MockResponse::chunks([
                "data: {\"event\":\"start\",\"data\":{\"query\":\"rust\"}}\n\nda",
                "ta: {\"event\":\"chunk\",\"data\":{\"content\":\"Hel\"}}\r\n\r",
                "\ndata: {\"event\":\"chunk\",\"data\":{\"content\":\"lo\"}}\n\n",
                "data: {\"event\":\"end\"}\n\n",
            ]),
        );

        let (observer, rx) = observer();
        let mut session = StreamSession::open(client.clone(), request(), observer);
        assert_eq!(session.wait().await, SessionState::Completed);

        assert_eq!(
            collect(rx).await,
            vec![
                Observed::Event(StreamEvent::Start {
                    query: "rust".to_string()
                }),
                Observed::Event(chunk("Hel")),
                Observed::Event(chunk("lo")),
                Observed::Event(StreamEvent::End),
                Observed::Completed,
            ]
        );

        let requests = client.get_requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].method, "POST");
        assert_eq!(requests[0].body, r#"{"query":"rust"}"#);
        assert_eq!(
            requests[0].headers.get("Accept").unwrap(),
            "text/event-stream"
        );
    }

    #[tokio::test]
    async fn test_flushes_trailing_frame_at_end_of_body() {
        let client = Arc::new(MockHttpClient::new());
        client.set_response(URL, MockResponse::chunks(["data: {\"event\":\"end\"}"]));

        let (observer, rx) = observer();
        let mut session = StreamSession::open(client, request(), observer);
        assert_eq!(session.wait().await, SessionState::Completed);
        assert_eq!(
            collect(rx).await,
            vec![Observed::Event(StreamEvent::End), Observed::Completed]
        );
    }

    #[tokio::test]
    async fn test_decode_failure_is_isolated() {
        let client = Arc::new(MockHttpClient::new());
        client.set_response(
            URL,
            MockResponse::chunks([
                "data: {\"event\":\"chunk\",\"data\":{\"content\":\"a\"}}\n\n",
                "data: {not json\n\n",
                "data: {\"event\":\"chunk\",\"data\":{\"content\":\"b\"}}\n\n",
            ]),
        );

        let (observer, rx) = observer();
        let mut session = StreamSession::open(client, request(), observer);
        assert_eq!(session.wait().await, SessionState::Completed);
        assert_eq!(
            collect(rx).await,
            vec![
                Observed::Event(chunk("a")),
                Observed::Warning("{not json".to_string()),
                Observed::Event(chunk("b")),
                Observed::Completed,
            ]
        );
    }

    #[tokio::test]
    async fn test_connection_failure() {
        let client = Arc::new(MockHttpClient::new());
        client.set_response(
            URL,
            MockResponse::Error(HttpError::ConnectionFailed("refused".to_string())),
        );

        let (observer, rx) = observer();
        let mut session = StreamSession::open(client, request(), observer);
        assert_eq!(session.wait().await, SessionState::Failed);
        assert_eq!(
            collect(rx).await,
            vec![Observed::Error(HttpError::ConnectionFailed(
                "refused".to_string()
            ))]
        );
    }

    #[tokio::test]
    async fn test_non_success_status_fails() {
        let client = Arc::new(MockHttpClient::new());
        let error = HttpError::ServerError {
            status: 503,
            message: "unavailable".to_string(),
        };
        client.set_response(URL, MockResponse::Error(error.clone()));

        let (observer, rx) = observer();
        let mut session = StreamSession::open(client, request(), observer);
        assert_eq!(session.wait().await, SessionState::Failed);
        assert_eq!(collect(rx).await, vec![Observed::Error(error)]);
    }

    #[tokio::test]
    async fn test_mid_stream_failure_stops_delivery() {
        let client = Arc::new(MockHttpClient::new());
        client.set_response(
            URL,
            MockResponse::StreamThenError(
                vec![
                    "data: {\"event\":\"chunk\",\"data\":{\"content\":\"a\"}}\n\n".into(),
                    // Incomplete record is discarded with the failure
                    "data: {\"event\":\"chunk\",\"data\":{\"content\":\"b\"}}".into(),
                ],
                HttpError::Io("connection reset".to_string()),
            ),
        );

        let (observer, rx) = observer();
        let mut session = StreamSession::open(client, request(), observer);
        assert_eq!(session.wait().await, SessionState::Failed);
        assert_eq!(
            collect(rx).await,
            vec![
                Observed::Event(chunk("a")),
                Observed::Error(HttpError::Io("connection reset".to_string())),
            ]
        );
    }

    #[tokio::test]
    async fn test_cancel_is_final() {
        let client = Arc::new(MockHttpClient::new());
        let (response, sender) = MockResponse::live();
        client.set_response(URL, response);

        let (observer, mut rx) = observer();
        let session = StreamSession::open(client, request(), observer);

        sender.send("data: {\"event\":\"chunk\",\"data\":{\"content\":\"a\"}}\n\n");
        assert_eq!(rx.recv().await, Some(Observed::Event(chunk("a"))));
        assert_eq!(session.state(), SessionState::Streaming);

        assert!(session.cancel());
        assert_eq!(session.state(), SessionState::Cancelled);

        sender.send("data: {\"event\":\"chunk\",\"data\":{\"content\":\"late\"}}\n\n");
        sender.send("data: {\"event\":\"end\"}\n\n");

        // The task is torn down without another callback
        assert_eq!(rx.recv().await, None);
        assert!(sender.is_closed());

        // Cancelling a terminal session is a no-op
        assert!(!session.cancel());
        assert_eq!(session.state(), SessionState::Cancelled);
    }

    #[tokio::test]
    async fn test_cancel_while_connecting() {
        let client = Arc::new(MockHttpClient::new());
        client.set_response(
            URL,
            MockResponse::Delayed(
                Duration::from_secs(60),
                Box::new(MockResponse::chunks(["data: {\"event\":\"end\"}\n\n"])),
            ),
        );

        let (observer, rx) = observer();
        let session = StreamSession::open(client, request(), observer);
        assert_eq!(session.state(), SessionState::Connecting);
        assert!(session.cancel());

        assert!(collect(rx).await.is_empty());
        assert_eq!(session.state(), SessionState::Cancelled);
    }

    #[tokio::test]
    async fn test_cancel_after_completion_is_noop() {
        let client = Arc::new(MockHttpClient::new());
        client.set_response(URL, MockResponse::chunks(["data: {\"event\":\"end\"}\n\n"]));

        let (observer, _rx) = observer();
        let mut session = StreamSession::open(client, request(), observer);
        assert_eq!(session.wait().await, SessionState::Completed);
        assert!(!session.cancel());
        assert_eq!(session.state(), SessionState::Completed);
    }

    #[tokio::test]
    async fn test_drop_cancels_active_session() {
        let client = Arc::new(MockHttpClient::new());
        let (response, sender) = MockResponse::live();
        client.set_response(URL, response);

        let (observer, mut rx) = observer();
        let session = StreamSession::open(client, request(), observer);
        sender.send("data: {\"event\":\"chunk\",\"data\":{\"content\":\"a\"}}\n\n");
        assert_eq!(rx.recv().await, Some(Observed::Event(chunk("a"))));
        drop(session);

        sender.send("data: {\"event\":\"end\"}\n\n");
        assert!(collect(rx).await.is_empty());
        assert!(sender.is_closed());
    }

    #[tokio::test]
    async fn test_error_event_fails_open_session() {
        let client = Arc::new(MockHttpClient::new());
        let (response, sender) = MockResponse::live();
        client.set_response(URL, response);

        let (observer, mut rx) = observer();
        let session = StreamSession::open(client, request(), observer);
        sender.send("data: {\"event\":\"error\",\"data\":{\"error\":\"boom\"}}\n\n");
        assert_eq!(
            rx.recv().await,
            Some(Observed::Event(StreamEvent::Error {
                message: "boom".to_string()
            }))
        );

        assert_eq!(session.state(), SessionState::Failed);
        assert_eq!(rx.recv().await, None);
        assert!(sender.is_closed());
        assert!(!session.cancel());
    }

    #[tokio::test]
    async fn test_error_event_then_end_of_body_stays_failed() {
        let client = Arc::new(MockHttpClient::new());
        client.set_response(
            URL,
            MockResponse::chunks([
                "data: {\"event\":\"error\",\"data\":{\"error\":\"quota exceeded\"}}\n\n",
                "data: {\"event\":\"chunk\",\"data\":{\"content\":\"ignored\"}}\n\n",
                "data: {\"event\":\"end\"}",
            ]),
        );

        let (observer, rx) = observer();
        let mut session = StreamSession::open(client, request(), observer);
        assert_eq!(session.wait().await, SessionState::Failed);
        assert_eq!(
            collect(rx).await,
            vec![Observed::Event(StreamEvent::Error {
                message: "quota exceeded".to_string()
            })]
        );
    }

    struct PanickingClient;

    #[async_trait::async_trait]
    impl HttpClient for PanickingClient {
        async fn post_stream(
            &self,
            _url: &str,
            _body: &str,
            _headers: &Headers,
        ) -> Result<crate::traits::ByteStream, HttpError> {
            panic!("transport bug");
        }
    }

    #[tokio::test]
    async fn test_panicking_task_reports_failure() {
        let (observer, rx) = observer();
        let mut session = StreamSession::open(Arc::new(PanickingClient), request(), observer);

        assert_eq!(session.wait().await, SessionState::Failed);
        assert_eq!(
            collect(rx).await,
            vec![Observed::Error(HttpError::Other(
                "session task stopped unexpectedly".to_string()
            ))]
        );
    }
}
