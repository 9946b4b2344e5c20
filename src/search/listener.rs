//! Consumer-facing notifications of a search.

use crate::sse::{DecodeError, ResultItem};

/// Receives the coarse lifecycle of each search.
///
/// All callbacks run on the context that drives the
/// [`SearchOrchestrator`](super::SearchOrchestrator). Every search ends with
/// exactly one of [`on_session_completed`](Self::on_session_completed) or
/// [`on_session_failed`](Self::on_session_failed), unless it was cancelled,
/// in which case neither fires.
pub trait SearchListener {
    /// A query was accepted and its request is being sent.
    fn on_thinking_started(&mut self, _query: &str) {}

    /// The backend acknowledged the query.
    fn on_session_started(&mut self, query: &str);

    /// A new answer fragment. Only the fragment is passed; the full text is
    /// available from `SearchOrchestrator::accumulated_content`.
    fn on_content_appended(&mut self, fragment: &str);

    /// Web results for the query.
    fn on_results_available(&mut self, results: &[ResultItem]);

    /// The search failed. `is_transport` distinguishes network failures from
    /// errors reported by the backend, whose message is passed verbatim.
    fn on_session_failed(&mut self, message: &str, is_transport: bool);

    /// The answer is complete.
    fn on_session_completed(&mut self);

    /// A frame could not be decoded and was skipped.
    fn on_decode_warning(&mut self, _warning: &DecodeError) {}
}
