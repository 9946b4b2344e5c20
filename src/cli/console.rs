//! Terminal output for a streaming search.
//!
//! Answer text goes to the wrapped writer as it arrives; status and errors
//! are left to the caller (stderr).

use std::io::Write;

use crate::search::SearchListener;
use crate::sse::ResultItem;

/// How the search that was printed ended.
#[derive(Debug, Clone, PartialEq)]
pub enum SearchOutcome {
    Completed,
    Failed { message: String, is_transport: bool },
}

/// [`SearchListener`] that streams the answer to a writer and lists the
/// result sources once the answer is complete.
pub struct ConsoleListener<W: Write> {
    out: W,
    results: Vec<ResultItem>,
    outcome: Option<SearchOutcome>,
}

impl<W: Write> ConsoleListener<W> {
    pub fn new(out: W) -> Self {
        Self {
            out,
            results: Vec::new(),
            outcome: None,
        }
    }

    /// Outcome of the last search, once it finished.
    pub fn outcome(&self) -> Option<&SearchOutcome> {
        self.outcome.as_ref()
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn write_sources(&mut self) -> std::io::Result<()> {
        if self.results.is_empty() {
            return Ok(());
        }
        writeln!(self.out, "\nSources:")?;
        for (i, item) in self.results.iter().enumerate() {
            writeln!(self.out, "  {}. {} - {}", i + 1, item.title, item.context_link)?;
        }
        Ok(())
    }
}

impl<W: Write> SearchListener for ConsoleListener<W> {
    fn on_thinking_started(&mut self, query: &str) {
        self.results.clear();
        self.outcome = None;
        tracing::debug!("Thinking about '{}'", query);
    }

    fn on_session_started(&mut self, query: &str) {
        tracing::debug!("Backend started answering '{}'", query);
    }

    fn on_content_appended(&mut self, fragment: &str) {
        let written = self
            .out
            .write_all(fragment.as_bytes())
            .and_then(|_| self.out.flush());
        if let Err(e) = written {
            tracing::warn!("Failed to write answer: {}", e);
        }
    }

    fn on_results_available(&mut self, results: &[ResultItem]) {
        self.results = results.to_vec();
    }

    fn on_session_failed(&mut self, message: &str, is_transport: bool) {
        let _ = writeln!(self.out);
        self.outcome = Some(SearchOutcome::Failed {
            message: message.to_string(),
            is_transport,
        });
    }

    fn on_session_completed(&mut self) {
        let written = writeln!(self.out)
            .and_then(|_| self.write_sources())
            .and_then(|_| self.out.flush());
        if let Err(e) = written {
            tracing::warn!("Failed to write answer: {}", e);
        }
        self.outcome = Some(SearchOutcome::Completed);
    }
}
