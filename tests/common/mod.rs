//! Common test utilities for integration tests.
//!
//! Provides a recording [`SearchListener`] and helpers for building SSE
//! bodies in the backend's wire format.

#![allow(dead_code)]

use mindflow::search::SearchListener;
use mindflow::sse::{DecodeError, ResultItem};

/// One listener notification, in the order it was received.
#[derive(Debug, Clone, PartialEq)]
pub enum Notification {
    Thinking(String),
    Started(String),
    Appended(String),
    Results(Vec<ResultItem>),
    Failed { message: String, is_transport: bool },
    Completed,
    DecodeWarning(String),
}

/// Listener that records every notification.
#[derive(Debug, Default)]
pub struct RecordingListener {
    pub notifications: Vec<Notification>,
}

impl RecordingListener {
    /// Notifications that end a search.
    pub fn terminal(&self) -> Vec<&Notification> {
        self.notifications
            .iter()
            .filter(|n| matches!(n, Notification::Completed | Notification::Failed { .. }))
            .collect()
    }

    /// Number of decode warnings received.
    pub fn warnings(&self) -> usize {
        self.notifications
            .iter()
            .filter(|n| matches!(n, Notification::DecodeWarning(_)))
            .count()
    }
}

impl SearchListener for RecordingListener {
    fn on_thinking_started(&mut self, query: &str) {
        self.notifications
            .push(Notification::Thinking(query.to_string()));
    }

    fn on_session_started(&mut self, query: &str) {
        self.notifications.push(Notification::Started(query.to_string()));
    }

    fn on_content_appended(&mut self, fragment: &str) {
        self.notifications
            .push(Notification::Appended(fragment.to_string()));
    }

    fn on_results_available(&mut self, results: &[ResultItem]) {
        self.notifications
            .push(Notification::Results(results.to_vec()));
    }

    fn on_session_failed(&mut self, message: &str, is_transport: bool) {
        self.notifications.push(Notification::Failed {
            message: message.to_string(),
            is_transport,
        });
    }

    fn on_session_completed(&mut self) {
        self.notifications.push(Notification::Completed);
    }

    fn on_decode_warning(&mut self, warning: &DecodeError) {
        self.notifications
            .push(Notification::DecodeWarning(warning.frame.clone()));
    }
}

/// SSE record for a backend event.
pub fn sse(event: serde_json::Value) -> String {
    format!("data: {}\n\n", event)
}

pub fn start(query: &str) -> String {
    sse(serde_json::json!({"event": "start", "data": {"query": query}}))
}

pub fn chunk(content: &str) -> String {
    sse(serde_json::json!({"event": "chunk", "data": {"content": content}}))
}

pub fn end() -> String {
    sse(serde_json::json!({"event": "end", "data": {}}))
}

pub fn error(message: &str) -> String {
    sse(serde_json::json!({"event": "error", "data": {"error": message}}))
}

pub fn google_results() -> String {
    sse(serde_json::json!({
        "event": "google_results",
        "data": {
            "results": [
                {
                    "title": "The Rust Programming Language",
                    "link": "https://doc.rust-lang.org/book/cover.png",
                    "thumbnailLink": "https://images.example.com/rust-thumb.png",
                    "contextLink": "https://doc.rust-lang.org/book/",
                    "snippet": "An introductory book about Rust.",
                    "source": "doc.rust-lang.org"
                },
                {
                    "title": "Rust by Example",
                    "link": "https://doc.rust-lang.org/rust-by-example/logo.png",
                    "contextLink": "https://doc.rust-lang.org/rust-by-example/",
                    "snippet": "A collection of runnable examples.",
                    "source": "doc.rust-lang.org"
                }
            ]
        }
    }))
}

/// The canonical body: start, "Hel", "lo", results, end.
pub fn hello_body() -> String {
    [start("rust"), chunk("Hel"), chunk("lo"), google_results(), end()].concat()
}
