//! SSE event types and definitions
//!
//! Contains the typed [`StreamEvent`] enum delivered by the search backend,
//! the [`EventKind`] discriminator and the [`ResultItem`] values carried by
//! `results` events.

use serde::{Deserialize, Serialize};

/// Discriminator of a [`StreamEvent`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    /// The backend accepted the query and echoes it back
    Start,
    /// A fragment of the AI answer
    Chunk,
    /// The backend finished producing the answer
    End,
    /// The backend reports an application-level failure
    Error,
    /// Web results for the query (`google_results` on the wire)
    Results,
}

impl EventKind {
    /// Parse a wire event name.
    ///
    /// `google_results` is the name the backend sends; `results` is accepted
    /// as an alias.
    pub fn from_wire(name: &str) -> Option<Self> {
        match name {
            "start" => Some(EventKind::Start),
            "chunk" => Some(EventKind::Chunk),
            "end" => Some(EventKind::End),
            "error" => Some(EventKind::Error),
            "google_results" | "results" => Some(EventKind::Results),
            _ => None,
        }
    }

    /// Short name used in logs.
    pub fn as_str(&self) -> &'static str {
        match self {
            EventKind::Start => "start",
            EventKind::Chunk => "chunk",
            EventKind::End => "end",
            EventKind::Error => "error",
            EventKind::Results => "results",
        }
    }
}

impl std::fmt::Display for EventKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single web result attached to a search.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultItem {
    /// Stable identifier within one `results` event (`google-image-<index>`)
    pub id: String,
    pub title: String,
    pub snippet: String,
    pub link: String,
    /// Page the result was found on
    pub context_link: String,
    pub source: String,
    #[serde(default)]
    pub thumbnail: Option<String>,
}

impl ResultItem {
    /// Image to display for this result: the thumbnail when present,
    /// otherwise the result link itself.
    pub fn image_url(&self) -> &str {
        self.thumbnail.as_deref().unwrap_or(&self.link)
    }
}

/// Typed events from the search streaming API
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamEvent {
    /// Streaming began for the echoed query
    Start { query: String },
    /// Content fragment to append to the answer
    Chunk { content: String },
    /// Answer finished
    End,
    /// Server-signaled failure
    Error { message: String },
    /// Web results, may interleave with chunks
    Results { results: Vec<ResultItem> },
}

impl StreamEvent {
    /// Returns the discriminator of this event.
    pub fn kind(&self) -> EventKind {
        match self {
            StreamEvent::Start { .. } => EventKind::Start,
            StreamEvent::Chunk { .. } => EventKind::Chunk,
            StreamEvent::End => EventKind::End,
            StreamEvent::Error { .. } => EventKind::Error,
            StreamEvent::Results { .. } => EventKind::Results,
        }
    }

    /// Returns true for events that end a search (`end` and `error`).
    pub fn is_terminal(&self) -> bool {
        matches!(self, StreamEvent::End | StreamEvent::Error { .. })
    }
}
