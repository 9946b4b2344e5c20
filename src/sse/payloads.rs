//! SSE payload deserialization structs
//!
//! Contains internal structs used to deserialize the JSON payload of a frame
//! from the search backend.

use serde::{Deserialize, Deserializer};

use super::events::ResultItem;

/// Envelope of every frame: `{"event": "...", "data": {...}}`
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct EventEnvelope {
    pub event: String,
    /// `end` events may omit `data` entirely or send `null`
    #[serde(default, deserialize_with = "null_as_default")]
    pub data: EventData,
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Union of all payload fields; the event kind decides which one is read
#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct EventData {
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub query: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub results: Option<Vec<RawResult>>,
}

/// Web result as sent by the backend (camelCase keys)
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct RawResult {
    pub title: String,
    pub link: String,
    #[serde(default)]
    pub thumbnail_link: Option<String>,
    pub context_link: String,
    pub snippet: String,
    pub source: String,
}

impl RawResult {
    /// Convert into a [`ResultItem`] positioned at `index` in its event.
    pub fn into_item(self, index: usize) -> ResultItem {
        ResultItem {
            id: format!("google-image-{}", index),
            title: self.title,
            snippet: self.snippet,
            link: self.link,
            context_link: self.context_link,
            source: self.source,
            thumbnail: self.thumbnail_link,
        }
    }
}
