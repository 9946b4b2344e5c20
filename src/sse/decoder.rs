//! Frame decoding
//!
//! Turns one frame payload produced by the [`ByteFramer`](super::ByteFramer)
//! into a typed [`StreamEvent`].

use thiserror::Error;

use super::events::{EventKind, StreamEvent};
use super::payloads::EventEnvelope;

/// Message used when an `error` event carries no text.
pub const UNKNOWN_SERVER_ERROR: &str = "Unknown server error";

/// Why a frame could not be decoded
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeErrorKind {
    #[error("invalid JSON: {0}")]
    InvalidJson(String),
    #[error("unknown event kind '{0}'")]
    UnknownKind(String),
    #[error("'{kind}' event is missing field '{field}'")]
    MissingField {
        kind: EventKind,
        field: &'static str,
    },
}

/// A frame that failed to decode.
///
/// Non-fatal: the session skips the frame and keeps streaming.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("failed to decode frame: {kind}")]
pub struct DecodeError {
    pub kind: DecodeErrorKind,
    /// The offending frame text, verbatim
    pub frame: String,
}

impl DecodeError {
    fn new(kind: DecodeErrorKind, frame: &str) -> Self {
        Self {
            kind,
            frame: frame.to_string(),
        }
    }
}

/// Decode one frame into a [`StreamEvent`].
pub fn decode(frame: &str) -> Result<StreamEvent, DecodeError> {
    let envelope: EventEnvelope = serde_json::from_str(frame)
        .map_err(|e| DecodeError::new(DecodeErrorKind::InvalidJson(e.to_string()), frame))?;

    let kind = EventKind::from_wire(&envelope.event)
        .ok_or_else(|| DecodeError::new(DecodeErrorKind::UnknownKind(envelope.event.clone()), frame))?;

    let missing = |field| DecodeError::new(DecodeErrorKind::MissingField { kind, field }, frame);
    let data = envelope.data;

    match kind {
        EventKind::Start => {
            let query = data.query.ok_or_else(|| missing("query"))?;
            Ok(StreamEvent::Start { query })
        }
        EventKind::Chunk => {
            let content = data.content.ok_or_else(|| missing("content"))?;
            Ok(StreamEvent::Chunk { content })
        }
        EventKind::End => Ok(StreamEvent::End),
        EventKind::Error => Ok(StreamEvent::Error {
            message: data
                .error
                .unwrap_or_else(|| UNKNOWN_SERVER_ERROR.to_string()),
        }),
        EventKind::Results => {
            let raw = data.results.ok_or_else(|| missing("results"))?;
            let results = raw
                .into_iter()
                .enumerate()
                .map(|(index, result)| result.into_item(index))
                .collect();
            Ok(StreamEvent::Results { results })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_start() {
        let event = decode(r#"{"event":"start","data":{"query":"what is rust"}}"#).unwrap();
        assert_eq!(
            event,
            StreamEvent::Start {
                query: "what is rust".to_string()
            }
        );
    }

    #[test]
    fn test_decode_chunk() {
        let event = decode(r#"{"event":"chunk","data":{"content":"Hel"}}"#).unwrap();
        assert_eq!(
            event,
            StreamEvent::Chunk {
                content: "Hel".to_string()
            }
        );
    }

    #[test]
    fn test_decode_end_with_and_without_data() {
        assert_eq!(decode(r#"{"event":"end","data":{}}"#).unwrap(), StreamEvent::End);
        assert_eq!(decode(r#"{"event":"end"}"#).unwrap(), StreamEvent::End);
    }

    #[test]
    fn test_decode_end_with_null_data() {
        assert_eq!(decode(r#"{"event":"end","data":null}"#).unwrap(), StreamEvent::End);
    }

    #[test]
    fn test_decode_error_event() {
        let event = decode(r#"{"event":"error","data":{"error":"quota exceeded"}}"#).unwrap();
        assert_eq!(
            event,
            StreamEvent::Error {
                message: "quota exceeded".to_string()
            }
        );
    }

    #[test]
    fn test_decode_error_event_without_message() {
        let event = decode(r#"{"event":"error","data":{}}"#).unwrap();
        assert_eq!(
            event,
            StreamEvent::Error {
                message: UNKNOWN_SERVER_ERROR.to_string()
            }
        );
    }

    #[test]
    fn test_decode_google_results() {
        let frame = r#"{"event":"google_results","data":{"results":[
            {"title":"A","link":"https://a/img.png","thumbnailLink":"https://a/t.png","contextLink":"https://a","snippet":"sa","source":"a"},
            {"title":"B","link":"https://b/img.png","contextLink":"https://b","snippet":"sb","source":"b"}
        ]}}"#;
        match decode(frame).unwrap() {
            StreamEvent::Results { results } => {
                assert_eq!(results.len(), 2);
                assert_eq!(results[0].id, "google-image-0");
                assert_eq!(results[0].image_url(), "https://a/t.png");
                assert_eq!(results[1].id, "google-image-1");
                assert_eq!(results[1].image_url(), "https://b/img.png");
                assert_eq!(results[1].snippet, "sb");
            }
            other => panic!("Expected Results event, got {:?}", other),
        }
    }

    #[test]
    fn test_decode_invalid_json_keeps_frame() {
        let err = decode("{not json").unwrap_err();
        assert!(matches!(err.kind, DecodeErrorKind::InvalidJson(_)));
        assert_eq!(err.frame, "{not json");
    }

    #[test]
    fn test_decode_unknown_kind() {
        let err = decode(r#"{"event":"ping","data":{}}"#).unwrap_err();
        assert_eq!(err.kind, DecodeErrorKind::UnknownKind("ping".to_string()));
    }

    #[test]
    fn test_decode_missing_payload_field() {
        let err = decode(r#"{"event":"chunk","data":{"query":"x"}}"#).unwrap_err();
        assert_eq!(
            err.kind,
            DecodeErrorKind::MissingField {
                kind: EventKind::Chunk,
                field: "content"
            }
        );
        assert!(err.to_string().contains("'chunk' event is missing field 'content'"));
    }

    #[test]
    fn test_decode_malformed_result_item() {
        let err = decode(r#"{"event":"google_results","data":{"results":[{"title":"x"}]}}"#)
            .unwrap_err();
        assert!(matches!(err.kind, DecodeErrorKind::InvalidJson(_)));
    }
}
