//! SSE (Server-Sent Events) stream handling
//!
//! Turns the search backend's streaming response body into typed events.
//! The body consists of records such as:
//! - `data: {"event":"chunk","data":{"content":"..."}}` - payload line
//! - Empty line - ends the record
//! - Lines starting with `:` - comments (ignored)
//!
//! # Module structure
//! - `framer` - Incremental byte framer (ByteFramer)
//! - `decoder` - Frame to event decoding (decode, DecodeError)
//! - `events` - Event type definitions (StreamEvent, EventKind, ResultItem)
//! - `payloads` - Internal payload deserialization structs

mod decoder;
mod events;
mod framer;
mod payloads;

// Re-export public types
pub use decoder::{decode, DecodeError, DecodeErrorKind, UNKNOWN_SERVER_ERROR};
pub use events::{EventKind, ResultItem, StreamEvent};
pub use framer::ByteFramer;
