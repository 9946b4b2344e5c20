//! Trait abstractions for dependency injection and testability.
//!
//! # Traits
//!
//! - [`HttpClient`] - Streaming HTTP transport used by search sessions

pub mod http;

pub use http::{ByteStream, Headers, HttpClient, HttpError};
