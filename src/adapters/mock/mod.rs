//! Mock implementations for testing.
//!
//! Enables unit testing of sessions and the orchestrator without network
//! dependencies.
//!
//! # Available Mocks
//!
//! - [`MockHttpClient`] - HTTP client with scripted or live response bodies

pub mod http;

pub use http::{LiveSender, LiveStream, MockHttpClient, MockResponse, RecordedRequest};
