//! Concrete implementations of trait abstractions.
//!
//! This module provides the adapters that implement the traits defined in
//! `crate::traits`, so the search core can run against the real backend or a
//! scripted one.
//!
//! # Adapters
//!
//! - [`ReqwestHttpClient`] - streaming HTTP client using reqwest
//!
//! # Mock Implementations
//!
//! The [`mock`] submodule provides test doubles:
//! - [`mock::MockHttpClient`] - Configurable streamed responses

pub mod mock;
pub mod reqwest_http;

pub use mock::{LiveSender, MockHttpClient, MockResponse};
pub use reqwest_http::ReqwestHttpClient;
