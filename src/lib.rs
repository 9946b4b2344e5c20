//! MindFlow - streaming AI search client core
//!
//! Opens a streaming search request, frames and decodes the Server-Sent
//! Events body, and drives one search session at a time for a listener.
//!
//! This library exposes modules for use by the `mindflow` binary and in
//! integration tests.

pub mod adapters;
pub mod cli;
pub mod config;
pub mod error;
pub mod search;
pub mod session;
pub mod sse;
pub mod traits;
