//! Request description for a streaming session.

use crate::config::SearchConfig;
use crate::traits::Headers;

/// The POST a session issues: endpoint, JSON body and headers.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionRequest {
    pub url: String,
    pub body: String,
    pub headers: Headers,
}

impl SessionRequest {
    /// Create a request. The streaming headers (`Accept: text/event-stream`,
    /// `Cache-Control: no-cache`) are added when the caller did not set them.
    /// Header names are compared case-insensitively.
    pub fn new(url: impl Into<String>, body: impl Into<String>, headers: Headers) -> Self {
        let mut headers = headers;
        insert_default(&mut headers, "Accept", "text/event-stream");
        insert_default(&mut headers, "Cache-Control", "no-cache");

        Self {
            url: url.into(),
            body: body.into(),
            headers,
        }
    }

    /// Build the search request for `query` against the configured backend.
    pub fn search(config: &SearchConfig, query: &str) -> Self {
        let body = serde_json::json!({ "query": query }).to_string();
        Self::new(config.search_url(), body, config.request_headers())
    }
}

fn insert_default(headers: &mut Headers, name: &str, value: &str) {
    if !headers.keys().any(|key| key.eq_ignore_ascii_case(name)) {
        headers.insert(name.to_string(), value.to_string());
    }
}
