//! Search client configuration.
//!
//! Selects the backend, builds the search endpoint URL and the request headers
//! every streaming search sends, and carries transport timeouts.

use std::time::Duration;

use crate::error::SearchError;
use crate::traits::Headers;

/// Path of the streaming search endpoint.
pub const SEARCH_PATH: &str = "/api/search";

/// Default connect timeout for the search transport.
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Backend deployment to talk to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    Development,
    Staging,
    Production,
}

impl Environment {
    /// Default environment for this build: development for debug builds,
    /// production otherwise.
    pub fn current() -> Self {
        if cfg!(debug_assertions) {
            Environment::Development
        } else {
            Environment::Production
        }
    }

    /// Parse an environment name (case-insensitive, short forms accepted).
    pub fn parse(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "development" | "dev" => Some(Environment::Development),
            "staging" | "stage" => Some(Environment::Staging),
            "production" | "prod" => Some(Environment::Production),
            _ => None,
        }
    }

    /// Base URL of the backend for this environment.
    pub fn base_url(&self) -> &'static str {
        match self {
            Environment::Development => "http://localhost:8000",
            Environment::Staging => "https://staging-api.mindflow.com",
            Environment::Production => "https://api.mindflow.com",
        }
    }
}

/// Configuration for streaming searches.
///
/// Use the builder methods to customize.
///
/// # Example
///
/// ```ignore
/// use mindflow::config::SearchConfig;
///
/// let config = SearchConfig::default()
///     .with_base_url("http://localhost:9000")
///     .with_language("en");
/// ```
#[derive(Debug, Clone)]
pub struct SearchConfig {
    /// Environment the base URL was derived from
    pub environment: Environment,
    /// Backend base URL, without trailing slash
    pub base_url: String,
    /// Search endpoint path (default: `/api/search`)
    pub search_path: String,
    /// Value for `Accept-Language`
    pub language: Option<String>,
    /// Bearer token supplied by the caller
    pub auth_token: Option<String>,
    /// Additional caller-supplied headers (device info, tracing ids)
    pub extra_headers: Headers,
    /// Connect timeout for the transport
    pub connect_timeout: Duration,
    /// Maximum silence between body chunks before the transport gives up.
    /// `None` waits forever.
    pub idle_timeout: Option<Duration>,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self::for_environment(Environment::current())
    }
}

impl SearchConfig {
    /// Create a config targeting `environment`.
    pub fn for_environment(environment: Environment) -> Self {
        Self {
            environment,
            base_url: environment.base_url().to_string(),
            search_path: SEARCH_PATH.to_string(),
            language: None,
            auth_token: None,
            extra_headers: Headers::new(),
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
            idle_timeout: None,
        }
    }

    /// Override the base URL.
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    /// Set the `Accept-Language` value.
    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = Some(language.into());
        self
    }

    /// Set the bearer token sent as `Authorization`.
    pub fn with_auth_token(mut self, token: impl Into<String>) -> Self {
        self.auth_token = Some(token.into());
        self
    }

    /// Add a caller-supplied header.
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.extra_headers.insert(name.into(), value.into());
        self
    }

    /// Set the transport connect timeout.
    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Set the idle timeout between body chunks.
    pub fn with_idle_timeout(mut self, timeout: Duration) -> Self {
        self.idle_timeout = Some(timeout);
        self
    }

    /// Create config from environment variables.
    ///
    /// - `MINDFLOW_ENV` - `development`, `staging` or `production`
    /// - `MINDFLOW_BASE_URL` - overrides the environment's base URL
    /// - `MINDFLOW_LANGUAGE` - `Accept-Language` value
    /// - `MINDFLOW_AUTH_TOKEN` - bearer token
    /// - `MINDFLOW_IDLE_TIMEOUT_SECS` - idle timeout in seconds
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Create config from an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let environment = lookup("MINDFLOW_ENV")
            .and_then(|name| Environment::parse(&name))
            .unwrap_or_else(Environment::current);

        let mut config = Self::for_environment(environment);

        if let Some(url) = lookup("MINDFLOW_BASE_URL").filter(|u| !u.trim().is_empty()) {
            config = config.with_base_url(url.trim());
        }
        if let Some(language) = lookup("MINDFLOW_LANGUAGE").filter(|l| !l.is_empty()) {
            config = config.with_language(language);
        }
        if let Some(token) = lookup("MINDFLOW_AUTH_TOKEN").filter(|t| !t.is_empty()) {
            config = config.with_auth_token(token);
        }
        if let Some(secs) = lookup("MINDFLOW_IDLE_TIMEOUT_SECS").and_then(|s| s.trim().parse().ok()) {
            config = config.with_idle_timeout(Duration::from_secs(secs));
        }

        config
    }

    /// Check that the config can produce a valid request.
    pub fn validate(&self) -> Result<(), SearchError> {
        if !(self.base_url.starts_with("http://") || self.base_url.starts_with("https://")) {
            return Err(SearchError::InvalidConfig(format!(
                "base URL must start with http:// or https://, got '{}'",
                self.base_url
            )));
        }
        if !self.search_path.starts_with('/') {
            return Err(SearchError::InvalidConfig(format!(
                "search path must start with '/', got '{}'",
                self.search_path
            )));
        }
        Ok(())
    }

    /// Full URL of the streaming search endpoint.
    pub fn search_url(&self) -> String {
        format!("{}{}", self.base_url, self.search_path)
    }

    /// Headers sent with every streaming search.
    ///
    /// The streaming headers are applied last so caller-supplied headers
    /// cannot turn them off.
    pub fn request_headers(&self) -> Headers {
        let mut headers = self.extra_headers.clone();
        if let Some(language) = &self.language {
            headers.insert("Accept-Language".to_string(), language.clone());
        }
        if let Some(token) = &self.auth_token {
            headers.insert("Authorization".to_string(), format!("Bearer {}", token));
        }
        headers.insert("Content-Type".to_string(), "application/json".to_string());
        headers.insert("Accept".to_string(), "text/event-stream".to_string());
        headers.insert("Cache-Control".to_string(), "no-cache".to_string());
        headers
    }
}
