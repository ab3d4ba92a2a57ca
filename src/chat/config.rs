//! Chat configuration

use std::time::Duration;

/// Default base URL of the answering service
pub const DEFAULT_ENDPOINT_BASE_URL: &str = "http://localhost:8080";

/// Path of the query endpoint, appended to the base URL
pub const QUERY_PATH: &str = "/api/chat/query";

/// Configuration for the chat client
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatConfig {
    /// Base URL of the answering service (e.g. "http://localhost:8080")
    pub endpoint_base_url: String,
    /// Per-request timeout. `None` waits indefinitely.
    pub request_timeout: Option<Duration>,
}

impl ChatConfig {
    pub fn new(endpoint_base_url: impl Into<String>) -> Self {
        Self {
            endpoint_base_url: endpoint_base_url.into(),
            request_timeout: None,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = Some(timeout);
        self
    }

    /// Full URL of the query endpoint
    pub fn query_url(&self) -> String {
        format!(
            "{}{}",
            self.endpoint_base_url.trim_end_matches('/'),
            QUERY_PATH
        )
    }
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self::new(DEFAULT_ENDPOINT_BASE_URL)
    }
}
