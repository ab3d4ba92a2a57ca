//! Turn dispatch: one request to the answering service per accepted turn.
//!
//! Transport failures never escape this module: [`TurnDispatcher::resolve`]
//! always produces the assistant text to append, substituting
//! [`UNREACHABLE_REPLY`] when the request fails.

use super::config::ChatConfig;
use super::normalize::normalize;
use super::session::SessionId;
use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::StatusCode;
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, warn};

/// Assistant turn appended when the answering service could not be reached.
pub const UNREACHABLE_REPLY: &str = "Sorry, I could not reach the chat service. Please try again.";

/// Request body for POST /api/chat/query
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatQuery<'a> {
    pub message: &'a str,
    pub session_id: &'a SessionId,
}

/// Why a query produced no body
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("chat service request failed: {0}")]
    Network(#[from] reqwest::Error),
    #[error("chat service returned {0}")]
    Status(StatusCode),
}

/// The remote answering endpoint
#[async_trait]
pub trait AnsweringService: Send + Sync {
    /// Send one turn and return the raw response body of a 2xx reply.
    async fn query(&self, message: &str, session_id: &SessionId) -> Result<String, TransportError>;
}

/// [`AnsweringService`] over HTTP
#[derive(Clone)]
pub struct HttpAnsweringService {
    client: reqwest::Client,
    url: String,
}

impl HttpAnsweringService {
    pub fn new(config: &ChatConfig) -> Result<Self> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = config.request_timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .context("Failed to create HTTP client for the chat service")?;

        Ok(Self::with_client(client, config))
    }

    pub fn with_client(client: reqwest::Client, config: &ChatConfig) -> Self {
        Self {
            client,
            url: config.query_url(),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl AnsweringService for HttpAnsweringService {
    async fn query(&self, message: &str, session_id: &SessionId) -> Result<String, TransportError> {
        let resp = self
            .client
            .post(&self.url)
            .json(&ChatQuery {
                message,
                session_id,
            })
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            return Err(TransportError::Status(status));
        }

        Ok(resp.text().await?)
    }
}

/// Turns accepted messages into assistant replies
#[derive(Clone)]
pub struct TurnDispatcher {
    service: Arc<dyn AnsweringService>,
}

impl TurnDispatcher {
    pub fn new(service: Arc<dyn AnsweringService>) -> Self {
        Self { service }
    }

    /// Dispatcher talking HTTP to the configured answering service
    pub fn from_config(config: &ChatConfig) -> Result<Self> {
        Ok(Self::new(Arc::new(HttpAnsweringService::new(config)?)))
    }

    /// Make the single network attempt for `message` and return the assistant
    /// text. Never fails and never retries.
    pub async fn resolve(&self, message: &str, session_id: &SessionId) -> String {
        match self.service.query(message, session_id).await {
            Ok(body) => {
                debug!(session_id = %session_id, bytes = body.len(), "Chat reply received");
                normalize(&body)
            }
            Err(e) => {
                warn!(session_id = %session_id, "Chat query failed: {}", e);
                UNREACHABLE_REPLY.to_string()
            }
        }
    }
}
