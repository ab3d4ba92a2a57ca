//! Client for the upstream login endpoint.
//!
//! Credentials are verified by an external auth backend; this module only
//! forwards them and interprets the status.

use anyhow::{Context, Result};
use reqwest::StatusCode;
use serde::Serialize;
use std::time::Duration;

/// Message used when the upstream rejects a login without a usable message.
pub const DEFAULT_FAILURE_MESSAGE: &str = "Authentication failed";

#[derive(Serialize)]
struct LoginBody<'a> {
    email: &'a str,
    password: &'a str,
}

/// What the upstream decided
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoginOutcome {
    Accepted,
    Rejected { status: StatusCode, message: String },
}

/// Forwards login requests to the configured upstream URL
#[derive(Clone)]
pub struct UpstreamLogin {
    client: reqwest::Client,
    url: String,
}

impl UpstreamLogin {
    pub fn new(url: impl Into<String>) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .context("Failed to create HTTP client for the auth backend")?;

        Ok(Self {
            client,
            url: url.into(),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// POST `{email, password}` upstream.
    ///
    /// Transport errors are returned as `Err`; any HTTP answer is a
    /// [`LoginOutcome`].
    pub async fn login(&self, email: &str, password: &str) -> Result<LoginOutcome, reqwest::Error> {
        let resp = self
            .client
            .post(&self.url)
            .json(&LoginBody { email, password })
            .send()
            .await?;

        let status = resp.status();
        if status.is_success() {
            return Ok(LoginOutcome::Accepted);
        }

        // Best effort: the upstream may not answer JSON at all
        let message = resp
            .json::<serde_json::Value>()
            .await
            .ok()
            .and_then(|body| {
                body.get("message")
                    .and_then(|m| m.as_str())
                    .filter(|m| !m.is_empty())
                    .map(str::to_string)
            })
            .unwrap_or_else(|| DEFAULT_FAILURE_MESSAGE.to_string());

        Ok(LoginOutcome::Rejected { status, message })
    }
}
