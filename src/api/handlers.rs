//! API request handlers: shared state, health, session status, errors

use crate::auth::upstream::UpstreamLogin;
use crate::gate;
use crate::Config;
use axum::{
    http::{header::COOKIE, HeaderMap, StatusCode},
    response::IntoResponse,
    Json,
};
use serde::Serialize;
use std::sync::Arc;

/// Shared server state
pub struct ServerState {
    /// Forwards credentials to the auth backend
    pub upstream: UpstreamLogin,
    /// Whether issued cookies carry the `Secure` flag
    pub secure_cookies: bool,
}

/// Shared proxy state
pub type ProxyState = Arc<ServerState>;

impl ServerState {
    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        Ok(Self {
            upstream: UpstreamLogin::new(config.auth_backend_url.clone())?,
            secure_cookies: config.secure_cookies,
        })
    }
}

// ============================================================================
// Health check
// ============================================================================

/// Health check response
#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

// ============================================================================
// Session status
// ============================================================================

/// Response for GET /api/session
#[derive(Debug, Serialize)]
pub struct SessionStatusResponse {
    pub authenticated: bool,
}

/// GET /api/session: reports whether the request carries the session cookie.
///
/// Clients cannot read the HttpOnly cookie themselves; this is how they obtain
/// the chat gate's signal.
pub async fn session_status(headers: HeaderMap) -> Json<SessionStatusResponse> {
    let cookie_header = headers.get(COOKIE).and_then(|v| v.to_str().ok());
    Json(SessionStatusResponse {
        authenticated: gate::signal_from_cookies(cookie_header),
    })
}

// ============================================================================
// Error handling
// ============================================================================

/// Application error type
#[derive(Debug)]
pub enum AppError {
    BadRequest(String),
    BadGateway(String),
    /// A failure relayed from the auth backend with its own status
    Upstream(StatusCode, String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let (status, message) = match self {
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::BadGateway(msg) => (StatusCode::BAD_GATEWAY, msg),
            AppError::Upstream(status, msg) => (status, msg),
        };

        let body = Json(serde_json::json!({
            "message": message
        }));

        (status, body).into_response()
    }
}
