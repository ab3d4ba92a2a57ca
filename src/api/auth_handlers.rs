//! Authentication route handlers: login forwarding and logout.
//!
//! Endpoints:
//! - `POST /api/authenticate`: Forwards credentials upstream, sets the session cookie
//! - `POST /api/logout`: Expires the session cookie

use crate::api::handlers::{AppError, ProxyState};
use crate::auth::cookie::{build_clear_cookie, build_session_cookie};
use crate::auth::upstream::LoginOutcome;
use axum::{
    extract::{rejection::JsonRejection, State},
    http::header::SET_COOKIE,
    response::IntoResponse,
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

// ============================================================================
// Request / Response types
// ============================================================================

/// Request body for POST /api/authenticate
#[derive(Debug, Default, Deserialize)]
pub struct AuthenticateRequest {
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
}

impl AuthenticateRequest {
    /// Both credentials, if both are present and non-empty
    fn credentials(self) -> Option<(String, String)> {
        let email = self.email.filter(|e| !e.is_empty())?;
        let password = self.password.filter(|p| !p.is_empty())?;
        Some((email, password))
    }
}

/// Body of a successful authenticate/logout
#[derive(Debug, Serialize)]
pub struct SuccessResponse {
    pub success: bool,
}

// ============================================================================
// Handlers
// ============================================================================

/// POST /api/authenticate: forward `{email, password}` to the auth backend.
///
/// Flow:
/// 1. Reject missing or empty credentials with 400
/// 2. POST them to the upstream login endpoint
/// 3. Upstream success → 200 + session cookie
/// 4. Upstream failure → relay its status and message
///
/// An unreachable upstream is reported as 502.
pub async fn authenticate(
    State(state): State<ProxyState>,
    payload: Result<Json<AuthenticateRequest>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let missing = || AppError::BadRequest("Email and password are required".to_string());

    let Json(req) = payload.map_err(|_| missing())?;
    let (email, password) = req.credentials().ok_or_else(missing)?;

    let outcome = state.upstream.login(&email, &password).await.map_err(|e| {
        warn!(upstream = %state.upstream.url(), "Auth backend unreachable: {}", e);
        AppError::BadGateway("Authentication service unavailable".to_string())
    })?;

    match outcome {
        LoginOutcome::Accepted => {
            info!("Login accepted by auth backend");
            Ok((
                [(SET_COOKIE, build_session_cookie(state.secure_cookies))],
                Json(SuccessResponse { success: true }),
            ))
        }
        LoginOutcome::Rejected { status, message } => {
            warn!(status = %status, "Login rejected by auth backend");
            Err(AppError::Upstream(status, message))
        }
    }
}

/// POST /api/logout: always expires the session cookie.
pub async fn logout(State(state): State<ProxyState>) -> impl IntoResponse {
    (
        [(SET_COOKIE, build_clear_cookie(state.secure_cookies))],
        Json(SuccessResponse { success: true }),
    )
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::handlers::ServerState;
    use crate::auth::upstream::UpstreamLogin;
    use axum::body::Body;
    use axum::http::{Request as HttpRequest, StatusCode};
    use axum::routing::post;
    use axum::Router;
    use serde_json::json;
    use std::sync::Arc;
    use tower::ServiceExt; // oneshot
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn make_state(upstream_url: &str, secure_cookies: bool) -> ProxyState {
        Arc::new(ServerState {
            upstream: UpstreamLogin::new(upstream_url).unwrap(),
            secure_cookies,
        })
    }

    /// Build a test router with the auth routes
    fn test_auth_app(state: ProxyState) -> Router {
        Router::new()
            .route("/api/authenticate", post(authenticate))
            .route("/api/logout", post(logout))
            .with_state(state)
    }

    fn login_request(body: serde_json::Value) -> HttpRequest<Body> {
        HttpRequest::builder()
            .method("POST")
            .uri("/api/authenticate")
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn read_json(resp: axum::response::Response) -> serde_json::Value {
        let body = axum::body::to_bytes(resp.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&body).unwrap()
    }

    fn set_cookie(resp: &axum::response::Response) -> Option<String> {
        resp.headers()
            .get(SET_COOKIE)
            .map(|v| v.to_str().unwrap().to_string())
    }

    async fn upstream_answering(status: u16, body: serde_json::Value) -> MockServer {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/auth/login"))
            .respond_with(ResponseTemplate::new(status).set_body_json(body))
            .mount(&server)
            .await;
        server
    }

    #[tokio::test]
    async fn test_authenticate_success_sets_cookie() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/auth/login"))
            .and(body_json(json!({ "email": "alice@example.com", "password": "hunter2" })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "ok": true })))
            .expect(1)
            .mount(&server)
            .await;

        let app = test_auth_app(make_state(&format!("{}/api/auth/login", server.uri()), false));
        let resp = app
            .oneshot(login_request(
                json!({ "email": "alice@example.com", "password": "hunter2" }),
            ))
            .await
            .unwrap();

        assert_eq!(resp.status(), StatusCode::OK);
        let cookie = set_cookie(&resp).expect("session cookie issued");
        assert!(cookie.starts_with("authToken=authenticated;"));
        assert!(cookie.contains("Max-Age=3600"));
        assert!(cookie.contains("SameSite=Strict"));
        assert!(!cookie.contains("Secure"));
        assert_eq!(read_json(resp).await, json!({ "success": true }));
    }

    #[tokio::test]
    async fn test_authenticate_secure_cookie_in_production() {
        let server = upstream_answering(200, json!({})).await;
        let app = test_auth_app(make_state(&format!("{}/api/auth/login", server.uri()), true));

        let resp = app
            .oneshot(login_request(json!({ "email": "a@b.c", "password": "pw" })))
            .await
            .unwrap();

        assert_eq!(resp.status(), StatusCode::OK);
        assert!(set_cookie(&resp).unwrap().ends_with("; Secure"));
    }

    #[tokio::test]
    async fn test_authenticate_missing_fields_returns_400() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        for body in [
            json!({}),
            json!({ "email": "a@b.c" }),
            json!({ "password": "pw" }),
            json!({ "email": "", "password": "pw" }),
        ] {
            let app = test_auth_app(make_state(&server.uri(), false));
            let resp = app.oneshot(login_request(body.clone())).await.unwrap();
            assert_eq!(resp.status(), StatusCode::BAD_REQUEST, "body {}", body);
            assert!(set_cookie(&resp).is_none());
            assert_eq!(
                read_json(resp).await["message"],
                "Email and password are required"
            );
        }
    }

    #[tokio::test]
    async fn test_authenticate_malformed_body_returns_400() {
        let app = test_auth_app(make_state("http://127.0.0.1:9/unused", false));
        let req = HttpRequest::builder()
            .method("POST")
            .uri("/api/authenticate")
            .header("content-type", "application/json")
            .body(Body::from("not json"))
            .unwrap();

        let resp = app.oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_authenticate_relays_upstream_failure() {
        let server = upstream_answering(401, json!({ "message": "Invalid credentials" })).await;
        let app = test_auth_app(make_state(&format!("{}/api/auth/login", server.uri()), false));

        let resp = app
            .oneshot(login_request(json!({ "email": "a@b.c", "password": "bad" })))
            .await
            .unwrap();

        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
        assert!(set_cookie(&resp).is_none());
        assert_eq!(read_json(resp).await["message"], "Invalid credentials");
    }

    #[tokio::test]
    async fn test_authenticate_upstream_failure_default_message() {
        let server = upstream_answering(503, json!({ "error": "down" })).await;
        let app = test_auth_app(make_state(&format!("{}/api/auth/login", server.uri()), false));

        let resp = app
            .oneshot(login_request(json!({ "email": "a@b.c", "password": "pw" })))
            .await
            .unwrap();

        assert_eq!(resp.status(), StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(read_json(resp).await["message"], "Authentication failed");
    }

    #[tokio::test]
    async fn test_authenticate_unreachable_upstream_returns_502() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        drop(listener);

        let app = test_auth_app(make_state(&format!("http://127.0.0.1:{}/login", port), false));
        let resp = app
            .oneshot(login_request(json!({ "email": "a@b.c", "password": "pw" })))
            .await
            .unwrap();

        assert_eq!(resp.status(), StatusCode::BAD_GATEWAY);
        assert!(set_cookie(&resp).is_none());
    }

    #[tokio::test]
    async fn test_logout_clears_cookie() {
        let app = test_auth_app(make_state("http://127.0.0.1:9/unused", false));
        let req = HttpRequest::builder()
            .method("POST")
            .uri("/api/logout")
            .body(Body::empty())
            .unwrap();

        let resp = app.oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);

        let cookie = set_cookie(&resp).expect("clearing cookie issued");
        assert!(cookie.starts_with("authToken=;"));
        assert!(cookie.contains("Max-Age=0"));
        assert_eq!(read_json(resp).await, json!({ "success": true }));
    }
}
