//! API route definitions

use super::auth_handlers;
use super::handlers::{self, ProxyState};
use axum::{
    routing::{get, post},
    Router,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// Create the auth proxy router
pub fn create_router(state: ProxyState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        // Health check
        .route("/health", get(handlers::health))
        // ====================================================================
        // Session (chat gate signal)
        // ====================================================================
        .route("/api/session", get(handlers::session_status))
        // ====================================================================
        // Auth proxy
        // ====================================================================
        .route("/api/authenticate", post(auth_handlers::authenticate))
        .route("/api/logout", post(auth_handlers::logout))
        // Middleware
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
