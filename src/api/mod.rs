//! HTTP API for the auth proxy

pub mod auth_handlers;
pub mod handlers;
pub mod routes;

pub use routes::create_router;
