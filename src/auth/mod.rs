//! Authentication module: session cookie and upstream login forwarding
//!
//! Provides:
//! - Session cookie issuance and parsing (`cookie` submodule)
//! - Upstream credential forwarding (`upstream` submodule)

pub mod cookie;
pub mod upstream;
