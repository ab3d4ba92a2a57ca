//! Session identity: one opaque id per mounted conversation.
//!
//! The id is a random UUID v4 drawn from OS entropy. When no entropy source is
//! available the id degrades to `session-<unix millis>` instead of failing.

use chrono::Utc;
use serde::Serialize;
use std::fmt;
use uuid::Uuid;

/// Prefix of the timestamp-based fallback id.
pub const FALLBACK_PREFIX: &str = "session-";

/// Opaque identifier correlating every turn of one conversation server-side.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct SessionId(String);

impl SessionId {
    /// Generate a fresh id. Never fails.
    pub fn generate() -> Self {
        let mut bytes = [0u8; 16];
        let random = getrandom::getrandom(&mut bytes).map(|_| bytes);
        Self::from_entropy(random)
    }

    fn from_entropy<E: fmt::Display>(random: Result<[u8; 16], E>) -> Self {
        match random {
            Ok(bytes) => {
                let uuid: Uuid = uuid::Builder::from_random_bytes(bytes).into_uuid();
                Self(uuid.to_string())
            }
            Err(e) => {
                tracing::warn!("No strong randomness source ({}), using timestamp session id", e);
                Self(format!(
                    "{}{}",
                    FALLBACK_PREFIX,
                    Utc::now().timestamp_millis()
                ))
            }
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// True when the id came from the timestamp fallback.
    pub fn is_degraded(&self) -> bool {
        self.0.starts_with(FALLBACK_PREFIX)
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
