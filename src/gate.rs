//! Visibility gate for the chat widget.
//!
//! The signal is the presence of the session cookie. When it is false nothing
//! is mounted: no session id, no conversation.

use crate::auth::cookie::extract_session_cookie;
use crate::chat::{ChatSession, TurnDispatcher};

/// Whether the chat widget may exist at all.
pub fn is_visible(auth_signal: bool) -> bool {
    auth_signal
}

/// Derive the auth signal from a `Cookie` request header.
pub fn signal_from_cookies(cookie_header: Option<&str>) -> bool {
    cookie_header
        .and_then(extract_session_cookie)
        .is_some()
}

/// Mount a chat session if the gate allows it.
pub fn mount(auth_signal: bool, dispatcher: TurnDispatcher) -> Option<ChatSession> {
    if !is_visible(auth_signal) {
        tracing::debug!("Chat gate closed; widget not mounted");
        return None;
    }
    Some(ChatSession::new(dispatcher))
}
