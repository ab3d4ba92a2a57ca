//! Session cookie helpers.
//!
//! The cookie is a presence marker: a successful upstream login sets
//! `authToken=authenticated`, logout expires it. Its presence is the chat
//! gate's auth signal.
//!
//! Cookie format: `authToken=authenticated; HttpOnly; SameSite=Strict; Path=/; Max-Age=3600; [Secure]`
//! - `HttpOnly`: not accessible via JavaScript
//! - `SameSite=Strict`: never sent on cross-site requests
//! - `Secure`: only in production

/// Cookie name for the session marker.
pub const SESSION_COOKIE_NAME: &str = "authToken";

/// Value written on successful login.
pub const SESSION_COOKIE_VALUE: &str = "authenticated";

/// Session lifetime: one hour.
pub const SESSION_MAX_AGE_SECS: u64 = 60 * 60;

/// Build the `Set-Cookie` header value issued after a successful login.
pub fn build_session_cookie(is_secure: bool) -> String {
    format_cookie(SESSION_COOKIE_VALUE, SESSION_MAX_AGE_SECS, is_secure)
}

/// Build a `Set-Cookie` header value that expires the session cookie.
pub fn build_clear_cookie(is_secure: bool) -> String {
    format_cookie("", 0, is_secure)
}

fn format_cookie(value: &str, max_age_secs: u64, is_secure: bool) -> String {
    let secure_flag = if is_secure { "; Secure" } else { "" };
    format!(
        "{}={}; HttpOnly; SameSite=Strict; Path=/; Max-Age={}{}",
        SESSION_COOKIE_NAME, value, max_age_secs, secure_flag
    )
}

/// Extract the session cookie value from a `Cookie` header.
///
/// An empty value counts as absent.
pub fn extract_session_cookie(cookie_header: &str) -> Option<String> {
    let prefix = format!("{}=", SESSION_COOKIE_NAME);
    cookie_header
        .split(';')
        .filter_map(|part| part.trim().strip_prefix(prefix.as_str()))
        .map(str::trim)
        .find(|value| !value.is_empty())
        .map(str::to_string)
}

/// Whether cookies carry the `Secure` flag for the given deployment environment.
pub fn should_set_secure(environment: Option<&str>) -> bool {
    environment.is_some_and(|env| env.eq_ignore_ascii_case("production"))
}

// ============================================================================
// Tests
// ============================================================================
