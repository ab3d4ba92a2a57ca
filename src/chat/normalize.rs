//! Reply extraction from answering-service bodies of unknown shape.
//!
//! JSON objects are searched with an ordered probe list. Any other body,
//! including JSON strings and arrays, is shown as trimmed raw text. When
//! neither yields text the reply is a fixed apology, so `normalize` is total.

use serde_json::Value;

/// Shown when nothing readable could be extracted from a response body.
pub const UNREADABLE_REPLY: &str = "Sorry, I could not read the response.";

/// Object fields probed for the reply, highest priority first.
pub const REPLY_FIELDS: [&str; 6] = ["answer", "response", "message", "reply", "content", "data"];

/// Extract a human-readable reply from a raw response body.
pub fn normalize(raw_body: &str) -> String {
    let candidate = match serde_json::from_str::<Value>(raw_body) {
        Ok(value @ Value::Object(_)) => probe(&value),
        Ok(_) | Err(_) => non_blank(raw_body),
    };

    candidate.unwrap_or_else(|| UNREADABLE_REPLY.to_string())
}

/// Probe the reply fields of an object in priority order; first hit wins.
fn probe(value: &Value) -> Option<String> {
    REPLY_FIELDS
        .iter()
        .find_map(|field| value.get(field).and_then(field_text))
}

/// Readable text of a single probed field value.
fn field_text(value: &Value) -> Option<String> {
    match value {
        // Blank strings count as absent; anything else is returned verbatim
        Value::String(text) if text.trim().is_empty() => None,
        Value::String(text) => Some(text.clone()),
        Value::Number(n) => Some(n.to_string()),
        // e.g. `{"data": {"answer": "..."}}`
        Value::Object(_) => probe(value),
        Value::Array(items) => {
            let parts: Vec<String> = items.iter().filter_map(field_text).collect();
            if parts.is_empty() {
                None
            } else {
                Some(parts.join("\n"))
            }
        }
        Value::Bool(_) | Value::Null => None,
    }
}

fn non_blank(text: &str) -> Option<String> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}
