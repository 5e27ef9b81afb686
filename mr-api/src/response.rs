//! Shared response types.
//!
//! Mutating endpoints answer with a small `{status, message}` object; errors
//! come back as `{detail}`, where `detail` is a string for application
//! errors and a list of field errors for rejected request bodies.

use serde::{Deserialize, Serialize};

/// Reply of the mutating endpoints (register, start, stop, save settings).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ActionResponse {
    /// `"success"` when the action was carried out.
    #[serde(default)]
    pub status: String,
    /// Human-readable message.
    #[serde(default)]
    pub message: String,
}

impl ActionResponse {
    /// Whether the server reported success.
    pub fn is_success(&self) -> bool {
        self.status == "success"
    }
}

#[derive(Deserialize)]
struct ErrorBody {
    #[serde(default)]
    detail: serde_json::Value,
}

/// Extract the `detail` message from an error body, if there is one.
pub fn error_detail(body: &str) -> Option<String> {
    let parsed: ErrorBody = serde_json::from_str(body).ok()?;
    match parsed.detail {
        serde_json::Value::Null => None,
        serde_json::Value::String(s) => Some(s),
        serde_json::Value::Array(items) => {
            let messages: Vec<String> = items
                .iter()
                .map(|item| match item.get("msg").and_then(|m| m.as_str()) {
                    Some(msg) => field_message(item, msg),
                    None => item.to_string(),
                })
                .collect();
            Some(messages.join("; "))
        }
        other => Some(other.to_string()),
    }
}

/// `body.mode: Field required` style message for a validation error item.
fn field_message(item: &serde_json::Value, msg: &str) -> String {
    let location: Vec<String> = item
        .get("loc")
        .and_then(|l| l.as_array())
        .map(|parts| {
            parts
                .iter()
                .map(|p| match p.as_str() {
                    Some(s) => s.to_string(),
                    None => p.to_string(),
                })
                .collect()
        })
        .unwrap_or_default();

    if location.is_empty() {
        msg.to_string()
    } else {
        format!("{}: {msg}", location.join("."))
    }
}
