//! Typed resource clients for the admin backend.
//!
//! DESIGN
//! ======
//! The backend wraps most replies in `{ success, data, message }` and is not
//! consistent about field naming (`app_id` vs `appId`). Each resource has one
//! normalization function that accepts every known alias and yields a single
//! canonical struct. Nothing past this boundary looks at raw JSON.

pub mod applications;
pub mod auth;
pub mod bulk;
pub mod credentials;
pub mod dashboard;
pub mod users;

use serde_json::{Map, Value};

use crate::error::ApiError;

pub use applications::{Application, ApplicationDraft, Applications};
pub use auth::{Auth, LoginRequest};
pub use bulk::{BulkUpload, UploadKind, UploadReport};
pub use credentials::{AzureCredential, CredentialDraft, Credentials};
pub use dashboard::{Dashboard, DashboardSummary};
pub use users::{AppUser, UserDraft, Users};

// =============================================================================
// ENVELOPE
// =============================================================================

/// Unwrap `{ success, data, message }`, returning `data`.
///
/// A bare array is accepted as-is. `success: false` (or a missing flag)
/// rejects with the server's `message`, falling back to `fallback`.
pub(crate) fn unwrap_envelope(body: Value, fallback: &str) -> Result<Value, ApiError> {
    match body {
        Value::Object(mut map) => {
            if map.get("success").and_then(Value::as_bool) == Some(true) {
                return Ok(map.remove("data").unwrap_or(Value::Null));
            }
            let message = map.get("message").and_then(Value::as_str).filter(|m| !m.is_empty()).unwrap_or(fallback);
            Err(ApiError::Rejected(message.to_owned()))
        }
        Value::Array(_) => Ok(body),
        _ => Err(ApiError::Rejected(fallback.to_owned())),
    }
}

/// Unwrap the envelope and require a list (or nothing) inside it.
pub(crate) fn unwrap_list(body: Value, fallback: &str) -> Result<Vec<Value>, ApiError> {
    match unwrap_envelope(body, fallback)? {
        Value::Array(items) => Ok(items),
        Value::Null => Ok(Vec::new()),
        other => Err(ApiError::Decode(format!("expected a list, got {}", type_name(&other)))),
    }
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Path segment for a resource id.
pub(crate) fn item_path(collection: &str, id: &str) -> String {
    format!("{collection}/{}", id.trim())
}

/// Numeric ids go over the wire as numbers, anything else as a string.
pub(crate) fn id_value(id: &str) -> Value {
    let id = id.trim();
    id.parse::<i64>().map_or_else(|_| Value::String(id.to_owned()), Value::from)
}

// =============================================================================
// FIELD ALIASES
// =============================================================================

/// Read-only view of a JSON object that resolves a field through its aliases.
pub(crate) struct Fields<'a>(&'a Map<String, Value>);

impl<'a> Fields<'a> {
    pub(crate) fn of(value: &'a Value) -> Result<Self, ApiError> {
        value
            .as_object()
            .map(Fields)
            .ok_or_else(|| ApiError::Decode(format!("expected an object, got {}", type_name(value))))
    }

    fn first(&self, keys: &[&str]) -> Option<&'a Value> {
        keys.iter().filter_map(|key| self.0.get(*key)).find(|value| !is_blank(value))
    }

    /// First non-blank alias rendered as text; numbers are stringified.
    pub(crate) fn text(&self, keys: &[&str]) -> Option<String> {
        match self.first(keys)? {
            Value::String(s) => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            Value::Bool(b) => Some(b.to_string()),
            _ => None,
        }
    }

    pub(crate) fn text_or_empty(&self, keys: &[&str]) -> String {
        self.text(keys).unwrap_or_default()
    }

    /// First truthy alias. Accepts booleans, `1`, and the strings
    /// `"true"`, `"1"`, `"active"` (any case).
    pub(crate) fn flag(&self, keys: &[&str]) -> bool {
        keys.iter().filter_map(|key| self.0.get(*key)).any(is_truthy)
    }

    /// Date fields are shown as their `YYYY-MM-DD` prefix.
    pub(crate) fn date(&self, keys: &[&str]) -> String {
        self.text(keys).map(|raw| date_prefix(&raw).to_owned()).unwrap_or_default()
    }
}

fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.is_empty(),
        _ => false,
    }
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|n| n != 0.0),
        Value::String(s) => matches!(s.to_ascii_lowercase().as_str(), "true" | "1" | "active"),
        _ => false,
    }
}

fn date_prefix(raw: &str) -> &str {
    raw.split('T').next().unwrap_or(raw)
}

/// `"Active"` / `"Inactive"` as the backend spells them.
#[must_use]
pub fn status_label(active: bool) -> &'static str {
    if active { "Active" } else { "Inactive" }
}

#[cfg(test)]
#[path = "mod_test.rs"]
mod tests;
