//! Resolution of an untyped backend answer into one display string.
//!
//! The retrieval backend's answer field is sometimes an object with a
//! `result` key, sometimes that object serialised to a string, and
//! sometimes a Python-style repr of it (single quotes). It is modelled once
//! at the boundary as [`BackendPayload`] and resolved by [`resolve`], which
//! never fails: whatever it cannot interpret is shown as literal text.
//!
//! ## Resolution order
//!
//! 1. Structured value with a `result` field → that field.
//! 2. String → strict JSON parse → `result` field.
//! 3. Strict parse failed → replace every `'` with `"` → parse → `result`.
//! 4. The original string, unchanged.
//!
//! Step 3 is lossy: it cannot tell a structural quote from an apostrophe, so
//! it only runs when the strict parse has already failed. Text such as
//! `{'result': 'it's fine'}` therefore stays literal.

use serde_json::Value;
use tracing::debug;

const RESULT_FIELD: &str = "result";

/// An answer payload as received from the backend.
#[derive(Debug, Clone, PartialEq)]
pub enum BackendPayload {
    /// A plain string, which may or may not contain serialised JSON.
    Plain(String),
    /// Any non-string JSON value.
    Structured(Value),
}

impl BackendPayload {
    /// Classify a JSON value read from the wire.
    pub fn from_value(value: Value) -> Self {
        match value {
            Value::String(s) => BackendPayload::Plain(s),
            other => BackendPayload::Structured(other),
        }
    }

    /// Resolve to a display string. See [`resolve`].
    pub fn resolve(&self) -> String {
        match self {
            BackendPayload::Structured(value) => match result_field(value) {
                Some(text) => text,
                None => {
                    debug!("Structured payload has no `result` field; showing it literally");
                    value.to_string()
                }
            },
            BackendPayload::Plain(text) => resolve_str(text),
        }
    }
}

impl From<Value> for BackendPayload {
    fn from(value: Value) -> Self {
        Self::from_value(value)
    }
}

impl From<String> for BackendPayload {
    fn from(s: String) -> Self {
        BackendPayload::Plain(s)
    }
}

impl From<&str> for BackendPayload {
    fn from(s: &str) -> Self {
        BackendPayload::Plain(s.to_string())
    }
}

/// Resolve any payload into the string intended for display.
///
/// ```rust
/// use docsift::answer::resolve;
/// use serde_json::json;
///
/// assert_eq!(resolve(json!({"result": "hi"})), "hi");
/// assert_eq!(resolve(r#"{"result": "hi"}"#), "hi");
/// assert_eq!(resolve("{'result': 'hi'}"), "hi");
/// assert_eq!(resolve("hello world"), "hello world");
/// ```
pub fn resolve(payload: impl Into<BackendPayload>) -> String {
    payload.into().resolve()
}

fn resolve_str(text: &str) -> String {
    // Only an object can carry a field; skip parsing prose entirely.
    if !text.trim_start().starts_with('{') {
        return text.to_string();
    }

    match serde_json::from_str::<Value>(text) {
        Ok(value) => {
            if let Some(result) = result_field(&value) {
                return result;
            }
            debug!("Payload parsed as JSON without a `result` field");
        }
        Err(strict_err) => {
            debug!("Strict parse failed ({}); retrying with quotes swapped", strict_err);
            let lenient = text.replace('\'', "\"");
            match serde_json::from_str::<Value>(&lenient) {
                Ok(value) => {
                    if let Some(result) = result_field(&value) {
                        return result;
                    }
                }
                Err(e) => debug!("Lenient parse failed ({}); showing payload literally", e),
            }
        }
    }

    text.to_string()
}

/// The `result` field as display text: strings verbatim, `null` as empty,
/// anything else as compact JSON.
fn result_field(value: &Value) -> Option<String> {
    let field = value.as_object()?.get(RESULT_FIELD)?;
    Some(match field {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    })
}
