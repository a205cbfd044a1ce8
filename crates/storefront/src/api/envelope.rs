//! Response envelope normalization.
//!
//! Resource endpoints wrap their payload as `{ "data": ... }` (paginated lists
//! add `links`/`meta` beside it); auth endpoints return the payload bare. This
//! is the only place that knows about the difference.

use serde_json::Value;

/// Strip a `{ "data": ... }` envelope if the body has a truthy `data` member.
///
/// "Truthy" follows the backend client convention: `null`, `false`, `0`, and
/// `""` do not count as a payload, so an object carrying one of those under
/// `data` is returned unchanged.
pub fn unwrap_envelope(body: Value) -> Value {
    match body {
        Value::Object(mut map) if map.get("data").is_some_and(is_truthy) => {
            map.remove("data").unwrap_or(Value::Null)
        }
        other => other,
    }
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}
