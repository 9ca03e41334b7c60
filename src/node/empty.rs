//! Semantic emptiness for the omit-if-empty rule

use serde_json::Value;

/// Text encoding of the zero timestamp; treated as empty
pub const ZERO_TIME_LITERAL: &str = "0001-01-01T00:00:00Z";

/// Whether a value counts as empty for omit-if-empty fields
///
/// Empty: null, `false`, numeric zero, empty string, the zero timestamp
/// literal, empty arrays and empty objects. Nothing else.
pub fn is_empty_value(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                i == 0
            } else if let Some(u) = n.as_u64() {
                u == 0
            } else {
                n.as_f64() == Some(0.0)
            }
        }
        Value::String(s) => s.is_empty() || s == ZERO_TIME_LITERAL,
        Value::Array(items) => items.is_empty(),
        Value::Object(map) => map.is_empty(),
    }
}
