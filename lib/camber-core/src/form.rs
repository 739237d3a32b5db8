//! Form-urlencoded serialization with bracket notation.
//!
//! Request bodies and query strings use the conventional bracket notation
//! for nested keys: `{"parent": {"child": "v"}}` serializes to
//! `parent[child]=v`, arrays to indexed keys `a[0][b]=c`. Keys and values
//! are percent-encoded except the square brackets themselves, which the
//! server accepts literally and which keep the strings readable.

use serde_json::Value;

use crate::template::encode_component;

/// Serialize a JSON value into a bracket-notation form string.
///
/// Scalars are stringified (`true`, `1234567890`), nulls are dropped, and
/// an empty object yields an empty string. Timestamps are expected as
/// integer epoch seconds and pass through unchanged.
#[must_use]
pub fn to_form_string(value: &Value) -> String {
    let mut pairs = Vec::new();
    collect_pairs(value, "", &mut pairs);
    pairs
        .iter()
        .map(|(key, value)| format!("{}={}", encode_key(key), encode_component(value)))
        .collect::<Vec<_>>()
        .join("&")
}

fn collect_pairs(value: &Value, key: &str, out: &mut Vec<(String, String)>) {
    match value {
        Value::Null => {}
        Value::Bool(b) => out.push((key.to_owned(), b.to_string())),
        Value::Number(n) => out.push((key.to_owned(), n.to_string())),
        Value::String(s) => out.push((key.to_owned(), s.clone())),
        Value::Array(items) => {
            for (index, item) in items.iter().enumerate() {
                collect_pairs(item, &format!("{key}[{index}]"), out);
            }
        }
        Value::Object(map) => {
            for (name, item) in map {
                let nested = if key.is_empty() {
                    name.clone()
                } else {
                    format!("{key}[{name}]")
                };
                collect_pairs(item, &nested, out);
            }
        }
    }
}

// Brackets are restored after encoding rather than exempted from the encode
// set, the same way the wire format is produced upstream.
fn encode_key(key: &str) -> String {
    encode_component(key).replace("%5B", "[").replace("%5D", "]")
}
