//! Query-string flattening for GET parameters
//!
//! The service expects arrays as bracket-indexed keys (`fields[0]=a`,
//! `fields[1]=b`) and nested objects as dotted keys, matching what its own
//! clients produce.

use serde_json::Value;

/// Flatten a JSON parameter object into query pairs.
///
/// `null` values are dropped. Non-object inputs produce no pairs.
pub(crate) fn flatten_params(params: &Value) -> Vec<(String, String)> {
    let mut pairs = Vec::new();
    if let Value::Object(map) = params {
        for (key, value) in map {
            push_pair(&mut pairs, key, value);
        }
    }
    pairs
}

fn push_pair(pairs: &mut Vec<(String, String)>, key: &str, value: &Value) {
    match value {
        Value::Null => {}
        Value::Bool(b) => pairs.push((key.to_string(), b.to_string())),
        Value::Number(n) => pairs.push((key.to_string(), n.to_string())),
        Value::String(s) => pairs.push((key.to_string(), s.clone())),
        Value::Array(items) => {
            for (index, item) in items.iter().enumerate() {
                push_pair(pairs, &format!("{key}[{index}]"), item);
            }
        }
        Value::Object(map) => {
            for (sub_key, sub_value) in map {
                push_pair(pairs, &format!("{key}.{sub_key}"), sub_value);
            }
        }
    }
}
