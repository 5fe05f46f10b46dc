//! Value helpers shared by expressions and filters.

use serde_json::{Number, Value};
use std::cmp::Ordering;

/// Returns the JSON type name of a value.
pub fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Walks `path` through nested objects.
///
/// Returns `None` on the first missing segment or when an intermediate value
/// is not an object.
pub fn walk_path<'a>(doc: &'a Value, path: &[String]) -> Option<&'a Value> {
    let mut current = doc;
    for step in path {
        current = current.as_object()?.get(step)?;
    }
    Some(current)
}

/// Strict JSON equality.
///
/// Values of different types never compare equal. Numbers compare by numeric
/// value, so `1` equals `1.0`.
pub fn json_eq(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => cmp_numbers(x, y) == Some(Ordering::Equal),
        (Value::Array(x), Value::Array(y)) => {
            x.len() == y.len() && x.iter().zip(y).all(|(a, b)| json_eq(a, b))
        }
        (Value::Object(x), Value::Object(y)) => {
            x.len() == y.len()
                && x.iter()
                    .all(|(k, v)| y.get(k).is_some_and(|other| json_eq(v, other)))
        }
        _ => a == b,
    }
}

/// Orders two numbers or two strings. Any other pairing is unordered.
pub fn compare(a: &Value, b: &Value) -> Option<Ordering> {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => cmp_numbers(x, y),
        (Value::String(x), Value::String(y)) => Some(x.cmp(y)),
        _ => None,
    }
}

/// Integers are compared exactly over the full `i64` and `u64` range; only
/// a float on either side falls back to `f64`.
fn cmp_numbers(x: &Number, y: &Number) -> Option<Ordering> {
    match (as_integer(x), as_integer(y)) {
        (Some(x), Some(y)) => Some(x.cmp(&y)),
        _ => x.as_f64()?.partial_cmp(&y.as_f64()?),
    }
}

fn as_integer(n: &Number) -> Option<i128> {
    n.as_i64()
        .map(i128::from)
        .or_else(|| n.as_u64().map(i128::from))
}

/// String form of a scalar used as a lookup key.
///
/// Strings are used as-is, numbers and booleans are formatted. `null`,
/// arrays and objects have no key.
pub fn scalar_key(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Turns an evaluated value into a document id.
///
/// Only non-empty strings and numbers identify a document.
pub fn doc_id(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// True when `token` is one of the whitespace-separated items of a
/// multi-select answer.
pub fn multi_contains(answer: &Value, token: &Value) -> bool {
    let (Value::String(answer), Some(token)) = (answer, scalar_key(token)) else {
        return false;
    };
    answer.split_whitespace().any(|item| item == token)
}
