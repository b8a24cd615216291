//! Lenient accessors for provider JSON, where numbers arrive as strings as
//! often as not.

use serde_json::Value;

pub fn str_of(v: &Value) -> Option<String> {
    match v {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

pub fn i64_of(v: &Value) -> Option<i64> {
    v.as_i64()
        .or_else(|| v.as_f64().map(|f| f as i64))
        .or_else(|| v.as_str().and_then(|s| s.trim().parse().ok()))
}

pub fn i32_of(v: &Value) -> Option<i32> {
    i64_of(v).and_then(|n| i32::try_from(n).ok())
}

pub fn u32_of(v: &Value) -> Option<u32> {
    i64_of(v).and_then(|n| u32::try_from(n).ok())
}

pub fn f64_of(v: &Value) -> Option<f64> {
    v.as_f64()
        .or_else(|| v.as_str().and_then(|s| s.trim().parse().ok()))
}

pub fn bool_of(v: &Value) -> bool {
    match v {
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_i64().unwrap_or(0) != 0,
        Value::String(s) => matches!(s.as_str(), "1" | "true" | "True"),
        _ => false,
    }
}

/// Move the value at a JSON pointer out of `v`, `Null` when absent.
pub fn take(v: &mut Value, pointer: &str) -> Value {
    v.pointer_mut(pointer).map(Value::take).unwrap_or(Value::Null)
}

/// Iterate an object's values or an array's items alike.
pub fn items(v: &Value) -> Box<dyn Iterator<Item = &Value> + '_> {
    match v {
        Value::Object(map) => Box::new(map.values()),
        Value::Array(items) => Box::new(items.iter()),
        _ => Box::new(std::iter::empty()),
    }
}
