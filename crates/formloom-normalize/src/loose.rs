//! Lenient accessors over untyped JSON objects.

use serde_json::{Map, Value};

pub type Object = Map<String, Value>;

/// First present, non-null value under any of `keys`.
pub(crate) fn first<'a>(obj: &'a Object, keys: &[&str]) -> Option<&'a Value> {
    keys.iter()
        .filter_map(|k| obj.get(*k))
        .find(|v| !v.is_null())
}

/// First non-blank string under any of `keys`, trimmed.
pub(crate) fn text<'a>(obj: &'a Object, keys: &[&str]) -> Option<&'a str> {
    keys.iter()
        .filter_map(|k| obj.get(*k).and_then(Value::as_str))
        .map(str::trim)
        .find(|s| !s.is_empty())
}

/// String or number under any of `keys`, rendered as text.
pub(crate) fn scalar(obj: &Object, keys: &[&str]) -> Option<String> {
    keys.iter().find_map(|k| match obj.get(*k)? {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    })
}

pub(crate) fn number(obj: &Object, keys: &[&str]) -> Option<f64> {
    first(obj, keys).and_then(as_f64)
}

pub(crate) fn flag(obj: &Object, keys: &[&str]) -> Option<bool> {
    first(obj, keys).and_then(|v| match v {
        Value::Bool(b) => Some(*b),
        Value::String(s) => match s.trim().to_ascii_lowercase().as_str() {
            "true" | "yes" | "1" => Some(true),
            "false" | "no" | "0" => Some(false),
            _ => None,
        },
        Value::Number(n) => n.as_f64().map(|n| n != 0.0),
        _ => None,
    })
}

pub(crate) fn array<'a>(obj: &'a Object, keys: &[&str]) -> Option<&'a Vec<Value>> {
    keys.iter().find_map(|k| obj.get(*k).and_then(Value::as_array))
}

/// Numbers and numeric strings.
pub(crate) fn as_f64(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Lowercase and drop everything but ASCII alphanumerics, so `Date_Time`,
/// `date-time` and `dateTime` compare equal.
pub(crate) fn compact(name: &str) -> String {
    name.chars()
        .filter(char::is_ascii_alphanumeric)
        .map(|c| c.to_ascii_lowercase())
        .collect()
}

/// `first_name` → `First name`.
pub(crate) fn humanize(id: &str) -> String {
    let spaced: String = id
        .chars()
        .map(|c| if c == '_' || c == '-' { ' ' } else { c })
        .collect();
    let mut words = spaced.split_whitespace();
    let mut out = String::new();
    if let Some(head) = words.next() {
        let mut chars = head.chars();
        if let Some(c) = chars.next() {
            out.extend(c.to_uppercase());
            out.push_str(chars.as_str());
        }
    }
    for word in words {
        out.push(' ');
        out.push_str(word);
    }
    out
}

pub(crate) fn kind_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
