use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::types::Change;

pub const UNKNOWN_PLACEHOLDER: &str = "(known after apply)";
pub const SENSITIVE_PLACEHOLDER: &str = "(sensitive value)";

/// One side of an attribute change, as it should be shown to a human.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "state", content = "value", rename_all = "snake_case")]
pub enum DisplayValue {
    Absent,
    Value(Value),
    Unknown,
    Sensitive,
}

impl fmt::Display for DisplayValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DisplayValue::Absent => f.write_str("null"),
            DisplayValue::Value(v) => write!(f, "{}", v),
            DisplayValue::Unknown => f.write_str(UNKNOWN_PLACEHOLDER),
            DisplayValue::Sensitive => f.write_str(SENSITIVE_PLACEHOLDER),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttributeChange {
    pub path: String,
    pub before: DisplayValue,
    pub after: DisplayValue,
}

/// Lists every attribute path whose value differs between `before` and `after`.
///
/// Nested objects flatten to dotted paths and lists to indexed paths
/// (`ingress[0].from_port`). Values flagged in `after_unknown` render as
/// unknown; values flagged sensitive are never carried in clear text.
pub fn attribute_changes(change: &Change) -> Vec<AttributeChange> {
    let before = flatten(&change.before);
    let after = flatten(&change.after);
    let unknown = marker_paths(&change.after_unknown);
    let before_sensitive = marker_paths(&change.before_sensitive);
    let after_sensitive = marker_paths(&change.after_sensitive);

    let paths: BTreeSet<&String> = before.keys().chain(after.keys()).chain(unknown.iter()).collect();

    paths
        .into_iter()
        .filter_map(|path| {
            let raw_before = before.get(path);
            let raw_after = after.get(path);
            let is_unknown = is_marked(&unknown, path);

            if !is_unknown && raw_before == raw_after {
                return None;
            }

            let before_value = if is_marked(&before_sensitive, path) {
                DisplayValue::Sensitive
            } else {
                raw_before.map_or(DisplayValue::Absent, |v| DisplayValue::Value(v.clone()))
            };

            let after_value = if is_unknown {
                DisplayValue::Unknown
            } else if is_marked(&after_sensitive, path) {
                DisplayValue::Sensitive
            } else {
                raw_after.map_or(DisplayValue::Absent, |v| DisplayValue::Value(v.clone()))
            };

            Some(AttributeChange {
                path: path.clone(),
                before: before_value,
                after: after_value,
            })
        })
        .collect()
}

fn flatten(value: &Value) -> BTreeMap<String, Value> {
    let mut out = BTreeMap::new();
    let empty_root = match value {
        Value::Null => true,
        Value::Object(map) => map.is_empty(),
        Value::Array(items) => items.is_empty(),
        _ => false,
    };
    if !empty_root {
        flatten_into(value, String::new(), &mut out);
    }
    out
}

fn flatten_into(value: &Value, prefix: String, out: &mut BTreeMap<String, Value>) {
    match value {
        Value::Object(map) if !map.is_empty() => {
            for (key, child) in map {
                let path = if prefix.is_empty() {
                    key.clone()
                } else {
                    format!("{}.{}", prefix, key)
                };
                flatten_into(child, path, out);
            }
        }
        Value::Array(items) if !items.is_empty() => {
            for (idx, child) in items.iter().enumerate() {
                flatten_into(child, format!("{}[{}]", prefix, idx), out);
            }
        }
        leaf => {
            out.insert(prefix, leaf.clone());
        }
    }
}

/// Copy of `value` with every part flagged `true` in `markers` (a
/// `*_sensitive` / `sensitive_values` tree) replaced by [`SENSITIVE_PLACEHOLDER`].
pub fn redact_sensitive(value: &Value, markers: &Value) -> Value {
    if markers.as_bool() == Some(true) {
        return Value::String(SENSITIVE_PLACEHOLDER.to_string());
    }

    match (value, markers) {
        (Value::Object(map), Value::Object(marks)) => Value::Object(
            map.iter()
                .map(|(key, child)| {
                    let redacted = match marks.get(key) {
                        Some(mark) => redact_sensitive(child, mark),
                        None => child.clone(),
                    };
                    (key.clone(), redacted)
                })
                .collect(),
        ),
        (Value::Array(items), Value::Array(marks)) => Value::Array(
            items
                .iter()
                .enumerate()
                .map(|(idx, child)| match marks.get(idx) {
                    Some(mark) => redact_sensitive(child, mark),
                    None => child.clone(),
                })
                .collect(),
        ),
        _ => value.clone(),
    }
}

/// Paths flagged `true` in an `after_unknown` / `*_sensitive` marker tree.
fn marker_paths(markers: &Value) -> BTreeSet<String> {
    flatten(markers)
        .into_iter()
        .filter(|(_, v)| v.as_bool() == Some(true))
        .map(|(path, _)| path)
        .collect()
}

// NOTE: A marker on a parent (or the whole value, path "") covers its children.
fn is_marked(markers: &BTreeSet<String>, path: &str) -> bool {
    markers.iter().any(|m| {
        m.is_empty()
            || m == path
            || path
                .strip_prefix(m.as_str())
                .is_some_and(|rest| rest.starts_with('.') || rest.starts_with('['))
    })
}
