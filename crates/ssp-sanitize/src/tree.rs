//! Tree Sanitizer
//!
//! Recursively walks an arbitrary JSON document and returns a sanitized copy:
//! every string leaf passes through the String Sanitizer, empty sequences and
//! mappings are dropped (propagating deletion upward), and allow-listed keys
//! survive as empty sequences. The input is never mutated.
//!
//! ## Recursion Rules
//!
//! | Input | Output |
//! |-------|--------|
//! | `null` | absent |
//! | string | [`sanitize_string`] |
//! | number, boolean | unchanged |
//! | sequence | sanitized elements, absent if empty unless preserved |
//! | mapping | sanitized values, absent if empty (except at the root) |
//!
//! Sanitization is idempotent: sanitizing an already-sanitized tree yields
//! the same tree.

use crate::models::SanitizeOptions;
use crate::text::sanitize_string;
use serde_json::{Map, Value};
use tracing::debug;

/// Key holding OSCAL annotation lists.
const PROPS_KEY: &str = "props";

/// Sanitize a whole document.
///
/// This is the terminal step before a document leaves the engine. The root
/// always survives: an object or sequence that sanitizes to nothing comes
/// back empty rather than absent.
///
/// # Example
///
/// ```rust
/// use ssp_sanitize::{sanitize_document, SanitizeOptions};
/// use serde_json::json;
///
/// let doc = json!({
///     "title": "  Plan ",
///     "notes": [],
///     "metadata": { "remarks": null }
/// });
///
/// let clean = sanitize_document(&doc, &SanitizeOptions::default());
/// assert_eq!(clean, json!({ "title": "Plan" }));
/// ```
pub fn sanitize_document(document: &Value, options: &SanitizeOptions) -> Value {
    match document {
        Value::Object(map) => Value::Object(sanitize_map(map, options)),
        Value::Array(items) => Value::Array(sanitize_items(items, options)),
        other => sanitize_value(other, false, options).unwrap_or(Value::Null),
    }
}

/// Sanitize a single value below the root.
///
/// Returns `None` when the value should be dropped from its parent.
/// `preserve_empty` keeps an empty sequence alive; it applies to this value
/// only, never to its children.
pub fn sanitize_value(
    value: &Value,
    preserve_empty: bool,
    options: &SanitizeOptions,
) -> Option<Value> {
    match value {
        Value::Null => None,
        Value::String(s) => sanitize_string(s, options).map(Value::String),
        Value::Bool(_) | Value::Number(_) => Some(value.clone()),
        Value::Array(items) => {
            let sanitized = sanitize_items(items, options);
            if sanitized.is_empty() && !preserve_empty {
                None
            } else {
                Some(Value::Array(sanitized))
            }
        }
        Value::Object(map) => {
            let sanitized = sanitize_map(map, options);
            if sanitized.is_empty() {
                None
            } else {
                Some(Value::Object(sanitized))
            }
        }
    }
}

fn sanitize_items(items: &[Value], options: &SanitizeOptions) -> Vec<Value> {
    items
        .iter()
        .filter_map(|item| sanitize_value(item, false, options))
        .collect()
}

fn sanitize_map(map: &Map<String, Value>, options: &SanitizeOptions) -> Map<String, Value> {
    let mut out = Map::new();

    for (key, value) in map {
        let preserve = options.is_preserved(key);
        let sanitized = if key == PROPS_KEY {
            sanitize_props(value, options)
        } else {
            sanitize_value(value, preserve, options)
        };

        match sanitized {
            Some(v) => {
                out.insert(key.clone(), v);
            }
            None if preserve => {
                out.insert(key.clone(), Value::Array(Vec::new()));
            }
            None => {
                debug!(key = %key, "Dropping empty field");
            }
        }
    }

    out
}

/// Sanitize an annotation list.
///
/// A prop needs both a `name` and a `value`. Entries are sanitized without
/// the placeholder, so only a name or value that was blank or absent drops
/// the entry; a value that reads "N/A" is content and stays.
fn sanitize_props(value: &Value, options: &SanitizeOptions) -> Option<Value> {
    let Value::Array(items) = value else {
        return sanitize_value(value, false, options);
    };

    let strict = options.clone().with_use_default(false);
    let props: Vec<Value> = items
        .iter()
        .filter_map(|item| sanitize_value(item, false, &strict))
        .filter(is_complete_prop)
        .collect();

    if props.is_empty() {
        None
    } else {
        Some(Value::Array(props))
    }
}

fn is_complete_prop(prop: &Value) -> bool {
    let Value::Object(map) = prop else {
        return true;
    };

    let present = |field: &str| map.get(field).is_some_and(|v| !v.is_null());
    present("name") && present("value")
}
