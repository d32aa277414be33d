//! # Document Fingerprinting
//!
//! Produces a stable fingerprint for a parsed document so that two inputs
//! differing only in key order or whitespace are recognised as the same
//! document. The facade keys its extraction cache on this fingerprint.
//!
//! The canonical form follows RFC 8785 (JSON Canonicalization Scheme):
//!
//! | Rule | Effect |
//! |------|--------|
//! | Object keys | Sorted by UTF-16 code units |
//! | Arrays | Original order |
//! | Strings | Only `"`, `\` and control characters escaped |
//! | Numbers | Integers verbatim, integral floats without fraction |
//! | Whitespace | None |
//!
//! ## References
//!
//! - **RFC 8785** - "JSON Canonicalization Scheme (JCS)"
//!   <https://www.rfc-editor.org/rfc/rfc8785>
//!
//! ## Example
//!
//! ```rust
//! use ssp_extract::canonicalize::{canonical_json, DocumentHash};
//! use serde_json::json;
//!
//! let a = json!({"system-security-plan": {"uuid": "1", "metadata": {}}});
//! let b = json!({"system-security-plan": {"metadata": {}, "uuid": "1"}});
//!
//! assert_eq!(canonical_json(&a), r#"{"system-security-plan":{"metadata":{},"uuid":"1"}}"#);
//! assert_eq!(DocumentHash::of(&a), DocumentHash::of(&b));
//! ```

use serde_json::{Map, Number, Value};
use sha2::{Digest, Sha256};
use std::cmp::Ordering;
use std::fmt;
use std::fmt::Write as _;

/// SHA-256 of a document's canonical form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DocumentHash(pub [u8; 32]);

impl DocumentHash {
    /// Fingerprints a parsed document.
    pub fn of(document: &Value) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(canonical_json(document).as_bytes());
        Self(hasher.finalize().into())
    }

    /// Lowercase hex rendering, used in log lines.
    pub fn to_hex(&self) -> String {
        self.0.iter().fold(String::with_capacity(64), |mut out, byte| {
            let _ = write!(out, "{byte:02x}");
            out
        })
    }
}

impl fmt::Display for DocumentHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

/// Renders a value in RFC 8785 canonical form.
pub fn canonical_json(value: &Value) -> String {
    let mut out = String::new();
    write_value(value, &mut out);
    out
}

fn write_value(value: &Value, out: &mut String) {
    match value {
        Value::Null => out.push_str("null"),
        Value::Bool(true) => out.push_str("true"),
        Value::Bool(false) => out.push_str("false"),
        Value::Number(n) => write_number(n, out),
        Value::String(s) => write_string(s, out),
        Value::Array(items) => {
            out.push('[');
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                write_value(item, out);
            }
            out.push(']');
        }
        Value::Object(map) => write_object(map, out),
    }
}

fn write_number(n: &Number, out: &mut String) {
    if let Some(i) = n.as_i64() {
        let _ = write!(out, "{i}");
    } else if let Some(u) = n.as_u64() {
        let _ = write!(out, "{u}");
    } else if let Some(f) = n.as_f64() {
        if !f.is_finite() {
            out.push_str("null");
        } else if f.fract() == 0.0 && f.abs() < 1e15 {
            let _ = write!(out, "{}", f as i64);
        } else {
            let _ = write!(out, "{f}");
        }
    }
}

fn write_string(s: &str, out: &mut String) {
    out.push('"');
    for ch in s.chars() {
        match ch {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\u{08}' => out.push_str("\\b"),
            '\u{0C}' => out.push_str("\\f"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if c < '\u{20}' => {
                let _ = write!(out, "\\u{:04x}", c as u32);
            }
            c => out.push(c),
        }
    }
    out.push('"');
}

fn write_object(map: &Map<String, Value>, out: &mut String) {
    let mut entries: Vec<(&String, &Value)> = map.iter().collect();
    entries.sort_by(|(a, _), (b, _)| utf16_order(a, b));

    out.push('{');
    for (i, (key, value)) in entries.into_iter().enumerate() {
        if i > 0 {
            out.push(',');
        }
        write_string(key, out);
        out.push(':');
        write_value(value, out);
    }
    out.push('}');
}

fn utf16_order(a: &str, b: &str) -> Ordering {
    a.encode_utf16().cmp(b.encode_utf16())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_scalars() {
        assert_eq!(canonical_json(&json!(null)), "null");
        assert_eq!(canonical_json(&json!(true)), "true");
        assert_eq!(canonical_json(&json!(-7)), "-7");
        assert_eq!(canonical_json(&json!(2.0)), "2");
        assert_eq!(canonical_json(&json!(2.5)), "2.5");
    }

    #[test]
    fn test_string_escaping() {
        assert_eq!(canonical_json(&json!("a\"b")), r#""a\"b""#);
        assert_eq!(canonical_json(&json!("line\nbreak")), r#""line\nbreak""#);
        assert_eq!(canonical_json(&json!("\u{0001}")), r#""\u0001""#);
        assert_eq!(canonical_json(&json!("path/to")), r#""path/to""#);
        assert_eq!(canonical_json(&json!("é")), "\"é\"");
    }

    #[test]
    fn test_nested_key_sorting() {
        let doc = json!({"z": [{"b": 1, "a": 2}], "a": {"y": null, "x": true}});
        assert_eq!(
            canonical_json(&doc),
            r#"{"a":{"x":true,"y":null},"z":[{"a":2,"b":1}]}"#
        );
    }

    #[test]
    fn test_utf16_ordering_differs_from_bytes() {
        // U+1F600 sorts after U+FB01 bytewise but before it in UTF-16.
        assert_eq!(utf16_order("\u{1F600}", "\u{FB01}"), Ordering::Less);
        assert_eq!(utf16_order("a", "b"), Ordering::Less);
    }

    #[test]
    fn test_hash_ignores_key_order_but_not_content() {
        let a = json!({"controls": [{"id": "ac-1", "status": "effective"}]});
        let b = json!({"controls": [{"status": "effective", "id": "ac-1"}]});
        let c = json!({"controls": [{"id": "ac-1", "status": "ineffective"}]});
        assert_eq!(DocumentHash::of(&a), DocumentHash::of(&b));
        assert_ne!(DocumentHash::of(&a), DocumentHash::of(&c));
    }

    #[test]
    fn test_hex_rendering() {
        let hash = DocumentHash::of(&json!({}));
        let hex = hash.to_hex();
        assert_eq!(hex.len(), 64);
        assert!(hex.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
        assert_eq!(hash.to_string(), hex);
    }
}
