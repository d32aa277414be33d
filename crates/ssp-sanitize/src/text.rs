//! String Sanitizer
//!
//! Normalizes a single string so it satisfies the OSCAL string pattern
//! `^\S(.*\S)?$`: non-empty, no leading or trailing whitespace. Real content
//! is never discarded to satisfy the pattern; only a truly empty result is
//! replaced by the placeholder.

use crate::models::SanitizeOptions;
use regex::Regex;
use serde_json::Value;
use std::sync::OnceLock;
use tracing::warn;

/// The target schema's string pattern.
///
/// Compiled with `s` so `.` crosses line breaks: multi-line narratives only
/// need non-blank first and last characters.
fn pattern_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?s)^\S(.*\S)?$").expect("string pattern regex must compile"))
}

/// Whether `s` satisfies the non-empty, trimmed string pattern.
///
/// # Example
///
/// ```rust
/// use ssp_sanitize::text::satisfies_pattern;
///
/// assert!(satisfies_pattern("AC-1"));
/// assert!(!satisfies_pattern(" AC-1"));
/// assert!(!satisfies_pattern(""));
/// ```
pub fn satisfies_pattern(s: &str) -> bool {
    pattern_re().is_match(s)
}

/// Padding stripped from both ends: whitespace, controls and zero-width
/// characters.
fn is_invisible(c: char) -> bool {
    c.is_whitespace()
        || c.is_control()
        || matches!(
            c,
            '\u{FEFF}' | '\u{200B}'..='\u{200F}' | '\u{2060}'..='\u{2064}' | '\u{00AD}'
        )
}

/// Sanitize a single string.
///
/// - Strips whitespace, control characters, byte-order marks and zero-width
///   characters from both ends; interior text is untouched
/// - Empty results become `options.placeholder` when `options.use_default`
///   is set, otherwise `None`
/// - Remaining content is kept even if it cannot be re-verified
///
/// # Example
///
/// ```rust
/// use ssp_sanitize::{sanitize_string, SanitizeOptions};
///
/// let options = SanitizeOptions::default();
/// assert_eq!(
///     sanitize_string("  Access Control Policy  ", &options).as_deref(),
///     Some("Access Control Policy")
/// );
/// assert_eq!(sanitize_string("   ", &options).as_deref(), Some("N/A"));
/// assert_eq!(sanitize_string("   ", &options.clone().with_use_default(false)), None);
/// ```
pub fn sanitize_string(input: &str, options: &SanitizeOptions) -> Option<String> {
    let stripped = input.trim_matches(is_invisible);
    if stripped.is_empty() {
        return empty_result(options);
    }

    if !satisfies_pattern(stripped) {
        warn!(
            length = stripped.len(),
            "String does not verify against the pattern after stripping; keeping content"
        );
    }

    Some(stripped.to_string())
}

/// Sanitize an arbitrary scalar that is about to become a string.
///
/// Numbers and booleans are rendered with their JSON text; `null` counts
/// as blank. Containers are not scalars and yield `None`.
pub fn sanitize_scalar(value: &Value, options: &SanitizeOptions) -> Option<String> {
    match value {
        Value::String(s) => sanitize_string(s, options),
        Value::Number(n) => sanitize_string(&n.to_string(), options),
        Value::Bool(b) => sanitize_string(if *b { "true" } else { "false" }, options),
        Value::Null => empty_result(options),
        Value::Array(_) | Value::Object(_) => None,
    }
}

fn empty_result(options: &SanitizeOptions) -> Option<String> {
    if options.use_default {
        Some(options.placeholder.clone())
    } else {
        None
    }
}
