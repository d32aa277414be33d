//! Prose assembly from OSCAL `parts`.
//!
//! Catalog parsing and the extractor's description fallback share this code,
//! so a description stored from a catalog compares equal to the same
//! catalog's text when it is parsed again.

use serde_json::Value;

/// Part names that carry a control's descriptive prose, in priority order.
const DESCRIPTIVE_PARTS: &[&str] = &["statement", "description", "guidance"];

/// Assembles descriptive prose from a `parts` array.
///
/// Parts named `statement`, `description` or `guidance` are preferred; when
/// none exist, any part exposing prose is used. Each part contributes its own
/// prose followed by its sub-parts' prose (one per line); separate parts are
/// joined with a blank line.
///
/// # Returns
///
/// `None` when no part carries any prose.
///
/// # Example
///
/// ```rust
/// use ssp_extract::parts::prose_from_parts;
/// use serde_json::json;
///
/// let parts = json!([
///     { "name": "statement", "prose": "Develop a policy.", "parts": [
///         { "name": "item", "prose": "a. Review annually." }
///     ]},
///     { "name": "guidance", "prose": "Policies are documents." },
///     { "name": "assessment-objective", "prose": "Ignored." }
/// ]);
///
/// assert_eq!(
///     prose_from_parts(&parts).as_deref(),
///     Some("Develop a policy.\na. Review annually.\n\nPolicies are documents.")
/// );
/// ```
pub fn prose_from_parts(parts: &Value) -> Option<String> {
    let parts = parts.as_array()?;

    let preferred: Vec<String> = parts
        .iter()
        .filter(|part| {
            part.get("name")
                .and_then(Value::as_str)
                .is_some_and(|name| DESCRIPTIVE_PARTS.contains(&name))
        })
        .filter_map(collect_prose)
        .collect();

    let selected = if preferred.is_empty() {
        parts.iter().filter_map(collect_prose).collect()
    } else {
        preferred
    };

    if selected.is_empty() {
        None
    } else {
        Some(selected.join("\n\n"))
    }
}

/// Prose of one part and, recursively, its sub-parts.
fn collect_prose(part: &Value) -> Option<String> {
    let mut lines = Vec::new();
    push_prose(part, &mut lines);

    if lines.is_empty() {
        None
    } else {
        Some(lines.join("\n"))
    }
}

fn push_prose(part: &Value, lines: &mut Vec<String>) {
    if let Some(prose) = part.get("prose").and_then(Value::as_str) {
        let prose = prose.trim();
        if !prose.is_empty() {
            lines.push(prose.to_string());
        }
    }

    if let Some(children) = part.get("parts").and_then(Value::as_array) {
        for child in children {
            push_prose(child, lines);
        }
    }
}
