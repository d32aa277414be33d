//! # Control Extractor
//!
//! Reduces a document of unknown shape to an ordered list of
//! [`ControlRecord`]s. Three historical shapes are recognized, each with its
//! own detector and extractor, tried in priority order:
//!
//! | Priority | Shape | Detected by |
//! |----------|-------|-------------|
//! | 1 | OSCAL SSP | `control-implementation.implemented-requirements[]` |
//! | 2 | Simplified | root `controls[]` |
//! | 3 | Embedded catalog | `catalog.groups[]` / `catalog.controls[]` |
//!
//! The SSP shape wins over an embedded catalog so a plan that also carries
//! its catalog never loses implementation data.
//!
//! ## Field Resolution
//!
//! Each requirement is read in three layers:
//!
//! 1. Direct camelCase fields (the engine's own simplified export)
//! 2. Annotation props, via the [`crate::annotations`] table (these override)
//! 3. OSCAL fallbacks for whatever is still empty: `responsible-roles[0]`,
//!    statement narratives, and descriptive `parts`
//!
//! ## Error Policy
//!
//! Extraction never fails. A malformed requirement is logged and skipped;
//! every other requirement is still extracted.

use crate::annotations::{apply_annotation, field_for};
use crate::catalog::{catalog_body, flatten_catalog, looks_like_catalog};
use crate::error::{ExtractError, Result};
use crate::models::{control_key, ControlRecord};
use crate::parts::prose_from_parts;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::HashSet;
use tracing::{debug, warn};

/// A recognized document shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DocumentShape {
    /// OSCAL System Security Plan.
    OscalSsp,
    /// The engine's own flat `controls[]` export.
    Simplified,
    /// A catalog embedded by an earlier export.
    EmbeddedCatalog,
}

/// One shape detector and its extractor.
struct ShapeExtractor {
    shape: DocumentShape,
    /// Returns the node the extractor consumes when the shape matches.
    locate: fn(&Value) -> Option<&Value>,
    extract: fn(&Value) -> Vec<ControlRecord>,
}

static EXTRACTORS: [ShapeExtractor; 3] = [
    ShapeExtractor {
        shape: DocumentShape::OscalSsp,
        locate: locate_implemented_requirements,
        extract: extract_requirements,
    },
    ShapeExtractor {
        shape: DocumentShape::Simplified,
        locate: locate_simplified_controls,
        extract: extract_requirements,
    },
    ShapeExtractor {
        shape: DocumentShape::EmbeddedCatalog,
        locate: locate_embedded_catalog,
        extract: extract_catalog_controls,
    },
];

/// The SSP body: `document["system-security-plan"]` or the document itself.
pub fn ssp_root(document: &Value) -> &Value {
    match document.get("system-security-plan") {
        Some(ssp) if ssp.is_object() => ssp,
        _ => document,
    }
}

fn locate_implemented_requirements(document: &Value) -> Option<&Value> {
    ssp_root(document)
        .pointer("/control-implementation/implemented-requirements")
        .filter(|requirements| requirements.is_array())
}

fn locate_simplified_controls(document: &Value) -> Option<&Value> {
    if looks_like_catalog(document) {
        return None;
    }
    document.get("controls").filter(|controls| controls.is_array())
}

fn locate_embedded_catalog(document: &Value) -> Option<&Value> {
    catalog_body(document).or_else(|| {
        ssp_root(document)
            .get("catalog")
            .filter(|catalog| catalog.is_object())
    })
}

/// Identifies which shape a document has.
///
/// # Returns
///
/// `None` when no recognized shape matches.
pub fn detect_shape(document: &Value) -> Option<DocumentShape> {
    EXTRACTORS
        .iter()
        .find(|extractor| (extractor.locate)(document).is_some())
        .map(|extractor| extractor.shape)
}

/// Extracts every control record from a document.
///
/// # Example
///
/// ```rust
/// use ssp_extract::{extract_controls, ImplementationStatus};
/// use serde_json::json;
///
/// let ssp = json!({
///     "system-security-plan": {
///         "control-implementation": {
///             "implemented-requirements": [{
///                 "control-id": "ac-1",
///                 "props": [
///                     { "name": "catalog-control-title", "value": "Policy and Procedures" },
///                     { "name": "implementation-status", "value": "effective" }
///                 ]
///             }]
///         }
///     }
/// });
///
/// let records = extract_controls(&ssp);
/// assert_eq!(records.len(), 1);
/// assert_eq!(records[0].title, "Policy and Procedures");
/// assert_eq!(records[0].status, ImplementationStatus::Effective);
/// ```
pub fn extract_controls(document: &Value) -> Vec<ControlRecord> {
    for extractor in &EXTRACTORS {
        if let Some(node) = (extractor.locate)(document) {
            let records = (extractor.extract)(node);
            debug!(shape = ?extractor.shape, controls = records.len(), "Extracted controls");
            return records;
        }
    }

    warn!("Document matches no recognized shape; no controls extracted");
    Vec::new()
}

/// Extracts records from a requirement list (SSP or simplified shape).
fn extract_requirements(requirements: &Value) -> Vec<ControlRecord> {
    let Some(entries) = requirements.as_array() else {
        return Vec::new();
    };

    let mut seen = HashSet::new();
    let mut records = Vec::with_capacity(entries.len());

    for (index, requirement) in entries.iter().enumerate() {
        match requirement_to_record(index, requirement) {
            Ok(record) if seen.insert(control_key(&record.id)) => records.push(record),
            Ok(record) => {
                let err = ExtractError::DuplicateControlId {
                    control_id: record.id,
                    index,
                };
                warn!(error = %err, "Skipping requirement");
            }
            Err(err) => warn!(error = %err, "Skipping requirement"),
        }
    }

    records
}

/// Embedded catalogs carry no assessment data: every record starts
/// not-assessed.
fn extract_catalog_controls(catalog: &Value) -> Vec<ControlRecord> {
    flatten_catalog(catalog)
        .iter()
        .map(ControlRecord::from_definition)
        .collect()
}

/// Builds one record from a requirement entry.
///
/// # Errors
///
/// - `ExtractError::NotAnObject` when the entry is not a mapping
/// - `ExtractError::MissingControlId` when no identifier can be found
pub fn requirement_to_record(index: usize, requirement: &Value) -> Result<ControlRecord> {
    if !requirement.is_object() {
        return Err(ExtractError::NotAnObject { index });
    }

    let id = ["control-id", "id"]
        .iter()
        .find_map(|key| non_empty_str(requirement, key))
        .ok_or(ExtractError::MissingControlId { index })?;

    let mut record = base_record(requirement, &id);
    record.id = id;

    if let Some(props) = requirement.get("props").and_then(Value::as_array) {
        for prop in props {
            apply_prop(&mut record, prop);
        }
    }

    apply_fallbacks(&mut record, requirement);
    Ok(record)
}

/// Direct camelCase fields, with change tracking from earlier runs cleared.
///
/// Fields are read one at a time so a null or mistyped entry only loses
/// itself. Numbers and booleans given for text fields are kept as text.
fn base_record(requirement: &Value, id: &str) -> ControlRecord {
    let Some(entries) = requirement.as_object() else {
        return ControlRecord::new(id);
    };

    let mut readable = Map::new();
    for (key, value) in entries {
        if CHANGE_TRACKING_KEYS.contains(&key.as_str()) {
            continue;
        }
        match readable_field(key, value) {
            Some(value) => {
                readable.insert(key.clone(), value);
            }
            None => debug!(control_id = id, field = %key, "Direct field unreadable; ignored"),
        }
    }

    serde_json::from_value(Value::Object(readable)).unwrap_or_else(|err| {
        debug!(control_id = id, error = %err, "Direct fields unreadable; using props only");
        ControlRecord::new(id)
    })
}

/// Fields written by the Change Classifier; never read back from a document.
const CHANGE_TRACKING_KEYS: &[&str] = &[
    "changeStatus",
    "changeReason",
    "changeDetails",
    "previousTitle",
    "previousDescription",
];

/// The value for `key` if the record accepts it, coercing scalars to text.
fn readable_field(key: &str, value: &Value) -> Option<Value> {
    let accepts = |candidate: &Value| {
        let mut single = Map::new();
        single.insert(key.to_string(), candidate.clone());
        serde_json::from_value::<ControlRecord>(Value::Object(single)).is_ok()
    };

    if accepts(value) {
        return Some(value.clone());
    }

    match value {
        Value::Number(_) | Value::Bool(_) => {
            let text = Value::String(value.to_string());
            accepts(&text).then_some(text)
        }
        _ => None,
    }
}

fn apply_prop(record: &mut ControlRecord, prop: &Value) {
    let Some(name) = prop.get("name").and_then(Value::as_str) else {
        return;
    };
    let Some(field) = field_for(name.trim()) else {
        return;
    };

    let raw = match prop.get("value") {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Null) | None => return,
        Some(other) => other.to_string(),
    };

    apply_annotation(record, field, &raw);
}

fn apply_fallbacks(record: &mut ControlRecord, requirement: &Value) {
    if record.title.trim().is_empty() {
        record.title = non_empty_str(requirement, "title").unwrap_or_default();
    }

    if record.description.trim().is_empty() {
        record.description = requirement
            .get("parts")
            .and_then(prose_from_parts)
            .unwrap_or_default();
    }

    if record.responsible_party.trim().is_empty() {
        record.responsible_party = requirement
            .pointer("/responsible-roles/0/role-id")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();
    }

    if record.implementation.trim().is_empty() {
        record.implementation = statement_narrative(requirement).unwrap_or_default();
    }
}

/// Implementation narrative from `statements[]`: component descriptions
/// first, then statement-level descriptions.
fn statement_narrative(requirement: &Value) -> Option<String> {
    let statements = requirement.get("statements")?.as_array()?;

    let by_components: Vec<&str> = statements
        .iter()
        .filter_map(|statement| statement.get("by-components")?.as_array())
        .flatten()
        .filter_map(|component| component.get("description")?.as_str())
        .map(str::trim)
        .filter(|text| !text.is_empty())
        .collect();

    let texts = if by_components.is_empty() {
        statements
            .iter()
            .filter_map(|statement| statement.get("description")?.as_str())
            .map(str::trim)
            .filter(|text| !text.is_empty())
            .collect()
    } else {
        by_components
    };

    if texts.is_empty() {
        None
    } else {
        Some(texts.join("\n\n"))
    }
}

fn non_empty_str(value: &Value, key: &str) -> Option<String> {
    value
        .get(key)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}
