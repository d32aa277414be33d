//! # Catalog Parsing
//!
//! Flattens an OSCAL catalog (`{ catalog: { groups[], controls[] } }`) into
//! an ordered list of [`ControlDefinition`]s. Groups nest recursively and
//! controls may carry enhancements as nested `controls[]`; every definition
//! records its innermost group and, for enhancements, its parent.
//!
//! Fetching catalogs is the caller's concern; this module only reads an
//! already-loaded JSON tree.

use crate::models::ControlDefinition;
use crate::parts::prose_from_parts;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

/// Descriptive metadata of a catalog release.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CatalogMetadata {
    /// Catalog title.
    pub title: String,

    /// Catalog release version (`metadata.version`).
    pub version: String,

    /// OSCAL schema version (`metadata.oscal-version`).
    pub oscal_version: String,

    /// `metadata.last-modified`.
    pub last_modified: String,

    /// Where the catalog was loaded from, if known.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_url: Option<String>,
}

impl CatalogMetadata {
    /// Reads catalog metadata, tolerating missing fields.
    pub fn from_catalog(document: &Value) -> Self {
        catalog_body(document)
            .and_then(|catalog| catalog.get("metadata"))
            .map(Self::from_metadata)
            .unwrap_or_default()
    }

    /// Reads an already-located `metadata` object.
    pub fn from_metadata(metadata: &Value) -> Self {
        let text = |key: &str| {
            metadata
                .get(key)
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string()
        };

        Self {
            title: text("title"),
            version: text("version"),
            oscal_version: text("oscal-version"),
            last_modified: text("last-modified"),
            source_url: None,
        }
    }

    /// Records the catalog's source location.
    pub fn with_source_url(mut self, url: impl Into<String>) -> Self {
        self.source_url = Some(url.into());
        self
    }
}

/// Locates the catalog body: `document.catalog` or the document itself when
/// it already looks like one.
pub fn catalog_body(document: &Value) -> Option<&Value> {
    match document.get("catalog") {
        Some(catalog) if catalog.is_object() => Some(catalog),
        _ if looks_like_catalog(document) => Some(document),
        _ => None,
    }
}

/// Whether a bare value has a catalog's top-level layout.
pub(crate) fn looks_like_catalog(value: &Value) -> bool {
    value.is_object()
        && (value.get("groups").is_some_and(Value::is_array)
            || value.get("controls").is_some_and(Value::is_array))
        && value.get("metadata").is_some()
}

/// Flattens a catalog into control definitions, in document order.
///
/// Root-level controls come after all grouped controls. Entries without an
/// `id` are skipped with a warning.
///
/// # Example
///
/// ```rust
/// use ssp_extract::catalog::parse_catalog;
/// use serde_json::json;
///
/// let catalog = json!({
///     "catalog": {
///         "groups": [{
///             "id": "ac",
///             "title": "Access Control",
///             "controls": [{
///                 "id": "ac-2",
///                 "title": "Account Management",
///                 "controls": [{ "id": "ac-2.1", "title": "Automated Account Management" }]
///             }]
///         }]
///     }
/// });
///
/// let definitions = parse_catalog(&catalog);
/// assert_eq!(definitions.len(), 2);
/// assert_eq!(definitions[1].parent_id.as_deref(), Some("ac-2"));
/// assert_eq!(definitions[1].group_title.as_deref(), Some("Access Control"));
/// ```
pub fn parse_catalog(document: &Value) -> Vec<ControlDefinition> {
    let Some(catalog) = catalog_body(document) else {
        warn!("Document does not contain a catalog");
        return Vec::new();
    };

    flatten_catalog(catalog)
}

/// Flattens an already-located catalog body (`groups[]` / `controls[]`).
pub fn flatten_catalog(catalog: &Value) -> Vec<ControlDefinition> {
    let mut definitions = Vec::new();

    if let Some(groups) = catalog.get("groups").and_then(Value::as_array) {
        for group in groups {
            walk_group(group, &mut definitions);
        }
    }

    if let Some(controls) = catalog.get("controls").and_then(Value::as_array) {
        let scope = GroupScope::default();
        for control in controls {
            walk_control(control, &scope, None, &mut definitions);
        }
    }

    debug!(controls = definitions.len(), "Parsed catalog");
    definitions
}

#[derive(Debug, Clone, Default)]
struct GroupScope {
    id: Option<String>,
    title: Option<String>,
}

fn walk_group(group: &Value, definitions: &mut Vec<ControlDefinition>) {
    let scope = GroupScope {
        id: string_field(group, "id"),
        title: string_field(group, "title"),
    };

    if let Some(controls) = group.get("controls").and_then(Value::as_array) {
        for control in controls {
            walk_control(control, &scope, None, definitions);
        }
    }

    if let Some(subgroups) = group.get("groups").and_then(Value::as_array) {
        for subgroup in subgroups {
            walk_group(subgroup, definitions);
        }
    }
}

fn walk_control(
    control: &Value,
    scope: &GroupScope,
    parent_id: Option<&str>,
    definitions: &mut Vec<ControlDefinition>,
) {
    let Some(id) = string_field(control, "id") else {
        warn!(group = ?scope.id, "Skipping catalog control without an id");
        return;
    };

    definitions.push(ControlDefinition {
        id: id.clone(),
        title: string_field(control, "title").unwrap_or_default(),
        description: control
            .get("parts")
            .and_then(prose_from_parts)
            .unwrap_or_default(),
        class: string_field(control, "class"),
        params: array_field(control, "params"),
        props: array_field(control, "props"),
        group_id: scope.id.clone(),
        group_title: scope.title.clone(),
        parent_id: parent_id.map(str::to_string),
    });

    if let Some(children) = control.get("controls").and_then(Value::as_array) {
        for child in children {
            walk_control(child, scope, Some(id.as_str()), definitions);
        }
    }
}

fn string_field(value: &Value, key: &str) -> Option<String> {
    value
        .get(key)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

fn array_field(value: &Value, key: &str) -> Vec<Value> {
    value
        .get(key)
        .and_then(Value::as_array)
        .cloned()
        .unwrap_or_default()
}
