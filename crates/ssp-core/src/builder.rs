//! # SSP Document Builder
//!
//! Assembles an OSCAL System Security Plan from a [`ComparisonResult`].
//! The tree produced here is complete but unsanitized: every
//! schema-required field is populated first, and the facade runs the Tree
//! Sanitizer over the finished tree as the terminal step.
//!
//! ## Layout
//!
//! ```text
//! system-security-plan
//! ├── uuid
//! ├── metadata            title, last-modified, version, oscal-version,
//! │                       links[rel=source-profile] → catalog
//! ├── import-profile      href → catalog
//! ├── system-characteristics
//! ├── system-implementation
//! │   ├── users[]         (kept empty)
//! │   └── components[]    this-system
//! └── control-implementation
//!     └── implemented-requirements[]
//!         ├── uuid, control-id
//!         ├── props[]     annotation vocabulary
//!         ├── remarks
//!         └── statements[].by-components[].description
//! ```
//!
//! Reading the emitted document back with the Control Extractor reproduces
//! each record's catalog text and assessment fields.

use crate::config::ExportConfig;
use chrono::{SecondsFormat, Utc};
use serde_json::{json, Map, Value};
use ssp_extract::{
    catalog::catalog_body, catalog_location, CatalogMetadata, ControlRecord, SystemInfo,
};
use ssp_reconcile::ComparisonResult;
use tracing::{debug, warn};
use uuid::Uuid;

/// Profile reference used when the catalog's location is unknown.
pub const UNKNOWN_PROFILE_HREF: &str = "#catalog";

/// Title given to a catalog whose metadata is unusable.
const UNKNOWN_CATALOG_TITLE: &str = "Unknown catalog";

/// Catalog-side inputs to the builder.
#[derive(Debug, Clone, Default)]
pub struct CatalogSource<'a> {
    /// The catalog document, if available.
    pub document: Option<&'a Value>,

    /// Published location of the catalog. When absent, the catalog's own
    /// `canonical` or versioned link is used, else [`UNKNOWN_PROFILE_HREF`].
    pub url: Option<&'a str>,
}

/// Builds an unsanitized SSP tree.
///
/// # Arguments
///
/// * `result` - Reconciled controls and system information
/// * `catalog` - The catalog the controls were reconciled against
/// * `export` - Document-level metadata settings
pub fn build_ssp(result: &ComparisonResult, catalog: &CatalogSource<'_>, export: &ExportConfig) -> Value {
    let now = Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true);
    let catalog_meta = catalog_metadata(catalog, &now);
    let href = catalog_meta
        .source_url
        .clone()
        .unwrap_or_else(|| UNKNOWN_PROFILE_HREF.to_string());
    let this_system = Uuid::new_v4().to_string();

    let requirements: Vec<Value> = result
        .controls
        .iter()
        .map(|record| implemented_requirement(record, &this_system))
        .collect();

    debug!(requirements = requirements.len(), "Assembled SSP");

    json!({
        "system-security-plan": {
            "uuid": Uuid::new_v4().to_string(),
            "metadata": {
                "title": document_title(export, &result.system_info),
                "last-modified": now,
                "version": export.document_version,
                "oscal-version": export.oscal_version,
                "links": [{
                    "href": href,
                    "rel": "source-profile",
                    "text": catalog_label(&catalog_meta),
                }],
            },
            "import-profile": { "href": href },
            "system-characteristics": system_characteristics(&result.system_info),
            "system-implementation": {
                "users": [],
                "components": [{
                    "uuid": this_system,
                    "type": "this-system",
                    "title": "This System",
                    "description": required_text(&result.system_info.description, "The system described by this plan."),
                    "status": { "state": "operational" },
                }],
            },
            "control-implementation": {
                "description": format!("Implementation of {} controls.", result.controls.len()),
                "implemented-requirements": requirements,
            },
        }
    })
}

/// Catalog metadata for the document header.
///
/// A catalog whose `metadata` is present but not a mapping is replaced by a
/// minimal default object.
fn catalog_metadata(catalog: &CatalogSource<'_>, now: &str) -> CatalogMetadata {
    let raw = catalog
        .document
        .and_then(catalog_body)
        .and_then(|body| body.get("metadata"));

    let metadata = match raw {
        Some(object @ Value::Object(_)) => CatalogMetadata::from_metadata(object),
        Some(other) => {
            warn!(found = %kind_of(other), "Catalog metadata is not a mapping; substituting defaults");
            CatalogMetadata::from_metadata(&default_catalog_metadata(now))
        }
        None => {
            debug!("No catalog metadata supplied");
            CatalogMetadata::from_metadata(&default_catalog_metadata(now))
        }
    };

    let url = catalog
        .url
        .map(str::trim)
        .filter(|url| !url.is_empty())
        .map(str::to_string)
        .or_else(|| catalog.document.and_then(catalog_location));

    match url {
        Some(url) => metadata.with_source_url(url),
        None => metadata,
    }
}

fn default_catalog_metadata(now: &str) -> Value {
    json!({
        "title": UNKNOWN_CATALOG_TITLE,
        "last-modified": now,
        "version": "",
        "oscal-version": "",
    })
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn catalog_label(metadata: &CatalogMetadata) -> String {
    let title = required_text(&metadata.title, UNKNOWN_CATALOG_TITLE);
    if metadata.version.trim().is_empty() {
        title
    } else {
        format!("{title} {}", metadata.version.trim())
    }
}

fn document_title(export: &ExportConfig, system: &SystemInfo) -> String {
    if system.system_name.trim().is_empty() {
        export.document_title.clone()
    } else {
        format!("{} - {}", system.system_name.trim(), export.document_title)
    }
}

fn system_characteristics(system: &SystemInfo) -> Value {
    let mut characteristics = Map::new();
    characteristics.insert(
        "system-ids".to_string(),
        json!([{
            "identifier-type": "https://ietf.org/rfc/rfc4122",
            "id": required_text(&system.system_id, &Uuid::new_v4().to_string()),
        }]),
    );
    characteristics.insert(
        "system-name".to_string(),
        json!(required_text(&system.system_name, "Unnamed System")),
    );
    characteristics.insert(
        "description".to_string(),
        json!(required_text(&system.description, "No description recorded.")),
    );
    characteristics.insert(
        "security-sensitivity-level".to_string(),
        json!(fips_level(&system.security_sensitivity_level)),
    );
    characteristics.insert(
        "system-information".to_string(),
        json!({
            "information-types": [{
                "uuid": Uuid::new_v4().to_string(),
                "title": "System Information",
                "description": "Information processed by the system.",
                "confidentiality-impact": { "base": fips_level(&system.confidentiality_impact) },
                "integrity-impact": { "base": fips_level(&system.integrity_impact) },
                "availability-impact": { "base": fips_level(&system.availability_impact) },
            }]
        }),
    );
    characteristics.insert(
        "security-impact-level".to_string(),
        json!({
            "security-objective-confidentiality": fips_level(&system.confidentiality_impact),
            "security-objective-integrity": fips_level(&system.integrity_impact),
            "security-objective-availability": fips_level(&system.availability_impact),
        }),
    );
    characteristics.insert("status".to_string(), json!({ "state": system.status }));
    characteristics.insert(
        "authorization-boundary".to_string(),
        json!({
            "description": required_text(&system.authorization_boundary, "Boundary not yet documented."),
        }),
    );

    if !system.authorization_date.trim().is_empty() {
        characteristics.insert("date-authorized".to_string(), json!(system.authorization_date));
    }

    let props: Vec<Value> = [
        ("system-type", &system.system_type),
        ("iaas-provider", &system.iaas_provider),
        ("paas-provider", &system.paas_provider),
        ("saas-provider", &system.saas_provider),
    ]
    .into_iter()
    .filter(|(_, value)| !value.trim().is_empty())
    .map(|(name, value)| json!({ "name": name, "value": value }))
    .collect();
    if !props.is_empty() {
        characteristics.insert("props".to_string(), Value::Array(props));
    }

    Value::Object(characteristics)
}

fn fips_level(level: &str) -> String {
    format!("fips-199-{}", level.trim().to_ascii_lowercase())
}

fn implemented_requirement(record: &ControlRecord, component_uuid: &str) -> Value {
    let mut requirement = Map::new();
    requirement.insert("uuid".to_string(), json!(Uuid::new_v4().to_string()));
    requirement.insert("control-id".to_string(), json!(record.id));
    requirement.insert("props".to_string(), Value::Array(record.to_props()));

    if !record.remarks.trim().is_empty() {
        requirement.insert("remarks".to_string(), json!(record.remarks));
    }

    if !record.implementation.trim().is_empty() {
        requirement.insert(
            "statements".to_string(),
            json!([{
                "statement-id": format!("{}_smt", record.id),
                "uuid": Uuid::new_v4().to_string(),
                "by-components": [{
                    "component-uuid": component_uuid,
                    "uuid": Uuid::new_v4().to_string(),
                    "description": record.implementation,
                }],
            }]),
        );
    }

    Value::Object(requirement)
}

fn required_text(value: &str, fallback: &str) -> String {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        fallback.to_string()
    } else {
        trimmed.to_string()
    }
}
