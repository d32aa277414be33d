//! # System Info Extractor
//!
//! Recovers system-level descriptive fields from an SSP. Every lookup is
//! optional: a missing path yields the field's baseline default from
//! [`SystemInfo::default`], never an error.
//!
//! ## Party Resolution
//!
//! Owner and organization come from `metadata.responsible-parties`, resolved
//! through `metadata.parties` by UUID. The assessor is narrowed further:
//! several organizations often share the assessor role, and only the one of
//! type `organization` whose remarks carry the marker phrase
//! [`ASSESSOR_MARKER`] is the assessment organization.

use crate::controls::ssp_root;
use crate::models::SystemInfo;
use serde_json::Value;
use tracing::debug;

/// Marker phrase identifying the assessment organization's party entry.
pub const ASSESSOR_MARKER: &str = "Assessment organization";

/// Role identifier of the system owner.
const OWNER_ROLE: &str = "system-owner";

/// Role identifier of the assessor.
const ASSESSOR_ROLE: &str = "assessor";

/// Extracts the System Info Record from an SSP-shaped document.
///
/// # Example
///
/// ```rust
/// use ssp_extract::extract_system_info;
/// use serde_json::json;
///
/// let ssp = json!({
///     "system-security-plan": {
///         "system-characteristics": {
///             "system-name": "Payments Platform",
///             "security-impact-level": {
///                 "security-objective-confidentiality": "fips-199-high"
///             }
///         }
///     }
/// });
///
/// let info = extract_system_info(&ssp);
/// assert_eq!(info.system_name, "Payments Platform");
/// assert_eq!(info.confidentiality_impact, "high");
/// assert_eq!(info.integrity_impact, "moderate");
/// ```
pub fn extract_system_info(document: &Value) -> SystemInfo {
    let root = ssp_root(document);
    let mut info = SystemInfo::default();

    if let Some(characteristics) = root.get("system-characteristics") {
        read_characteristics(characteristics, &mut info);
    } else {
        debug!("No system-characteristics; using defaults");
    }

    if let Some(metadata) = root.get("metadata") {
        read_parties(metadata, &mut info);
    }

    info
}

fn read_characteristics(characteristics: &Value, info: &mut SystemInfo) {
    set_text(&mut info.system_name, characteristics.get("system-name"));
    set_text(&mut info.system_id, characteristics.pointer("/system-ids/0/id"));
    set_text(&mut info.description, characteristics.get("description"));
    set_text(
        &mut info.status,
        characteristics.pointer("/status/state"),
    );
    set_text(&mut info.authorization_date, characteristics.get("date-authorized"));
    set_text(
        &mut info.authorization_boundary,
        characteristics.pointer("/authorization-boundary/description"),
    );

    if let Some(level) = characteristics
        .get("security-sensitivity-level")
        .and_then(impact_label)
    {
        info.security_sensitivity_level = level;
    }

    if let Some(impact) = characteristics.get("security-impact-level") {
        let ratings = [
            ("security-objective-confidentiality", &mut info.confidentiality_impact),
            ("security-objective-integrity", &mut info.integrity_impact),
            ("security-objective-availability", &mut info.availability_impact),
        ];
        for (key, slot) in ratings {
            if let Some(label) = impact.get(key).and_then(impact_label) {
                *slot = label;
            }
        }
    }

    let props = characteristics.get("props");
    set_text(&mut info.system_type, prop_value(props, "system-type"));
    set_text(&mut info.iaas_provider, prop_value(props, "iaas-provider"));
    set_text(&mut info.paas_provider, prop_value(props, "paas-provider"));
    set_text(&mut info.saas_provider, prop_value(props, "saas-provider"));
}

/// Normalizes `fips-199-high` and friends to `high`.
fn impact_label(value: &Value) -> Option<String> {
    let text = value.as_str()?.trim();
    let label = text.strip_prefix("fips-199-").unwrap_or(text);
    if label.is_empty() {
        None
    } else {
        Some(label.to_ascii_lowercase())
    }
}

fn read_parties(metadata: &Value, info: &mut SystemInfo) {
    let parties: &[Value] = metadata
        .get("parties")
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or_default();

    let owners = parties_for_role(metadata, parties, OWNER_ROLE);
    if let Some(owner) = owners.first() {
        set_text(&mut info.owner, owner.get("name"));
        let organization = if is_organization(owner) {
            Some(*owner)
        } else {
            owner
                .pointer("/member-of-organizations/0")
                .and_then(Value::as_str)
                .and_then(|uuid| party_by_uuid(parties, uuid))
        };
        if let Some(organization) = organization {
            set_text(&mut info.organization, organization.get("name"));
        }
    }

    if info.organization.is_empty() {
        if let Some(first_org) = parties
            .iter()
            .find(|party| is_organization(party) && !is_assessor_party(party))
        {
            set_text(&mut info.organization, first_org.get("name"));
        }
    }

    let assessors = parties_for_role(metadata, parties, ASSESSOR_ROLE);
    let candidates: Vec<&Value> = if assessors.is_empty() {
        parties.iter().collect()
    } else {
        assessors
    };
    if let Some(assessor) = candidates.iter().find(|party| is_assessor_party(party)) {
        set_text(&mut info.assessor, assessor.get("name"));
    }
}

/// Parties referenced by `responsible-parties[role-id == role]`, in order.
fn parties_for_role<'a>(metadata: &Value, parties: &'a [Value], role: &str) -> Vec<&'a Value> {
    metadata
        .get("responsible-parties")
        .and_then(Value::as_array)
        .into_iter()
        .flatten()
        .filter(|entry| entry.get("role-id").and_then(Value::as_str) == Some(role))
        .filter_map(|entry| entry.get("party-uuids")?.as_array())
        .flatten()
        .filter_map(Value::as_str)
        .filter_map(|uuid| party_by_uuid(parties, uuid))
        .collect()
}

fn party_by_uuid<'a>(parties: &'a [Value], uuid: &str) -> Option<&'a Value> {
    parties
        .iter()
        .find(|party| party.get("uuid").and_then(Value::as_str) == Some(uuid))
}

fn is_organization(party: &Value) -> bool {
    party.get("type").and_then(Value::as_str) == Some("organization")
}

fn is_assessor_party(party: &Value) -> bool {
    is_organization(party)
        && party
            .get("remarks")
            .and_then(Value::as_str)
            .is_some_and(|remarks| remarks.contains(ASSESSOR_MARKER))
}

fn prop_value<'a>(props: Option<&'a Value>, name: &str) -> Option<&'a Value> {
    props?
        .as_array()?
        .iter()
        .find(|prop| prop.get("name").and_then(Value::as_str) == Some(name))?
        .get("value")
}

/// Overwrites `slot` only with a non-blank string.
fn set_text(slot: &mut String, value: Option<&Value>) {
    if let Some(text) = value.and_then(Value::as_str).map(str::trim) {
        if !text.is_empty() {
            *slot = text.to_string();
        }
    }
}
