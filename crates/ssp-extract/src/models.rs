//! # Core Data Models for Extraction
//!
//! The normalized shapes every document is reduced to before comparison:
//! catalog-sourced [`ControlDefinition`]s, extracted [`ControlRecord`]s and
//! the system-level [`SystemInfo`].
//!
//! Field names serialize in camelCase, the shape the export layer consumes.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::cmp::Ordering;
use std::fmt;

/// Assessment state of a single control.
///
/// Serializes as its kebab-case label. Labels outside the known vocabulary
/// are carried verbatim in [`ImplementationStatus::Other`] so a document
/// written by a newer tool never loses its recorded status.
///
/// # Example
///
/// ```rust
/// use ssp_extract::ImplementationStatus;
///
/// assert_eq!(ImplementationStatus::from("Not Applicable"), ImplementationStatus::NotApplicable);
/// assert_eq!(ImplementationStatus::Effective.as_str(), "effective");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ImplementationStatus {
    /// No assessment recorded yet.
    #[default]
    NotAssessed,
    /// Control implemented and operating as intended.
    Effective,
    /// Requirement met by an alternate control.
    AlternateControl,
    /// Control implemented but not operating as intended.
    Ineffective,
    /// Assessor could not observe the control.
    NoVisibility,
    /// Control not implemented.
    NotImplemented,
    /// Control does not apply to this system.
    NotApplicable,
    /// A label outside the known vocabulary.
    Other(String),
}

impl ImplementationStatus {
    /// The kebab-case label.
    pub fn as_str(&self) -> &str {
        match self {
            Self::NotAssessed => "not-assessed",
            Self::Effective => "effective",
            Self::AlternateControl => "alternate-control",
            Self::Ineffective => "ineffective",
            Self::NoVisibility => "no-visibility",
            Self::NotImplemented => "not-implemented",
            Self::NotApplicable => "not-applicable",
            Self::Other(label) => label,
        }
    }
}

impl From<&str> for ImplementationStatus {
    fn from(label: &str) -> Self {
        let normalized: String = label
            .trim()
            .chars()
            .map(|c| match c {
                ' ' | '_' => '-',
                c => c.to_ascii_lowercase(),
            })
            .collect();

        match normalized.as_str() {
            "" | "not-assessed" => Self::NotAssessed,
            "effective" => Self::Effective,
            "alternate-control" => Self::AlternateControl,
            "ineffective" => Self::Ineffective,
            "no-visibility" => Self::NoVisibility,
            "not-implemented" => Self::NotImplemented,
            "not-applicable" => Self::NotApplicable,
            _ => Self::Other(label.trim().to_string()),
        }
    }
}

impl From<String> for ImplementationStatus {
    fn from(label: String) -> Self {
        Self::from(label.as_str())
    }
}

impl From<ImplementationStatus> for String {
    fn from(status: ImplementationStatus) -> Self {
        status.as_str().to_string()
    }
}

impl fmt::Display for ImplementationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of comparing a catalog control against prior data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeStatus {
    /// Control absent from the prior document.
    New,
    /// Catalog title or description differs from what was recorded.
    Changed,
    /// Catalog text matches what was recorded.
    Unchanged,
}

/// Catalog-authored field that changed between releases.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeDetail {
    /// The control title.
    Title,
    /// The control prose.
    Description,
}

/// A control as defined by a catalog.
///
/// Immutable once parsed; the catalog is the sole authority for these
/// fields.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ControlDefinition {
    /// Control identifier, e.g. `ac-2.1`.
    pub id: String,

    /// Catalog title.
    pub title: String,

    /// Prose assembled from the control's parts.
    pub description: String,

    /// Classification tag (`class`), e.g. `SP800-53-enhancement`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub class: Option<String>,

    /// Parameter definitions, carried opaquely.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub params: Vec<Value>,

    /// Catalog annotations, carried opaquely.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub props: Vec<Value>,

    /// Identifier of the enclosing group.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub group_id: Option<String>,

    /// Title of the enclosing group.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub group_title: Option<String>,

    /// Parent control identifier for enhancements.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<String>,
}

/// A control's catalog text merged with a system's assessment data.
///
/// Created by the Control Extractor; the Change Classifier only adds the
/// change-tracking fields. Every other field is user-entered assessment
/// work and is carried forward untouched.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ControlRecord {
    /// Control identifier, unique within a document.
    pub id: String,

    /// Catalog title as last recorded.
    pub title: String,

    /// Catalog prose as last recorded.
    pub description: String,

    /// Title of the catalog group.
    pub group_title: String,

    /// Recorded implementation status.
    pub status: ImplementationStatus,

    /// Free-text implementation narrative.
    pub implementation: String,

    /// Assessor or owner remarks.
    pub remarks: String,

    /// Party responsible for the control.
    pub responsible_party: String,

    /// Control owner.
    pub control_owner: String,

    /// Guidance for consumers inheriting the control.
    pub consumer_guidance: String,

    /// Date implemented.
    pub implementation_date: String,

    /// Date last reviewed.
    pub review_date: String,

    /// Date of next scheduled review.
    pub next_review_date: String,

    /// Date of the last test.
    pub last_test_date: String,

    /// Control type (preventive, detective, ...).
    pub control_type: String,

    /// Where the evidence lives.
    pub evidence: String,

    /// How the control is tested.
    pub testing_procedure: String,

    /// How often the control is tested.
    pub testing_frequency: String,

    /// Endpoint supplying automated evidence.
    pub api_url: String,

    /// Reference to the credential used for `api_url`.
    pub api_credential_id: String,

    /// Last payload returned by `api_url`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_response_data: Option<Value>,

    /// Previous payloads returned by `api_url`.
    pub api_data_history: Vec<Value>,

    /// Risk rating.
    pub risk_rating: String,

    /// Related frameworks.
    pub frameworks: String,

    /// Compensating controls.
    pub compensating_controls: String,

    /// Documented exceptions.
    pub exceptions: String,

    /// Classification against the current catalog.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub change_status: Option<ChangeStatus>,

    /// Human-readable reason for `Changed`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub change_reason: Option<String>,

    /// Which catalog fields changed.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub change_details: Vec<ChangeDetail>,

    /// Catalog title before the change.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub previous_title: Option<String>,

    /// Catalog prose before the change.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub previous_description: Option<String>,
}

impl ControlRecord {
    /// Creates an empty, not-assessed record.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Self::default()
        }
    }

    /// Creates a not-assessed record carrying a definition's catalog text.
    pub fn from_definition(definition: &ControlDefinition) -> Self {
        Self {
            id: definition.id.clone(),
            title: definition.title.clone(),
            description: definition.description.clone(),
            group_title: definition.group_title.clone().unwrap_or_default(),
            ..Self::default()
        }
    }

    /// Copies every user-entered assessment field from `prior`.
    ///
    /// Catalog text, identifier and change-tracking fields are left alone.
    pub fn copy_assessment_from(&mut self, prior: &ControlRecord) {
        self.status = prior.status.clone();
        self.implementation = prior.implementation.clone();
        self.remarks = prior.remarks.clone();
        self.responsible_party = prior.responsible_party.clone();
        self.control_owner = prior.control_owner.clone();
        self.consumer_guidance = prior.consumer_guidance.clone();
        self.implementation_date = prior.implementation_date.clone();
        self.review_date = prior.review_date.clone();
        self.next_review_date = prior.next_review_date.clone();
        self.last_test_date = prior.last_test_date.clone();
        self.control_type = prior.control_type.clone();
        self.evidence = prior.evidence.clone();
        self.testing_procedure = prior.testing_procedure.clone();
        self.testing_frequency = prior.testing_frequency.clone();
        self.api_url = prior.api_url.clone();
        self.api_credential_id = prior.api_credential_id.clone();
        self.api_response_data = prior.api_response_data.clone();
        self.api_data_history = prior.api_data_history.clone();
        self.risk_rating = prior.risk_rating.clone();
        self.frameworks = prior.frameworks.clone();
        self.compensating_controls = prior.compensating_controls.clone();
        self.exceptions = prior.exceptions.clone();
    }
}

/// System-level descriptive fields recovered from an SSP.
///
/// Missing fields fall back to a fixed baseline: moderate impact across the
/// board and an `under-development` lifecycle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SystemInfo {
    pub system_name: String,
    pub system_id: String,
    pub description: String,
    pub organization: String,
    pub owner: String,
    pub assessor: String,
    pub security_sensitivity_level: String,
    pub confidentiality_impact: String,
    pub integrity_impact: String,
    pub availability_impact: String,
    pub status: String,
    pub system_type: String,
    pub authorization_boundary: String,
    pub authorization_date: String,
    pub iaas_provider: String,
    pub paas_provider: String,
    pub saas_provider: String,
}

/// Impact rating used when none can be recovered.
pub const DEFAULT_IMPACT: &str = "moderate";

/// Lifecycle state used when none can be recovered.
pub const DEFAULT_SYSTEM_STATUS: &str = "under-development";

impl Default for SystemInfo {
    fn default() -> Self {
        Self {
            system_name: String::new(),
            system_id: String::new(),
            description: String::new(),
            organization: String::new(),
            owner: String::new(),
            assessor: String::new(),
            security_sensitivity_level: DEFAULT_IMPACT.to_string(),
            confidentiality_impact: DEFAULT_IMPACT.to_string(),
            integrity_impact: DEFAULT_IMPACT.to_string(),
            availability_impact: DEFAULT_IMPACT.to_string(),
            status: DEFAULT_SYSTEM_STATUS.to_string(),
            system_type: String::new(),
            authorization_boundary: String::new(),
            authorization_date: String::new(),
            iaas_provider: String::new(),
            paas_provider: String::new(),
            saas_provider: String::new(),
        }
    }
}

/// Orders control identifiers naturally: `ac-2` < `ac-2.1` < `ac-10`.
///
/// Identifiers are split into alternating text and digit runs; text runs
/// compare case-insensitively, digit runs numerically.
///
/// # Example
///
/// ```rust
/// use ssp_extract::models::compare_control_ids;
/// use std::cmp::Ordering;
///
/// assert_eq!(compare_control_ids("AC-2", "AC-10"), Ordering::Less);
/// assert_eq!(compare_control_ids("AC-2", "AC-2(1)"), Ordering::Less);
/// ```
pub fn compare_control_ids(a: &str, b: &str) -> Ordering {
    let left = id_chunks(a);
    let right = id_chunks(b);

    for (l, r) in left.iter().zip(right.iter()) {
        let ordering = match (l, r) {
            (IdChunk::Number(x), IdChunk::Number(y)) => x.cmp(y),
            (IdChunk::Text(x), IdChunk::Text(y)) => x.cmp(y),
            (IdChunk::Number(_), IdChunk::Text(_)) => Ordering::Less,
            (IdChunk::Text(_), IdChunk::Number(_)) => Ordering::Greater,
        };
        if ordering != Ordering::Equal {
            return ordering;
        }
    }

    left.len().cmp(&right.len()).then_with(|| a.cmp(b))
}

/// Matching key for a control identifier.
///
/// Catalogs and plans disagree on case (`AC-1` vs `ac-1`); records are
/// matched on this key while output keeps the authoritative spelling.
///
/// ```rust
/// use ssp_extract::control_key;
///
/// assert_eq!(control_key(" AC-2(1) "), control_key("ac-2(1)"));
/// ```
pub fn control_key(id: &str) -> String {
    id.trim().to_lowercase()
}

#[derive(Debug, PartialEq, Eq)]
enum IdChunk {
    Text(String),
    Number(u64),
}

fn id_chunks(id: &str) -> Vec<IdChunk> {
    let mut chunks = Vec::new();
    let mut text = String::new();
    let mut digits = String::new();

    for c in id.chars() {
        if c.is_ascii_digit() {
            if !text.is_empty() {
                chunks.push(IdChunk::Text(std::mem::take(&mut text)));
            }
            digits.push(c);
        } else {
            if !digits.is_empty() {
                chunks.push(IdChunk::Number(digits.parse().unwrap_or(u64::MAX)));
                digits.clear();
            }
            text.push(c.to_ascii_lowercase());
        }
    }

    if !text.is_empty() {
        chunks.push(IdChunk::Text(text));
    }
    if !digits.is_empty() {
        chunks.push(IdChunk::Number(digits.parse().unwrap_or(u64::MAX)));
    }

    chunks
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_labels_round_trip() {
        for status in [
            ImplementationStatus::NotAssessed,
            ImplementationStatus::Effective,
            ImplementationStatus::AlternateControl,
            ImplementationStatus::Ineffective,
            ImplementationStatus::NoVisibility,
            ImplementationStatus::NotImplemented,
            ImplementationStatus::NotApplicable,
        ] {
            assert_eq!(ImplementationStatus::from(status.as_str()), status);
        }
    }

    #[test]
    fn test_unknown_status_is_kept() {
        let status = ImplementationStatus::from("  partially-implemented ");
        assert_eq!(
            status,
            ImplementationStatus::Other("partially-implemented".to_string())
        );
        let json = serde_json::to_string(&status).unwrap();
        assert_eq!(json, r#""partially-implemented""#);
    }

    #[test]
    fn test_blank_status_is_not_assessed() {
        assert_eq!(ImplementationStatus::from(""), ImplementationStatus::NotAssessed);
    }

    #[test]
    fn test_record_serializes_camel_case() {
        let mut record = ControlRecord::new("ac-1");
        record.change_status = Some(ChangeStatus::Changed);
        record.change_details = vec![ChangeDetail::Title];

        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(value["changeStatus"], "changed");
        assert_eq!(value["changeDetails"][0], "title");
        assert_eq!(value["status"], "not-assessed");
        assert!(value.get("previousTitle").is_none());
    }

    #[test]
    fn test_system_info_defaults() {
        let info = SystemInfo::default();
        assert_eq!(info.confidentiality_impact, "moderate");
        assert_eq!(info.integrity_impact, "moderate");
        assert_eq!(info.availability_impact, "moderate");
        assert_eq!(info.status, "under-development");
    }

    #[test]
    fn test_natural_control_ordering() {
        let mut ids = vec!["ac-10", "AC-2(1)", "ac-2", "au-1", "ac-1"];
        ids.sort_by(|a, b| compare_control_ids(a, b));
        assert_eq!(ids, vec!["ac-1", "ac-2", "AC-2(1)", "ac-10", "au-1"]);
    }
}
