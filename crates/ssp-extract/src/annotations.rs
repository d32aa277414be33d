//! # Annotation Vocabulary
//!
//! OSCAL has no first-class slots for most assessment data, so this engine
//! stores it as `props[]` entries on each implemented requirement. This
//! module is the single mapping between prop names and [`ControlRecord`]
//! fields, used in both directions:
//!
//! - **Reading**: [`apply_annotation`] routes a `{name, value}` pair to its field
//! - **Writing**: [`ControlRecord::to_props`] emits the same vocabulary
//!
//! The table is checked against [`ControlField::ALL`] at startup
//! ([`verify_annotation_table`]) so a field added to the record cannot
//! silently miss its prop name.

use crate::models::{ControlRecord, ImplementationStatus};
use serde_json::{json, Value};
use tracing::warn;

/// Namespace recorded on emitted props.
pub const ANNOTATION_NAMESPACE: &str = "https://fedramp.gov/ns/oscal";

/// A [`ControlRecord`] field addressable through a prop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ControlField {
    CatalogTitle,
    CatalogDescription,
    GroupTitle,
    Status,
    ResponsibleParty,
    ControlOwner,
    ConsumerGuidance,
    ImplementationDate,
    ReviewDate,
    NextReviewDate,
    ControlType,
    Evidence,
    TestingProcedure,
    TestingFrequency,
    LastTestDate,
    ApiUrl,
    ApiCredentialId,
    ApiResponseData,
    ApiDataHistory,
    RiskRating,
    Frameworks,
    CompensatingControls,
    Exceptions,
}

impl ControlField {
    /// Every annotatable field, in emission order.
    pub const ALL: [ControlField; 23] = [
        Self::CatalogTitle,
        Self::CatalogDescription,
        Self::GroupTitle,
        Self::Status,
        Self::ResponsibleParty,
        Self::ControlOwner,
        Self::ConsumerGuidance,
        Self::ImplementationDate,
        Self::ReviewDate,
        Self::NextReviewDate,
        Self::ControlType,
        Self::Evidence,
        Self::TestingProcedure,
        Self::TestingFrequency,
        Self::LastTestDate,
        Self::ApiUrl,
        Self::ApiCredentialId,
        Self::ApiResponseData,
        Self::ApiDataHistory,
        Self::RiskRating,
        Self::Frameworks,
        Self::CompensatingControls,
        Self::Exceptions,
    ];

    /// The prop name written for this field.
    pub fn prop_name(self) -> &'static str {
        match self {
            Self::CatalogTitle => "catalog-control-title",
            Self::CatalogDescription => "catalog-control-description",
            Self::GroupTitle => "group-title",
            Self::Status => "implementation-status",
            Self::ResponsibleParty => "responsible-party",
            Self::ControlOwner => "control-owner",
            Self::ConsumerGuidance => "consumer-guidance",
            Self::ImplementationDate => "implementation-date",
            Self::ReviewDate => "review-date",
            Self::NextReviewDate => "next-review-date",
            Self::ControlType => "control-type",
            Self::Evidence => "evidence",
            Self::TestingProcedure => "testing-procedure",
            Self::TestingFrequency => "testing-frequency",
            Self::LastTestDate => "last-test-date",
            Self::ApiUrl => "api-url",
            Self::ApiCredentialId => "api-credential-id",
            Self::ApiResponseData => "api-response-data",
            Self::ApiDataHistory => "api-data-history",
            Self::RiskRating => "risk-rating",
            Self::Frameworks => "frameworks",
            Self::CompensatingControls => "compensating-controls",
            Self::Exceptions => "exceptions",
        }
    }
}

/// Prop names accepted when reading, including historical aliases.
pub static ANNOTATIONS: &[(&str, ControlField)] = &[
    ("catalog-control-title", ControlField::CatalogTitle),
    ("catalog-control-description", ControlField::CatalogDescription),
    ("group-title", ControlField::GroupTitle),
    ("control-group", ControlField::GroupTitle),
    ("implementation-status", ControlField::Status),
    ("responsible-party", ControlField::ResponsibleParty),
    ("control-owner", ControlField::ControlOwner),
    ("consumer-guidance", ControlField::ConsumerGuidance),
    ("implementation-date", ControlField::ImplementationDate),
    ("review-date", ControlField::ReviewDate),
    ("next-review-date", ControlField::NextReviewDate),
    ("control-type", ControlField::ControlType),
    ("evidence", ControlField::Evidence),
    ("testing-procedure", ControlField::TestingProcedure),
    ("testing-frequency", ControlField::TestingFrequency),
    ("last-test-date", ControlField::LastTestDate),
    ("api-url", ControlField::ApiUrl),
    ("api-credential-id", ControlField::ApiCredentialId),
    ("api-response-data", ControlField::ApiResponseData),
    ("api-data-history", ControlField::ApiDataHistory),
    ("risk-rating", ControlField::RiskRating),
    ("frameworks", ControlField::Frameworks),
    ("compensating-controls", ControlField::CompensatingControls),
    ("exceptions", ControlField::Exceptions),
];

/// Looks up the field a prop name maps to.
pub fn field_for(name: &str) -> Option<ControlField> {
    ANNOTATIONS
        .iter()
        .find(|(prop, _)| *prop == name)
        .map(|(_, field)| *field)
}

/// Checks that every [`ControlField`] is reachable from [`ANNOTATIONS`]
/// under its own emitted name.
///
/// # Returns
///
/// The fields that cannot be read back, empty when the table is complete.
pub fn verify_annotation_table() -> Vec<ControlField> {
    ControlField::ALL
        .iter()
        .copied()
        .filter(|field| field_for(field.prop_name()) != Some(*field))
        .collect()
}

/// Writes one annotation value into `record`.
///
/// JSON-encoded fields fall back gracefully: an unparseable
/// `api-response-data` is kept as its raw string, an unparseable
/// `api-data-history` becomes an empty history.
pub fn apply_annotation(record: &mut ControlRecord, field: ControlField, raw: &str) {
    let text = raw.to_string();
    match field {
        ControlField::CatalogTitle => record.title = text,
        ControlField::CatalogDescription => record.description = text,
        ControlField::GroupTitle => record.group_title = text,
        ControlField::Status => record.status = ImplementationStatus::from(raw),
        ControlField::ResponsibleParty => record.responsible_party = text,
        ControlField::ControlOwner => record.control_owner = text,
        ControlField::ConsumerGuidance => record.consumer_guidance = text,
        ControlField::ImplementationDate => record.implementation_date = text,
        ControlField::ReviewDate => record.review_date = text,
        ControlField::NextReviewDate => record.next_review_date = text,
        ControlField::ControlType => record.control_type = text,
        ControlField::Evidence => record.evidence = text,
        ControlField::TestingProcedure => record.testing_procedure = text,
        ControlField::TestingFrequency => record.testing_frequency = text,
        ControlField::LastTestDate => record.last_test_date = text,
        ControlField::ApiUrl => record.api_url = text,
        ControlField::ApiCredentialId => record.api_credential_id = text,
        ControlField::ApiResponseData => {
            record.api_response_data = Some(parse_response_data(&record.id, raw));
        }
        ControlField::ApiDataHistory => {
            record.api_data_history = parse_data_history(&record.id, raw);
        }
        ControlField::RiskRating => record.risk_rating = text,
        ControlField::Frameworks => record.frameworks = text,
        ControlField::CompensatingControls => record.compensating_controls = text,
        ControlField::Exceptions => record.exceptions = text,
    }
}

fn parse_response_data(control_id: &str, raw: &str) -> Value {
    match serde_json::from_str(raw) {
        Ok(value) => value,
        Err(err) => {
            warn!(control_id, error = %err, "api-response-data is not JSON; keeping raw text");
            Value::String(raw.to_string())
        }
    }
}

fn parse_data_history(control_id: &str, raw: &str) -> Vec<Value> {
    match serde_json::from_str::<Value>(raw) {
        Ok(Value::Array(entries)) => entries,
        Ok(Value::Null) => Vec::new(),
        Ok(single) => vec![single],
        Err(err) => {
            warn!(control_id, error = %err, "api-data-history is not JSON; discarding history");
            Vec::new()
        }
    }
}

/// Reads a field back as prop text, `None` when there is nothing to emit.
fn read_annotation(record: &ControlRecord, field: ControlField) -> Option<String> {
    let text = match field {
        ControlField::CatalogTitle => record.title.clone(),
        ControlField::CatalogDescription => record.description.clone(),
        ControlField::GroupTitle => record.group_title.clone(),
        ControlField::Status => record.status.as_str().to_string(),
        ControlField::ResponsibleParty => record.responsible_party.clone(),
        ControlField::ControlOwner => record.control_owner.clone(),
        ControlField::ConsumerGuidance => record.consumer_guidance.clone(),
        ControlField::ImplementationDate => record.implementation_date.clone(),
        ControlField::ReviewDate => record.review_date.clone(),
        ControlField::NextReviewDate => record.next_review_date.clone(),
        ControlField::ControlType => record.control_type.clone(),
        ControlField::Evidence => record.evidence.clone(),
        ControlField::TestingProcedure => record.testing_procedure.clone(),
        ControlField::TestingFrequency => record.testing_frequency.clone(),
        ControlField::LastTestDate => record.last_test_date.clone(),
        ControlField::ApiUrl => record.api_url.clone(),
        ControlField::ApiCredentialId => record.api_credential_id.clone(),
        ControlField::ApiResponseData => match &record.api_response_data {
            Some(Value::String(raw)) => raw.clone(),
            Some(value) => value.to_string(),
            None => String::new(),
        },
        ControlField::ApiDataHistory => {
            if record.api_data_history.is_empty() {
                String::new()
            } else {
                Value::Array(record.api_data_history.clone()).to_string()
            }
        }
        ControlField::RiskRating => record.risk_rating.clone(),
        ControlField::Frameworks => record.frameworks.clone(),
        ControlField::CompensatingControls => record.compensating_controls.clone(),
        ControlField::Exceptions => record.exceptions.clone(),
    };

    if text.trim().is_empty() {
        None
    } else {
        Some(text)
    }
}

impl ControlRecord {
    /// Emits the record's catalog text and assessment data as props.
    ///
    /// Empty fields are skipped. Reading the props back with the Control
    /// Extractor reproduces the record.
    ///
    /// # Example
    ///
    /// ```rust
    /// use ssp_extract::{ControlRecord, ImplementationStatus};
    ///
    /// let mut record = ControlRecord::new("ac-1");
    /// record.status = ImplementationStatus::Effective;
    ///
    /// let props = record.to_props();
    /// assert_eq!(props.len(), 1);
    /// assert_eq!(props[0]["name"], "implementation-status");
    /// assert_eq!(props[0]["value"], "effective");
    /// ```
    pub fn to_props(&self) -> Vec<Value> {
        ControlField::ALL
            .iter()
            .filter_map(|field| {
                read_annotation(self, *field).map(|value| {
                    json!({
                        "name": field.prop_name(),
                        "ns": ANNOTATION_NAMESPACE,
                        "value": value,
                    })
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_annotation_table_is_complete() {
        assert!(verify_annotation_table().is_empty());
    }

    #[test]
    fn test_control_group_alias() {
        assert_eq!(field_for("control-group"), Some(ControlField::GroupTitle));
        assert_eq!(field_for("group-title"), Some(ControlField::GroupTitle));
        assert_eq!(field_for("unknown-prop"), None);
    }

    #[test]
    fn test_status_is_parsed() {
        let mut record = ControlRecord::new("ac-1");
        apply_annotation(&mut record, ControlField::Status, "effective");
        assert_eq!(record.status, ImplementationStatus::Effective);
    }

    #[test]
    fn test_response_data_falls_back_to_raw_text() {
        let mut record = ControlRecord::new("ac-1");
        apply_annotation(&mut record, ControlField::ApiResponseData, "{not json");
        assert_eq!(record.api_response_data, Some(json!("{not json")));

        apply_annotation(&mut record, ControlField::ApiResponseData, r#"{"ok":true}"#);
        assert_eq!(record.api_response_data, Some(json!({"ok": true})));
    }

    #[test]
    fn test_history_falls_back_to_empty() {
        let mut record = ControlRecord::new("ac-1");
        apply_annotation(&mut record, ControlField::ApiDataHistory, "[1, 2]");
        assert_eq!(record.api_data_history, vec![json!(1), json!(2)]);

        apply_annotation(&mut record, ControlField::ApiDataHistory, "broken[");
        assert!(record.api_data_history.is_empty());
    }

    #[test]
    fn test_to_props_skips_empty_fields() {
        let mut record = ControlRecord::new("ac-2");
        record.title = "Account Management".to_string();
        record.remarks = "not a prop".to_string();
        record.evidence = "  ".to_string();
        record.api_data_history = vec![json!({"status": 200})];

        let props = record.to_props();
        let names: Vec<&str> = props.iter().filter_map(|p| p["name"].as_str()).collect();
        assert_eq!(
            names,
            vec!["catalog-control-title", "implementation-status", "api-data-history"]
        );
        assert_eq!(props[2]["value"], r#"[{"status":200}]"#);
    }
}
