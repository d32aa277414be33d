//! # Reconciliation Scenario Tests
//!
//! The reference scenarios and engine-wide properties, driven through the
//! public facade.
//!
//! ## Scenarios Covered
//!
//! 1. **New control**: Catalog control with no prior record
//! 2. **Carried assessment**: Unchanged catalog text keeps the recorded status
//! 3. **Partial coverage**: Control missing from one of three sources
//! 4. **Half-empty annotation**: Props entry without a name is dropped
//! 5. **Damaged prior data**: Null or mistyped fields, case-shifted ids,
//!    "N/A" annotations
//! 6. **Properties**: Idempotence, no data loss, change determinism,
//!    new-control defaults, union completeness, content preservation

use serde_json::{json, Value};
use ssp_core::{
    sanitize_document, Agreement, ImplementationStatus, Reconciler, ReconcilerConfig,
    SanitizeOptions, SourceLabel,
};
use ssp_extract::{ChangeDetail, ChangeStatus, ControlDefinition, ControlRecord};
use ssp_reconcile::classify;
use ssp_sanitize::sanitize_string;
use std::collections::HashSet;

fn reconciler() -> Reconciler {
    Reconciler::new(ReconcilerConfig::default()).unwrap()
}

fn catalog(controls: Value) -> Value {
    json!({ "catalog": { "metadata": { "title": "Catalog" }, "controls": controls } })
}

// =============================================================================
// SCENARIOS
// =============================================================================

#[test]
fn test_scenario_catalog_control_without_prior_is_new() {
    let result = reconciler().compare_with_catalog(
        &catalog(json!([{ "id": "AC-1", "title": "Access Control Policy" }])),
        &json!({ "controls": [{ "id": "AU-2", "status": "effective" }] }),
    );

    assert_eq!(result.stats.total, 1);
    assert_eq!(result.stats.new, 1);
    assert_eq!(result.stats.changed, 0);
    assert_eq!(result.stats.unchanged, 0);
    assert_eq!(result.controls[0].change_status, Some(ChangeStatus::New));

    let json = serde_json::to_value(&result).unwrap();
    assert_eq!(json["controls"][0]["changeStatus"], "new");
}

#[test]
fn test_scenario_prior_assessment_carried_forward() {
    let result = reconciler().compare_with_catalog(
        &catalog(json!([{
            "id": "AC-1",
            "title": "Access Control Policy",
            "parts": [{ "name": "statement", "prose": "Policy text" }]
        }])),
        &json!({ "controls": [{
            "id": "AC-1",
            "title": "Access Control Policy",
            "description": "Policy text",
            "status": "effective"
        }]}),
    );

    let record = &result.controls[0];
    assert_eq!(record.change_status, Some(ChangeStatus::Unchanged));
    assert_eq!(record.status, ImplementationStatus::Effective);
}

#[test]
fn test_scenario_control_absent_from_one_source() {
    let baseline = json!({ "controls": [{ "id": "AU-2", "status": "effective" }] });
    let csp1 = json!({ "controls": [{ "id": "AU-2", "status": "effective" }] });
    let csp2 = json!({ "controls": [{ "id": "AU-3", "status": "effective" }] });

    let result = reconciler().compare_documents(&[
        (SourceLabel::Baseline, &baseline),
        (SourceLabel::Csp1, &csp1),
        (SourceLabel::Csp2, &csp2),
    ]);

    let au2 = result.controls.iter().find(|c| c.id == "AU-2").unwrap();
    assert!(au2.has_differences);
    assert_eq!(au2.classification, Agreement::MissingInSome);
    assert!(!au2.sources.contains_key(&SourceLabel::Csp2));

    let json = serde_json::to_value(au2).unwrap();
    assert_eq!(json["hasDifferences"], true);
    assert_eq!(json["classification"], "missingInSome");
}

#[test]
fn test_scenario_nameless_prop_dropped() {
    let doc = json!({ "props": [
        { "name": "", "value": "   " },
        { "name": "risk-rating", "value": "low" }
    ]});

    for options in [
        SanitizeOptions::default(),
        SanitizeOptions::default().with_use_default(false),
    ] {
        let clean = sanitize_document(&doc, &options);
        assert_eq!(clean["props"], json!([{ "name": "risk-rating", "value": "low" }]));
    }
}

// =============================================================================
// DAMAGED PRIOR DATA
// =============================================================================

fn access_control_catalog() -> Value {
    catalog(json!([
        { "id": "ac-1", "title": "Access Control Policy" },
        { "id": "ac-2", "title": "Account Management" },
        { "id": "ac-3", "title": "Access Enforcement" }
    ]))
}

#[test]
fn test_scenario_null_and_mistyped_fields_keep_assessment() {
    let prior = json!({ "controls": [
        {
            "id": "ac-1",
            "title": "Access Control Policy",
            "status": "effective",
            "implementation": "Policy in wiki.",
            "responsibleParty": "ISSO",
            "lastTestDate": null
        },
        {
            "id": "ac-2",
            "title": "Account Management",
            "status": "ineffective",
            "evidence": "tickets/ac-2",
            "remarks": null
        },
        {
            "id": "ac-3",
            "title": "Access Enforcement",
            "status": "alternate-control",
            "testingFrequency": 90,
            "controlOwner": { "name": "CISO" }
        }
    ]});

    let result = reconciler().compare_with_catalog(&access_control_catalog(), &prior);
    assert_eq!(result.stats.unchanged, 3);
    assert_eq!(result.stats.removed, 0);

    let ac1 = &result.controls[0];
    assert_eq!(ac1.status, ImplementationStatus::Effective);
    assert_eq!(ac1.implementation, "Policy in wiki.");
    assert_eq!(ac1.responsible_party, "ISSO");

    let ac2 = &result.controls[1];
    assert_eq!(ac2.status, ImplementationStatus::Ineffective);
    assert_eq!(ac2.evidence, "tickets/ac-2");
    assert!(ac2.remarks.is_empty());

    let ac3 = &result.controls[2];
    assert_eq!(ac3.status, ImplementationStatus::AlternateControl);
    assert_eq!(ac3.testing_frequency, "90");
    assert!(ac3.control_owner.is_empty());
}

#[test]
fn test_scenario_prior_ids_in_other_case_still_match() {
    let prior = json!({ "controls": [
        { "id": "AC-1", "title": "Access Control Policy", "status": "effective" }
    ]});

    let result = reconciler().compare_with_catalog(&access_control_catalog(), &prior);
    assert_eq!(result.controls[0].id, "ac-1");
    assert_eq!(result.controls[0].change_status, Some(ChangeStatus::Unchanged));
    assert_eq!(result.controls[0].status, ImplementationStatus::Effective);
    assert!(result.removed.is_empty());
}

#[test]
fn test_scenario_not_applicable_annotation_survives_export() {
    let mut reconciler = reconciler();
    let catalog = access_control_catalog();
    let prior = json!({ "controls": [
        { "id": "ac-1", "title": "Access Control Policy", "status": "effective", "exceptions": "N/A" }
    ]});

    let first = reconciler.compare_with_catalog(&catalog, &prior);
    let exported = reconciler.export_ssp(&first, Some(&catalog), None);
    let second = reconciler.compare_with_catalog(&catalog, &exported);

    assert_eq!(second.controls[0].exceptions, "N/A");
    assert_eq!(second.controls[0].status, ImplementationStatus::Effective);
}

// =============================================================================
// PROPERTIES
// =============================================================================

#[test]
fn test_sanitize_idempotent() {
    let reconciler = reconciler();
    let messy = json!({
        "system-security-plan": {
            "metadata": { "title": "\u{FEFF} Plan \u{00A0}", "remarks": "   ", "links": [] },
            "system-implementation": { "users": [], "components": [{ "title": " x " }] },
            "control-implementation": { "implemented-requirements": [{
                "control-id": " ac-1 ",
                "props": [{ "name": "evidence", "value": "" }],
                "statements": [{ "by-components": [] }],
                "remarks": "line one\nline two"
            }]}
        }
    });

    let once = reconciler.finalize(&messy);
    let twice = reconciler.finalize(&once);
    assert_eq!(
        serde_json::to_string(&once).unwrap(),
        serde_json::to_string(&twice).unwrap()
    );
}

#[test]
fn test_no_data_loss_on_reclassification() {
    let mut prior = ControlRecord::new("ac-2");
    prior.title = "Account Management".to_string();
    prior.status = ImplementationStatus::NoVisibility;
    prior.implementation = "IdP groups".to_string();
    prior.remarks = "Pending".to_string();
    prior.responsible_party = "IAM".to_string();
    prior.testing_frequency = "monthly".to_string();
    prior.api_data_history = vec![json!(1), json!(2)];

    for title in ["Account Management", "Something Else Entirely"] {
        let definition = ControlDefinition {
            id: "ac-2".to_string(),
            title: title.to_string(),
            ..ControlDefinition::default()
        };
        let merged = classify(&definition, Some(&prior));

        assert_eq!(merged.status, prior.status);
        assert_eq!(merged.implementation, prior.implementation);
        assert_eq!(merged.remarks, prior.remarks);
        assert_eq!(merged.responsible_party, prior.responsible_party);
        assert_eq!(merged.testing_frequency, prior.testing_frequency);
        assert_eq!(merged.api_data_history, prior.api_data_history);
    }
}

#[test]
fn test_change_status_determinism() {
    let mut prior = ControlRecord::new("ac-1");
    prior.title = "access   CONTROL policy".to_string();

    let same = ControlDefinition {
        id: "ac-1".to_string(),
        title: "Access Control Policy".to_string(),
        ..ControlDefinition::default()
    };
    assert_eq!(classify(&same, Some(&prior)).change_status, Some(ChangeStatus::Unchanged));

    let different = ControlDefinition {
        title: "Remote Access Policy".to_string(),
        ..same
    };
    let merged = classify(&different, Some(&prior));
    assert_eq!(merged.change_status, Some(ChangeStatus::Changed));
    assert!(merged.change_details.contains(&ChangeDetail::Title));
}

#[test]
fn test_new_control_defaults() {
    let result = reconciler().compare_with_catalog(
        &catalog(json!([{ "id": "sc-7", "title": "Boundary Protection" }])),
        &json!({}),
    );
    let record = &result.controls[0];
    assert_eq!(record.status, ImplementationStatus::NotAssessed);
    assert!(record.implementation.is_empty());
    assert!(record.remarks.is_empty());

    let json = serde_json::to_value(record).unwrap();
    assert_eq!(json["status"], "not-assessed");
}

#[test]
fn test_union_completeness() {
    let a = json!({ "controls": [{ "id": "ac-1" }, { "id": "ac-2" }] });
    let b = json!({ "controls": [{ "id": "ac-2" }, { "id": "ac-3" }, { "id": "ac-1" }] });

    let result = reconciler().compare_documents(&[(SourceLabel::Csp1, &a), (SourceLabel::Csp2, &b)]);
    let ids: Vec<&str> = result.controls.iter().map(|c| c.id.as_str()).collect();

    assert_eq!(ids, vec!["ac-1", "ac-2", "ac-3"]);
    assert_eq!(ids.iter().collect::<HashSet<_>>().len(), ids.len());
}

#[test]
fn test_placeholder_never_replaces_content() {
    let options = SanitizeOptions::default();
    assert_eq!(
        sanitize_string("  Access Control Policy  ", &options).as_deref(),
        Some("Access Control Policy")
    );
    assert_eq!(sanitize_string("   ", &options).as_deref(), Some("N/A"));
}
