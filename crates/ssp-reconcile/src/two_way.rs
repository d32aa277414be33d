//! # Two-Way Reconciliation
//!
//! Merges a freshly loaded catalog with the records of one existing
//! document. The output has exactly one record per catalog control, in
//! catalog order; prior records whose control the catalog no longer defines
//! are reported in `removed` but never merged into the output.

use crate::classify::classify;
use crate::models::{ComparisonResult, ComparisonStats};
use chrono::Utc;
use serde_json::Value;
use ssp_extract::{
    control_key, extract_controls, extract_system_info, ChangeStatus, ControlDefinition,
    ControlRecord, SystemInfo,
};
use std::collections::{HashMap, HashSet};
use tracing::{info, warn};

/// Reconciles catalog definitions with already-extracted prior records.
///
/// # Arguments
///
/// * `catalog` - Control definitions, in catalog order
/// * `prior` - Records extracted from the existing document
/// * `system_info` - System information of the existing document
///
/// # Example
///
/// ```rust
/// use ssp_reconcile::two_way::reconcile;
/// use ssp_extract::{ChangeStatus, ControlDefinition, SystemInfo};
///
/// let catalog = vec![ControlDefinition {
///     id: "AC-1".to_string(),
///     title: "Access Control Policy".to_string(),
///     ..ControlDefinition::default()
/// }];
///
/// let result = reconcile(&catalog, &[], SystemInfo::default());
/// assert_eq!(result.stats.total, 1);
/// assert_eq!(result.stats.new, 1);
/// assert_eq!(result.controls[0].change_status, Some(ChangeStatus::New));
/// ```
pub fn reconcile(
    catalog: &[ControlDefinition],
    prior: &[ControlRecord],
    system_info: SystemInfo,
) -> ComparisonResult {
    let mut index: HashMap<String, &ControlRecord> = HashMap::with_capacity(prior.len());
    for record in prior {
        index.entry(control_key(&record.id)).or_insert(record);
    }

    let mut seen = HashSet::with_capacity(catalog.len());
    let mut stats = ComparisonStats {
        existing_total: prior.len(),
        ..ComparisonStats::default()
    };
    let mut controls = Vec::with_capacity(catalog.len());

    for definition in catalog {
        let key = control_key(&definition.id);
        let prior_record = index.get(&key).copied();
        if !seen.insert(key) {
            warn!(control_id = %definition.id, "Catalog defines control twice; keeping first");
            continue;
        }

        let record = classify(definition, prior_record);
        match record.change_status {
            Some(ChangeStatus::New) => stats.new += 1,
            Some(ChangeStatus::Changed) => stats.changed += 1,
            Some(ChangeStatus::Unchanged) | None => stats.unchanged += 1,
        }
        controls.push(record);
    }

    let removed: Vec<String> = prior
        .iter()
        .filter(|record| !seen.contains(&control_key(&record.id)))
        .map(|record| record.id.clone())
        .collect();

    stats.total = controls.len();
    stats.removed = removed.len();

    info!(
        total = stats.total,
        new = stats.new,
        changed = stats.changed,
        unchanged = stats.unchanged,
        removed = stats.removed,
        "Two-way reconciliation complete"
    );

    ComparisonResult {
        controls,
        stats,
        system_info,
        removed,
        generated_at: Utc::now(),
    }
}

/// Reconciles catalog definitions with an existing document of any shape.
///
/// Extraction and system-info recovery run on `existing` first; a document
/// of unrecognized shape simply contributes no prior records.
pub fn compare(catalog: &[ControlDefinition], existing: &Value) -> ComparisonResult {
    let prior = extract_controls(existing);
    reconcile(catalog, &prior, extract_system_info(existing))
}
