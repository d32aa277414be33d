//! # N-Way Reconciliation
//!
//! Lines up to three independently supplied documents control by control.
//! Any subset of the slots may be empty; the comparison covers only the
//! sources that were supplied.
//!
//! ## Classification
//!
//! | Present in every source | Distinct statuses | Classification |
//! |-------------------------|-------------------|----------------|
//! | No | any | `missingInSome` |
//! | Yes | more than one | `different` |
//! | Yes | one | `identical` |
//!
//! `hasDifferences` is true for everything except `identical`.
//!
//! ## Catalog Versions
//!
//! With two or more sources, each source's recovered catalog provenance is
//! listed side by side, and `catalogVersionsDiffer` flags sources that were
//! generated against different catalog releases.

use crate::models::{Agreement, NWayResult, NWayStats, SourceLabel, SourceVersion, UnifiedControl};
use chrono::Utc;
use serde_json::Value;
use ssp_extract::{
    compare_control_ids, control_key, extract_controls, extract_provenance, CatalogProvenance,
    ControlRecord, ImplementationStatus,
};
use std::collections::{BTreeMap, HashMap, HashSet};
use tracing::{debug, info, warn};

/// One supplied document, already extracted.
#[derive(Debug, Clone)]
pub struct SourceInput<'a> {
    /// Slot the document occupies.
    pub label: SourceLabel,

    /// Records extracted from the document.
    pub controls: &'a [ControlRecord],

    /// Catalog provenance recovered from the document.
    pub provenance: CatalogProvenance,
}

/// Compares already-extracted sources.
///
/// Inputs are processed in slot order whatever order they arrive in. A
/// slot supplied twice keeps its first input.
///
/// # Example
///
/// ```rust
/// use ssp_reconcile::n_way::{reconcile_sources, SourceInput};
/// use ssp_reconcile::{Agreement, SourceLabel};
/// use ssp_extract::{CatalogProvenance, ControlRecord};
///
/// let baseline = vec![ControlRecord::new("au-2"), ControlRecord::new("au-3")];
/// let csp1 = vec![ControlRecord::new("au-2")];
///
/// let result = reconcile_sources(&[
///     SourceInput { label: SourceLabel::Baseline, controls: &baseline, provenance: CatalogProvenance::default() },
///     SourceInput { label: SourceLabel::Csp1, controls: &csp1, provenance: CatalogProvenance::default() },
/// ]);
///
/// assert_eq!(result.stats.total, 2);
/// assert_eq!(result.controls[0].classification, Agreement::Identical);
/// assert_eq!(result.controls[1].classification, Agreement::MissingInSome);
/// ```
pub fn reconcile_sources(inputs: &[SourceInput<'_>]) -> NWayResult {
    let mut ordered: Vec<&SourceInput<'_>> = Vec::with_capacity(inputs.len());
    for label in SourceLabel::ALL {
        let mut matching = inputs.iter().filter(|input| input.label == label);
        if let Some(first) = matching.next() {
            ordered.push(first);
        }
        if matching.next().is_some() {
            warn!(source = %label, "Source supplied twice; keeping first");
        }
    }

    let indexes: Vec<(SourceLabel, HashMap<String, &ControlRecord>)> = ordered
        .iter()
        .map(|input| {
            let mut index = HashMap::with_capacity(input.controls.len());
            for record in input.controls {
                index.entry(control_key(&record.id)).or_insert(record);
            }
            (input.label, index)
        })
        .collect();

    // (matching key, display id); the earliest slot's spelling is shown
    let mut seen = HashSet::new();
    let mut union: Vec<(&str, &str)> = Vec::new();
    for (_, index) in &indexes {
        for (key, record) in index {
            if seen.insert(key.as_str()) {
                union.push((key.as_str(), record.id.as_str()));
            }
        }
    }
    union.sort_by(|(_, a), (_, b)| compare_control_ids(a, b));

    let mut stats = NWayStats::default();
    let controls: Vec<UnifiedControl> = union
        .into_iter()
        .map(|(key, id)| {
            let unified = unify(key, id, &indexes);
            match unified.classification {
                Agreement::Identical => stats.identical += 1,
                Agreement::Different => stats.different += 1,
                Agreement::MissingInSome => stats.missing_in_some += 1,
            }
            unified
        })
        .collect();
    stats.total = controls.len();

    let sources: Vec<SourceLabel> = ordered.iter().map(|input| input.label).collect();
    let labels: BTreeMap<SourceLabel, String> = sources
        .iter()
        .map(|label| (*label, label.as_str().to_string()))
        .collect();

    let version_differences = if ordered.len() > 1 {
        ordered
            .iter()
            .map(|input| SourceVersion {
                source: input.label,
                label: input.label.as_str().to_string(),
                provenance: input.provenance.clone(),
            })
            .collect()
    } else {
        Vec::new()
    };
    let catalog_versions_differ = versions_differ(&ordered);

    info!(
        sources = sources.len(),
        total = stats.total,
        identical = stats.identical,
        different = stats.different,
        missing_in_some = stats.missing_in_some,
        catalog_versions_differ,
        "N-way reconciliation complete"
    );

    NWayResult {
        controls,
        stats,
        sources,
        labels,
        version_differences,
        catalog_versions_differ,
        generated_at: Utc::now(),
    }
}

/// Extracts and compares raw documents.
///
/// Each document is run through the Control Extractor and provenance
/// recovery before comparison.
pub fn compare_documents(documents: &[(SourceLabel, &Value)]) -> NWayResult {
    let extracted: Vec<(SourceLabel, Vec<ControlRecord>, CatalogProvenance)> = documents
        .iter()
        .map(|(label, document)| {
            let controls = extract_controls(document);
            debug!(source = %label, controls = controls.len(), "Extracted source");
            (*label, controls, extract_provenance(document))
        })
        .collect();

    let inputs: Vec<SourceInput<'_>> = extracted
        .iter()
        .map(|(label, controls, provenance)| SourceInput {
            label: *label,
            controls,
            provenance: provenance.clone(),
        })
        .collect();

    reconcile_sources(&inputs)
}

fn unify(
    key: &str,
    id: &str,
    indexes: &[(SourceLabel, HashMap<String, &ControlRecord>)],
) -> UnifiedControl {
    let sources: BTreeMap<SourceLabel, ControlRecord> = indexes
        .iter()
        .filter_map(|(label, index)| index.get(key).map(|record| (*label, (*record).clone())))
        .collect();

    let statuses: HashSet<&ImplementationStatus> =
        sources.values().map(|record| &record.status).collect();

    let classification = if sources.len() < indexes.len() {
        Agreement::MissingInSome
    } else if statuses.len() > 1 {
        Agreement::Different
    } else {
        Agreement::Identical
    };

    UnifiedControl {
        id: id.to_string(),
        title: first_non_empty(sources.values().map(|record| record.title.as_str())),
        description: first_non_empty(sources.values().map(|record| record.description.as_str())),
        group_title: first_non_empty(sources.values().map(|record| record.group_title.as_str())),
        has_differences: classification != Agreement::Identical,
        classification,
        sources,
    }
}

fn first_non_empty<'a>(mut texts: impl Iterator<Item = &'a str>) -> String {
    texts
        .find(|text| !text.trim().is_empty())
        .unwrap_or_default()
        .to_string()
}

fn versions_differ(ordered: &[&SourceInput<'_>]) -> bool {
    let versions: HashSet<&str> = ordered
        .iter()
        .map(|input| input.provenance.catalog_version.as_str())
        .filter(|version| !version.is_empty())
        .collect();
    versions.len() > 1
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(id: &str, status: ImplementationStatus) -> ControlRecord {
        let mut record = ControlRecord::new(id);
        record.status = status;
        record
    }

    fn input<'a>(label: SourceLabel, controls: &'a [ControlRecord], version: &str) -> SourceInput<'a> {
        SourceInput {
            label,
            controls,
            provenance: CatalogProvenance {
                catalog_version: version.to_string(),
                ..CatalogProvenance::default()
            },
        }
    }

    #[test]
    fn test_status_disagreement_is_different() {
        let a = vec![record("ac-1", ImplementationStatus::Effective)];
        let b = vec![record("ac-1", ImplementationStatus::Ineffective)];
        let result = reconcile_sources(&[
            input(SourceLabel::Baseline, &a, ""),
            input(SourceLabel::Csp1, &b, ""),
        ]);

        let unified = &result.controls[0];
        assert_eq!(unified.classification, Agreement::Different);
        assert!(unified.has_differences);
        assert_eq!(result.stats.different, 1);
    }

    #[test]
    fn test_union_is_naturally_ordered_without_duplicates() {
        let a = vec![
            record("ac-10", ImplementationStatus::Effective),
            record("ac-2", ImplementationStatus::Effective),
        ];
        let b = vec![
            record("ac-2", ImplementationStatus::Effective),
            record("ac-2.1", ImplementationStatus::Effective),
        ];
        let result = reconcile_sources(&[
            input(SourceLabel::Csp2, &b, ""),
            input(SourceLabel::Baseline, &a, ""),
        ]);

        let ids: Vec<&str> = result.controls.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, vec!["ac-2", "ac-2.1", "ac-10"]);
        assert_eq!(result.sources, vec![SourceLabel::Baseline, SourceLabel::Csp2]);
    }

    #[test]
    fn test_ids_match_across_case() {
        let baseline = vec![record("ac-1", ImplementationStatus::Effective)];
        let csp1 = vec![record("AC-1", ImplementationStatus::Effective)];

        let result = reconcile_sources(&[
            input(SourceLabel::Baseline, &baseline, ""),
            input(SourceLabel::Csp1, &csp1, ""),
        ]);

        assert_eq!(result.stats.total, 1);
        assert_eq!(result.controls[0].id, "ac-1");
        assert_eq!(result.controls[0].classification, Agreement::Identical);
        assert_eq!(result.controls[0].sources[&SourceLabel::Csp1].id, "AC-1");
    }

    #[test]
    fn test_fields_from_first_supplying_source() {
        let mut base = ControlRecord::new("ac-1");
        base.description = "Baseline text".to_string();
        let mut csp = ControlRecord::new("ac-1");
        csp.title = "Provider title".to_string();
        csp.description = "Provider text".to_string();
        let (a, b) = (vec![base], vec![csp]);

        let result = reconcile_sources(&[
            input(SourceLabel::Baseline, &a, ""),
            input(SourceLabel::Csp1, &b, ""),
        ]);
        let unified = &result.controls[0];
        assert_eq!(unified.title, "Provider title");
        assert_eq!(unified.description, "Baseline text");
    }

    #[test]
    fn test_single_source_has_no_version_list() {
        let a = vec![record("ac-1", ImplementationStatus::Effective)];
        let result = reconcile_sources(&[input(SourceLabel::Csp1, &a, "5.1.1")]);
        assert!(result.version_differences.is_empty());
        assert!(!result.catalog_versions_differ);
        assert_eq!(result.controls[0].classification, Agreement::Identical);
    }

    #[test]
    fn test_version_mismatch_flagged() {
        let a = vec![record("ac-1", ImplementationStatus::Effective)];
        let result = reconcile_sources(&[
            input(SourceLabel::Baseline, &a, "5.1.1"),
            input(SourceLabel::Csp1, &a, "4.0"),
            input(SourceLabel::Csp2, &a, ""),
        ]);
        assert_eq!(result.version_differences.len(), 3);
        assert!(result.catalog_versions_differ);

        let same = reconcile_sources(&[
            input(SourceLabel::Baseline, &a, "5.1.1"),
            input(SourceLabel::Csp1, &a, ""),
        ]);
        assert!(!same.catalog_versions_differ);
    }

    #[test]
    fn test_no_sources() {
        let result = reconcile_sources(&[]);
        assert!(result.controls.is_empty());
        assert_eq!(result.stats, NWayStats::default());
    }

    #[test]
    fn test_compare_documents_end_to_end() {
        let baseline = json!({ "controls": [
            { "id": "au-2", "status": "effective" },
            { "id": "au-3", "status": "effective" }
        ]});
        let csp1 = json!({ "controls": [
            { "id": "au-2", "status": "effective" },
            { "id": "au-3", "status": "not-implemented" }
        ]});

        let result = compare_documents(&[
            (SourceLabel::Baseline, &baseline),
            (SourceLabel::Csp1, &csp1),
        ]);
        assert_eq!(result.stats.identical, 1);
        assert_eq!(result.stats.different, 1);
        assert_eq!(result.labels[&SourceLabel::Csp1], "csp1");
    }
}
