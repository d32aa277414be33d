//! Result types produced by the reconcilers.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ssp_extract::{CatalogProvenance, ControlRecord, SystemInfo};
use std::collections::BTreeMap;
use std::fmt;

// =============================================================================
// Two-Way Comparison
// =============================================================================

/// Aggregate counts of a two-way comparison.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComparisonStats {
    /// Catalog controls in the result.
    pub total: usize,

    /// Catalog controls with no prior record.
    pub new: usize,

    /// Controls whose catalog text changed.
    pub changed: usize,

    /// Controls whose catalog text is unchanged.
    pub unchanged: usize,

    /// Records extracted from the existing document.
    pub existing_total: usize,

    /// Existing records whose control is no longer in the catalog.
    pub removed: usize,
}

/// Catalog controls merged with an existing document's assessment data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComparisonResult {
    /// One record per catalog control, in catalog order.
    pub controls: Vec<ControlRecord>,

    /// Aggregate counts.
    pub stats: ComparisonStats,

    /// System information recovered from the existing document.
    pub system_info: SystemInfo,

    /// Identifiers present in the existing document but not in the catalog.
    #[serde(default)]
    pub removed: Vec<String>,

    /// When the comparison ran.
    pub generated_at: DateTime<Utc>,
}

// =============================================================================
// N-Way Comparison
// =============================================================================

/// One of the three comparison slots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceLabel {
    /// The reference document.
    Baseline,
    /// First provider document.
    Csp1,
    /// Second provider document.
    Csp2,
}

impl SourceLabel {
    /// All slots, in precedence order.
    pub const ALL: [SourceLabel; 3] = [Self::Baseline, Self::Csp1, Self::Csp2];

    /// The slot key as serialized.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Baseline => "baseline",
            Self::Csp1 => "csp1",
            Self::Csp2 => "csp2",
        }
    }
}

impl fmt::Display for SourceLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How the present sources agree on one control.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Agreement {
    /// Present everywhere with one status.
    Identical,
    /// Present everywhere with differing statuses.
    Different,
    /// Absent from at least one present source.
    MissingInSome,
}

/// One control across all present sources.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UnifiedControl {
    /// Control identifier.
    pub id: String,

    /// Title from the first source that supplies one.
    pub title: String,

    /// Description from the first source that supplies one.
    pub description: String,

    /// Group title from the first source that supplies one.
    pub group_title: String,

    /// Each source's record for this control.
    pub sources: BTreeMap<SourceLabel, ControlRecord>,

    /// True unless the classification is [`Agreement::Identical`].
    pub has_differences: bool,

    /// Agreement classification.
    pub classification: Agreement,
}

/// Aggregate counts of an n-way comparison.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NWayStats {
    /// Controls in the union.
    pub total: usize,

    /// Controls classified identical.
    pub identical: usize,

    /// Controls classified different.
    pub different: usize,

    /// Controls classified missing-in-some.
    pub missing_in_some: usize,
}

/// Catalog provenance of one source, for side-by-side display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceVersion {
    /// Which slot the document occupied.
    pub source: SourceLabel,

    /// Display label for the slot.
    pub label: String,

    /// Recovered provenance.
    #[serde(flatten)]
    pub provenance: CatalogProvenance,
}

/// Up to three documents compared control by control.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NWayResult {
    /// Union of identifiers, naturally ordered.
    pub controls: Vec<UnifiedControl>,

    /// Aggregate counts.
    pub stats: NWayStats,

    /// Slots that were supplied, in precedence order.
    pub sources: Vec<SourceLabel>,

    /// Display label for each supplied slot.
    pub labels: BTreeMap<SourceLabel, String>,

    /// Per-source catalog provenance; empty when fewer than two sources.
    pub version_differences: Vec<SourceVersion>,

    /// True when two sources recovered different catalog versions.
    pub catalog_versions_differ: bool,

    /// When the comparison ran.
    pub generated_at: DateTime<Utc>,
}
