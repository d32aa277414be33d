//! # Change Classification
//!
//! Decides whether a catalog control is new, changed or unchanged relative
//! to the record a system previously stored for it, and merges the two.
//!
//! ## Classification
//!
//! | Prior record | Catalog text vs. stored text | Result |
//! |--------------|------------------------------|--------|
//! | Absent | - | `new`, assessment fields at defaults |
//! | Present | Equal after normalization | `unchanged` |
//! | Present | Title and/or description differ | `changed`, with details |
//!
//! Only catalog-authored text is compared: the stored catalog title and
//! description, never the implementation narrative.
//!
//! ## Guarantee
//!
//! Every user-entered assessment field is carried forward from the prior
//! record whatever the classification. A catalog update can never erase
//! assessment work.
//!
//! ## Normalization
//!
//! Text is compared after trimming, converting `\r\n` and `\r` to `\n`,
//! collapsing whitespace runs to a single space and lowercasing, so that
//! reformatting a catalog does not flag every control as changed.

use ssp_extract::{ChangeDetail, ChangeStatus, ControlDefinition, ControlRecord};
use tracing::debug;

/// Normalizes catalog text for comparison.
///
/// # Example
///
/// ```rust
/// use ssp_reconcile::classify::normalize_text;
///
/// assert_eq!(normalize_text("  Access\r\n  Control   POLICY "), "access control policy");
/// ```
pub fn normalize_text(text: &str) -> String {
    let unified = text.trim().replace("\r\n", "\n").replace('\r', "\n");
    unified
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// Whether two catalog texts are equal after normalization.
pub fn text_matches(a: &str, b: &str) -> bool {
    normalize_text(a) == normalize_text(b)
}

/// Classifies a catalog control against its prior record and merges them.
///
/// # Arguments
///
/// * `definition` - The control as the current catalog defines it
/// * `prior` - The record previously stored for the same identifier
///
/// # Returns
///
/// A record carrying the catalog's current text, the prior assessment data
/// and the change-tracking fields.
///
/// # Example
///
/// ```rust
/// use ssp_reconcile::classify::classify;
/// use ssp_extract::{ChangeStatus, ControlDefinition, ControlRecord, ImplementationStatus};
///
/// let definition = ControlDefinition {
///     id: "ac-1".to_string(),
///     title: "Access Control Policy".to_string(),
///     ..ControlDefinition::default()
/// };
///
/// let mut prior = ControlRecord::new("ac-1");
/// prior.title = "access  control policy".to_string();
/// prior.status = ImplementationStatus::Effective;
///
/// let merged = classify(&definition, Some(&prior));
/// assert_eq!(merged.change_status, Some(ChangeStatus::Unchanged));
/// assert_eq!(merged.status, ImplementationStatus::Effective);
/// assert_eq!(merged.title, "Access Control Policy");
/// ```
pub fn classify(definition: &ControlDefinition, prior: Option<&ControlRecord>) -> ControlRecord {
    let mut record = ControlRecord::from_definition(definition);

    let Some(prior) = prior else {
        record.change_status = Some(ChangeStatus::New);
        return record;
    };

    record.copy_assessment_from(prior);
    if record.group_title.trim().is_empty() {
        record.group_title = prior.group_title.clone();
    }

    let mut details = Vec::new();
    if !text_matches(&definition.title, &prior.title) {
        details.push(ChangeDetail::Title);
    }
    if !text_matches(&definition.description, &prior.description) {
        details.push(ChangeDetail::Description);
    }

    if details.is_empty() {
        record.change_status = Some(ChangeStatus::Unchanged);
        return record;
    }

    debug!(control_id = %definition.id, changed = ?details, "Catalog text changed");
    record.change_status = Some(ChangeStatus::Changed);
    record.change_reason = Some(change_reason(&details));
    record.previous_title = Some(prior.title.clone());
    record.previous_description = Some(prior.description.clone());
    record.change_details = details;
    record
}

fn change_reason(details: &[ChangeDetail]) -> String {
    match details {
        [ChangeDetail::Title] => "Catalog title changed".to_string(),
        [ChangeDetail::Description] => "Catalog description changed".to_string(),
        _ => "Catalog title and description changed".to_string(),
    }
}
