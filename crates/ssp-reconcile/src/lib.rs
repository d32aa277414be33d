//! # SSP Reconcile - Catalog Drift Without Data Loss
//!
//! Catalogs are revised; System Security Plans record years of assessment
//! work against them. This crate merges the two without losing any of that
//! work, and lines up several plans against each other.
//!
//! ## Capabilities
//!
//! | Module | Input | Output |
//! |--------|-------|--------|
//! | [`classify`] | One catalog control + its prior record | Merged record with `changeStatus` |
//! | [`two_way`] | Catalog + one existing document | [`ComparisonResult`] |
//! | [`n_way`] | Up to three documents | [`NWayResult`] |
//!
//! ## Data Flow
//!
//! ```text
//!   catalog ──▶ Vec<ControlDefinition> ─┐
//!                                       ├─▶ classify (per control) ─▶ ComparisonResult
//!   existing ─▶ Vec<ControlRecord> ─────┘
//!
//!   baseline ─┐
//!   csp1 ─────┼─▶ extract + provenance ─▶ union ─▶ agreement ─▶ NWayResult
//!   csp2 ─────┘
//! ```
//!
//! ## Usage
//!
//! ```rust
//! use ssp_reconcile::two_way::compare;
//! use ssp_extract::{ChangeStatus, ControlDefinition, ImplementationStatus};
//! use serde_json::json;
//!
//! let catalog = vec![ControlDefinition {
//!     id: "AC-1".to_string(),
//!     title: "Access Control Policy".to_string(),
//!     description: "Policy text".to_string(),
//!     ..ControlDefinition::default()
//! }];
//!
//! let existing = json!({ "controls": [{
//!     "id": "AC-1",
//!     "title": "Access Control Policy",
//!     "description": "Policy text",
//!     "status": "effective"
//! }]});
//!
//! let result = compare(&catalog, &existing);
//! assert_eq!(result.controls[0].change_status, Some(ChangeStatus::Unchanged));
//! assert_eq!(result.controls[0].status, ImplementationStatus::Effective);
//! ```

pub mod classify;
pub mod models;
pub mod n_way;
pub mod two_way;

pub use classify::{classify, normalize_text};
pub use models::{
    Agreement, ComparisonResult, ComparisonStats, NWayResult, NWayStats, SourceLabel,
    SourceVersion, UnifiedControl,
};
pub use n_way::{compare_documents, reconcile_sources, SourceInput};
pub use two_way::{compare, reconcile};
