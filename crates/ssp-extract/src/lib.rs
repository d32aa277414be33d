//! # SSP Extract - Shape-Tolerant Document Reading
//!
//! Reads System Security Plans, simplified exports and catalogs into one
//! uniform data model. Documents arriving at the reconciliation engine were
//! produced by different tools over several years; this crate is the only
//! place that knows about their layouts.
//!
//! ## Components
//!
//! | Module | Responsibility |
//! |--------|----------------|
//! | [`models`] | Control Record, Control Definition, System Info Record |
//! | [`annotations`] | Prop vocabulary mapping annotations to record fields |
//! | [`catalog`] | Catalog flattening and catalog metadata |
//! | [`controls`] | Control Extractor with shape detection |
//! | [`system`] | System Info Extractor |
//! | [`provenance`] | Catalog URL and version recovery |
//! | [`canonicalize`] | Canonical form and fingerprint of a document |
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                        ANY DOCUMENT                          │
//! └──────────────────────────────┬───────────────────────────────┘
//!                                │
//!          ┌─────────────────────┼─────────────────────┐
//!          ▼                     ▼                     ▼
//!   ┌─────────────┐     ┌─────────────────┐    ┌──────────────┐
//!   │  CONTROLS   │     │   SYSTEM INFO   │    │  PROVENANCE  │
//!   │ shape table │     │ characteristics │    │ 3-tier links │
//!   │ + props     │     │ + parties       │    │ + version    │
//!   └──────┬──────┘     └────────┬────────┘    └──────┬───────┘
//!          ▼                     ▼                    ▼
//!   Vec<ControlRecord>      SystemInfo        CatalogProvenance
//! ```
//!
//! ## Usage
//!
//! ```rust
//! use ssp_extract::{extract_controls, extract_system_info, DocumentShape, detect_shape};
//! use serde_json::json;
//!
//! let simplified = json!({
//!     "controls": [
//!         { "id": "ac-1", "title": "Policy", "status": "effective" },
//!         { "id": "ac-2", "title": "Accounts" }
//!     ]
//! });
//!
//! assert_eq!(detect_shape(&simplified), Some(DocumentShape::Simplified));
//! assert_eq!(extract_controls(&simplified).len(), 2);
//! assert_eq!(extract_system_info(&simplified).integrity_impact, "moderate");
//! ```

pub mod annotations;
pub mod canonicalize;
pub mod catalog;
pub mod controls;
pub mod error;
pub mod models;
pub mod parts;
pub mod provenance;
pub mod system;

pub use annotations::{verify_annotation_table, ControlField, ANNOTATIONS, ANNOTATION_NAMESPACE};
pub use canonicalize::DocumentHash;
pub use catalog::{parse_catalog, CatalogMetadata};
pub use controls::{detect_shape, extract_controls, DocumentShape};
pub use error::{parse_document, ExtractError, Result};
pub use models::{
    compare_control_ids, control_key, ChangeDetail, ChangeStatus, ControlDefinition, ControlRecord,
    ImplementationStatus, SystemInfo,
};
pub use provenance::{catalog_location, extract_provenance, CatalogProvenance};
pub use system::extract_system_info;

#[cfg(test)]
mod tests;
