//! # SSP Core
//!
//! Unified facade of the document reconciliation and sanitization engine.
//! Orchestrates extraction, reconciliation, SSP assembly and output
//! sanitization behind one validated configuration.
//!
//! ## Failure Coverage
//!
//! Source documents span many tools and several years. The engine degrades
//! instead of failing:
//!
//! | Problem | Component | Handling |
//! |---------|-----------|----------|
//! | Unknown document layout | Control Extractor | Empty result, logged |
//! | Malformed JSON annotation | Annotation table | Raw text or empty history |
//! | Catalog rewording | Change Classifier | `changed`, assessment kept |
//! | Mixed catalog releases | N-Way Reconciler | `catalogVersionsDiffer` |
//! | Padded or blank strings | Tree Sanitizer | Trimmed, placeholder, pruned |
//! | Non-mapping catalog metadata | SSP Builder | Default object, logged |
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                          SSP CORE                               │
//! ├─────────────────────────────────────────────────────────────────┤
//! │                                                                 │
//! │                    ┌─────────────────┐                          │
//! │                    │   Reconciler    │  ← Unified Facade        │
//! │                    │ config + cache  │                          │
//! │                    └────────┬────────┘                          │
//! │                             │                                   │
//! │         ┌───────────────────┼───────────────────┐               │
//! │         ▼                   ▼                   ▼               │
//! │  ┌─────────────┐    ┌─────────────┐    ┌─────────────┐          │
//! │  │ ssp-extract │    │ssp-reconcile│    │ssp-sanitize │          │
//! │  │ shapes,     │    │ 2-way,      │    │ strings,    │          │
//! │  │ props, info │    │ n-way       │    │ trees       │          │
//! │  └─────────────┘    └─────────────┘    └─────────────┘          │
//! │                                                                 │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```rust
//! use ssp_core::{Reconciler, ReconcilerConfig};
//! use serde_json::json;
//!
//! let mut reconciler = Reconciler::new(ReconcilerConfig::default())?;
//!
//! let catalog = json!({ "catalog": { "metadata": { "title": "Catalog" }, "controls": [
//!     { "id": "ac-1", "title": "Policy" }
//! ]}});
//! let prior = json!({ "controls": [{ "id": "ac-1", "title": "Policy", "status": "effective" }] });
//!
//! let result = reconciler.compare_with_catalog(&catalog, &prior);
//! let ssp = reconciler.export_ssp(&result, Some(&catalog), None);
//!
//! let requirements = &ssp["system-security-plan"]["control-implementation"]["implemented-requirements"];
//! assert_eq!(requirements[0]["control-id"], "ac-1");
//! # Ok::<(), ssp_core::ReconcileError>(())
//! ```
//!
//! ## Notes
//!
//! - Every operation is synchronous; nothing here performs I/O except
//!   [`ReconcilerConfig::load`]
//! - Sanitization runs once, last, on a complete tree
//! - Cached extractions are shared immutably via `Arc`

mod builder;
mod cache;
mod config;
mod error;
mod reconciler;

pub use builder::{build_ssp, CatalogSource, UNKNOWN_PROFILE_HREF};
pub use cache::ExtractionCache;
pub use config::{CacheConfig, ExportConfig, NWayConfig, ReconcilerConfig, SourceLabels};
pub use error::ReconcileError;
pub use reconciler::Reconciler;

// Re-export component types for convenience
pub use ssp_extract::{
    parse_document, CatalogMetadata, CatalogProvenance, ControlDefinition, ControlRecord,
    ImplementationStatus, SystemInfo,
};
pub use ssp_reconcile::{Agreement, ComparisonResult, ComparisonStats, NWayResult, SourceLabel};
pub use ssp_sanitize::{sanitize_document, SanitizeOptions};

/// Core result type for reconciler operations.
pub type Result<T> = std::result::Result<T, ReconcileError>;
