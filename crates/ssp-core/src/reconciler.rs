//! The unified reconciliation facade.
//!
//! [`Reconciler`] validates configuration once at startup, owns the
//! extraction cache, and exposes every engine operation through one type.

use crate::{
    builder::{build_ssp, CatalogSource},
    cache::ExtractionCache,
    config::ReconcilerConfig,
    error::ReconcileError,
    Result,
};

use serde_json::Value;
use ssp_extract::{
    extract_provenance, extract_system_info, parse_catalog, verify_annotation_table,
    ControlRecord,
};
use ssp_reconcile::{
    n_way::{reconcile_sources, SourceInput},
    two_way::reconcile,
    ComparisonResult, NWayResult, SourceLabel,
};
use ssp_sanitize::sanitize_document;
use std::sync::Arc;

use tracing::{debug, info};

/// The document reconciliation facade.
///
/// Reconciler orchestrates the engine's components:
/// - **Control Extractor**: reads controls from any supported shape, cached
/// - **Two-Way Reconciler**: merges a catalog with one existing document
/// - **N-Way Reconciler**: lines up to three documents side by side
/// - **SSP Builder + Tree Sanitizer**: emits a pattern-safe OSCAL document
///
/// # Ordering
///
/// Sanitization is terminal. [`Reconciler::export_ssp`] builds the complete
/// tree, defaults included, and sanitizes it last; a sanitized tree is
/// never fed back into extraction by this type.
///
/// # Example
///
/// ```rust
/// use ssp_core::{Reconciler, ReconcilerConfig};
/// use serde_json::json;
///
/// let mut reconciler = Reconciler::new(ReconcilerConfig::default())?;
///
/// let catalog = json!({ "catalog": { "metadata": {}, "controls": [
///     { "id": "AC-1", "title": "Access Control Policy" }
/// ]}});
/// let existing = json!({ "controls": [] });
///
/// let result = reconciler.compare_with_catalog(&catalog, &existing);
/// assert_eq!(result.stats.new, 1);
/// # Ok::<(), ssp_core::ReconcileError>(())
/// ```
pub struct Reconciler {
    /// Configuration.
    config: ReconcilerConfig,

    /// Extraction cache, absent when disabled.
    cache: Option<ExtractionCache>,
}

impl Reconciler {
    /// Create a new Reconciler with the given configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Configuration is invalid
    /// - The annotation table cannot read back every record field
    pub fn new(config: ReconcilerConfig) -> Result<Self> {
        config.validate()?;

        let missing = verify_annotation_table();
        if !missing.is_empty() {
            return Err(ReconcileError::IncompleteAnnotations(missing));
        }

        let cache = config
            .cache
            .enabled
            .then(|| ExtractionCache::new(config.cache.max_entries));

        info!(
            placeholder = %config.sanitize.placeholder,
            cache_entries = ?config.cache.enabled.then_some(config.cache.max_entries),
            "Reconciler initialized"
        );

        Ok(Self { config, cache })
    }

    /// The active configuration.
    pub fn config(&self) -> &ReconcilerConfig {
        &self.config
    }

    /// Extracts a document's controls, through the cache when enabled.
    pub fn extract_controls(&mut self, document: &Value) -> Arc<Vec<ControlRecord>> {
        match self.cache.as_mut() {
            Some(cache) => cache.get_or_extract(document),
            None => Arc::new(ssp_extract::extract_controls(document)),
        }
    }

    /// `(hits, misses)` of the extraction cache, `None` when disabled.
    pub fn cache_stats(&self) -> Option<(u64, u64)> {
        self.cache.as_ref().map(ExtractionCache::stats)
    }

    /// Reconciles a catalog document with an existing document.
    ///
    /// # Arguments
    ///
    /// * `catalog` - A catalog document (`{ catalog: { ... } }` or bare)
    /// * `existing` - A prior SSP, simplified export or embedded catalog
    pub fn compare_with_catalog(&mut self, catalog: &Value, existing: &Value) -> ComparisonResult {
        let definitions = parse_catalog(catalog);
        debug!(definitions = definitions.len(), "Catalog parsed");

        let prior = self.extract_controls(existing);
        reconcile(&definitions, &prior, extract_system_info(existing))
    }

    /// Compares up to three documents control by control.
    ///
    /// Display labels come from `n_way.labels`.
    pub fn compare_documents(&mut self, documents: &[(SourceLabel, &Value)]) -> NWayResult {
        let extracted: Vec<(SourceLabel, Arc<Vec<ControlRecord>>, &Value)> = documents
            .iter()
            .map(|(label, document)| (*label, self.extract_controls(document), *document))
            .collect();

        let inputs: Vec<SourceInput<'_>> = extracted
            .iter()
            .map(|(label, controls, document)| SourceInput {
                label: *label,
                controls: controls.as_slice(),
                provenance: extract_provenance(document),
            })
            .collect();

        let mut result = reconcile_sources(&inputs);

        let labels = &self.config.n_way.labels;
        for (source, label) in result.labels.iter_mut() {
            *label = labels.label_for(*source).to_string();
        }
        for version in &mut result.version_differences {
            version.label = labels.label_for(version.source).to_string();
        }

        result
    }

    /// Builds and sanitizes an OSCAL SSP from a comparison result.
    ///
    /// # Arguments
    ///
    /// * `result` - The comparison to export
    /// * `catalog` - The catalog document the result was built from
    /// * `catalog_url` - Where the catalog is published; defaults to the
    ///   catalog's own canonical link
    pub fn export_ssp(
        &self,
        result: &ComparisonResult,
        catalog: Option<&Value>,
        catalog_url: Option<&str>,
    ) -> Value {
        let source = CatalogSource {
            document: catalog,
            url: catalog_url,
        };
        let document = build_ssp(result, &source, &self.config.export);
        self.finalize(&document)
    }

    /// Sanitizes a finished document with the configured options.
    ///
    /// Returns a new tree; `document` is not modified.
    pub fn finalize(&self, document: &Value) -> Value {
        debug!("Sanitizing document");
        sanitize_document(document, &self.config.sanitize)
    }
}
