//! Configuration types for the reconciler.
//!
//! Loaded from TOML; every section and field is optional and falls back to
//! the defaults below.
//!
//! ```toml
//! [sanitize]
//! placeholder = "N/A"
//! use_default = true
//!
//! [cache]
//! max_entries = 16
//!
//! [export]
//! document_title = "Payments Platform SSP"
//!
//! [n_way.labels]
//! csp1 = "Vendor A"
//! ```

use crate::error::ReconcileError;
use crate::Result;
use serde::{Deserialize, Serialize};
use ssp_reconcile::SourceLabel;
use ssp_sanitize::SanitizeOptions;
use std::path::Path;

/// Configuration for the reconciliation facade.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReconcilerConfig {
    /// Output sanitization.
    pub sanitize: SanitizeOptions,

    /// Extraction cache.
    pub cache: CacheConfig,

    /// SSP document export.
    pub export: ExportConfig,

    /// N-way comparison.
    pub n_way: NWayConfig,
}

/// Extraction cache configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Cache extracted control lists by document fingerprint.
    pub enabled: bool,

    /// Entries kept before the oldest is evicted.
    pub max_entries: usize,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            max_entries: 64,
        }
    }
}

/// SSP export configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    /// `metadata.oscal-version` of emitted documents.
    pub oscal_version: String,

    /// `metadata.title` of emitted documents.
    pub document_title: String,

    /// `metadata.version` of emitted documents.
    pub document_version: String,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            oscal_version: "1.1.2".to_string(),
            document_title: "System Security Plan".to_string(),
            document_version: "1.0".to_string(),
        }
    }
}

/// N-way comparison configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NWayConfig {
    /// Display labels for the three slots.
    pub labels: SourceLabels,
}

/// Display labels for the n-way slots.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceLabels {
    pub baseline: String,
    pub csp1: String,
    pub csp2: String,
}

impl Default for SourceLabels {
    fn default() -> Self {
        Self {
            baseline: SourceLabel::Baseline.as_str().to_string(),
            csp1: SourceLabel::Csp1.as_str().to_string(),
            csp2: SourceLabel::Csp2.as_str().to_string(),
        }
    }
}

impl SourceLabels {
    /// Display label of a slot.
    pub fn label_for(&self, source: SourceLabel) -> &str {
        match source {
            SourceLabel::Baseline => &self.baseline,
            SourceLabel::Csp1 => &self.csp1,
            SourceLabel::Csp2 => &self.csp2,
        }
    }
}

impl ReconcilerConfig {
    /// Parses configuration from TOML text.
    ///
    /// # Errors
    ///
    /// Returns `ReconcileError::Toml` for malformed TOML or mistyped values.
    pub fn from_toml_str(text: &str) -> Result<Self> {
        Ok(toml::from_str(text)?)
    }

    /// Loads configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns `ReconcileError::Io` when the file cannot be read and
    /// `ReconcileError::Toml` when it does not parse.
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|source| ReconcileError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    /// Checks values that would otherwise fail late.
    ///
    /// # Errors
    ///
    /// - `ReconcileError::Sanitize` when the placeholder fails the string
    ///   pattern
    /// - `ReconcileError::Config` for a zero-sized enabled cache or a blank
    ///   export field
    pub fn validate(&self) -> Result<()> {
        self.sanitize.validate()?;

        if self.cache.enabled && self.cache.max_entries == 0 {
            return Err(ReconcileError::Config(
                "cache.max_entries must be greater than zero when the cache is enabled".to_string(),
            ));
        }

        let export_fields = [
            ("export.oscal_version", &self.export.oscal_version),
            ("export.document_title", &self.export.document_title),
            ("export.document_version", &self.export.document_version),
        ];
        for (name, value) in export_fields {
            if value.trim().is_empty() {
                return Err(ReconcileError::Config(format!("{name} must not be blank")));
            }
        }

        Ok(())
    }
}
