//! Error types for the reconciliation facade.

use ssp_extract::ControlField;
use std::path::PathBuf;
use thiserror::Error;

/// Core error type for reconciler operations.
///
/// Only boundary operations fail: loading configuration, validating it, and
/// parsing document text. Work over parsed documents always yields a result.
#[derive(Debug, Error)]
pub enum ReconcileError {
    /// Configuration value rejected at startup.
    #[error("Configuration error: {0}")]
    Config(String),

    /// The annotation table cannot read back every record field.
    #[error("Annotation table incomplete; unreadable fields: {0:?}")]
    IncompleteAnnotations(Vec<ControlField>),

    /// A file could not be read.
    #[error("Failed to read {path}: {source}")]
    Io {
        /// The file being read
        path: PathBuf,
        /// Underlying I/O error
        source: std::io::Error,
    },

    /// Configuration text is not valid TOML.
    #[error("Invalid TOML configuration: {0}")]
    Toml(#[from] toml::de::Error),

    /// Sanitizer configuration passthrough.
    #[error("Sanitizer error: {0}")]
    Sanitize(#[from] ssp_sanitize::SanitizeError),

    /// Document parsing passthrough.
    #[error("Extraction error: {0}")]
    Extract(#[from] ssp_extract::ExtractError),
}
