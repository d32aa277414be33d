//! Error types for document extraction.

use thiserror::Error;

/// Result type alias for extraction operations.
pub type Result<T> = std::result::Result<T, ExtractError>;

/// Errors raised while reading documents.
///
/// Extraction over an already-parsed tree never fails as a whole; the
/// entry-level variants are logged and the offending entry skipped.
#[derive(Debug, Error)]
pub enum ExtractError {
    /// Document text is not valid JSON.
    #[error("Document is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// A requirement entry is not a JSON object.
    #[error("Requirement {index} is not an object")]
    NotAnObject {
        /// Position within the requirement list
        index: usize,
    },

    /// A requirement entry carries no control identifier.
    #[error("Requirement {index} has no control-id")]
    MissingControlId {
        /// Position within the requirement list
        index: usize,
    },

    /// A control identifier appears twice in one document.
    #[error("Duplicate control-id {control_id} at requirement {index}")]
    DuplicateControlId {
        /// The repeated identifier
        control_id: String,
        /// Position of the repeat
        index: usize,
    },
}

/// Parses document text into a JSON tree.
///
/// # Errors
///
/// Returns `ExtractError::Json` when the text is not JSON.
pub fn parse_document(text: &str) -> Result<serde_json::Value> {
    Ok(serde_json::from_str(text)?)
}
