//! # Sanitization Options and Errors
//!
//! Shared types for the string and tree sanitizers. The options travel with
//! every call so the sanitizers remain pure functions with no global state.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Placeholder substituted for genuinely empty optional strings.
pub const DEFAULT_PLACEHOLDER: &str = "N/A";

/// Keys kept as empty sequences even when they carry no content.
///
/// These are the OSCAL containers that downstream validation expects to find
/// on the document, even when a system has recorded nothing for them yet.
pub const DEFAULT_PRESERVE_EMPTY: &[&str] = &[
    "implemented-requirements",
    "components",
    "users",
    "inventory-items",
    "parties",
];

/// Options controlling string and tree sanitization.
///
/// # Fields
///
/// - `placeholder`: Token emitted for blank strings when `use_default` is set
/// - `use_default`: Whether blank strings become the placeholder or are dropped
/// - `preserve_empty`: Allow-listed keys that survive as empty sequences
///
/// # Example
///
/// ```rust
/// use ssp_sanitize::SanitizeOptions;
///
/// let options = SanitizeOptions::default().with_use_default(false);
/// assert!(!options.use_default);
/// assert!(options.is_preserved("implemented-requirements"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SanitizeOptions {
    /// Token substituted for blank input.
    pub placeholder: String,

    /// Substitute the placeholder instead of dropping blank strings.
    pub use_default: bool,

    /// Keys preserved as empty sequences.
    pub preserve_empty: Vec<String>,
}

impl Default for SanitizeOptions {
    fn default() -> Self {
        Self {
            placeholder: DEFAULT_PLACEHOLDER.to_string(),
            use_default: true,
            preserve_empty: DEFAULT_PRESERVE_EMPTY
                .iter()
                .map(|key| key.to_string())
                .collect(),
        }
    }
}

impl SanitizeOptions {
    /// Set whether blank strings become the placeholder.
    pub fn with_use_default(mut self, use_default: bool) -> Self {
        self.use_default = use_default;
        self
    }

    /// Replace the placeholder token.
    pub fn with_placeholder(mut self, placeholder: impl Into<String>) -> Self {
        self.placeholder = placeholder.into();
        self
    }

    /// Add a key to the preserve-empty allow-list.
    pub fn preserve(mut self, key: impl Into<String>) -> Self {
        let key = key.into();
        if !self.preserve_empty.contains(&key) {
            self.preserve_empty.push(key);
        }
        self
    }

    /// Whether `key` is in the preserve-empty allow-list.
    pub fn is_preserved(&self, key: &str) -> bool {
        self.preserve_empty.iter().any(|k| k == key)
    }

    /// Checks that the placeholder itself satisfies the string pattern.
    ///
    /// A placeholder that fails the pattern would make every defaulted field
    /// invalid, so this is rejected up front.
    ///
    /// # Errors
    ///
    /// Returns `SanitizeError::InvalidPlaceholder` when the placeholder is
    /// empty or carries surrounding whitespace.
    pub fn validate(&self) -> Result<(), SanitizeError> {
        if crate::text::satisfies_pattern(&self.placeholder) {
            Ok(())
        } else {
            Err(SanitizeError::InvalidPlaceholder(self.placeholder.clone()))
        }
    }
}

/// Errors raised while configuring sanitization.
///
/// Sanitizing content never fails; only invalid configuration is reported.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SanitizeError {
    /// The configured placeholder does not satisfy the string pattern.
    #[error("Placeholder {0:?} does not satisfy the non-empty, trimmed string pattern")]
    InvalidPlaceholder(String),
}
