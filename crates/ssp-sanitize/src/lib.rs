//! # SSP Sanitize - Pattern-Safe Document Output
//!
//! The sanitizer is the last stage every document passes through before it
//! leaves the reconciliation engine. OSCAL constrains every string to the
//! pattern `^\S(.*\S)?$`; documents assembled from years of user input
//! routinely violate it with stray padding, blank optional fields and empty
//! containers.
//!
//! ## Purpose
//!
//! This crate implements two layered capabilities:
//!
//! 1. **String Sanitizer** - Trims a single value to the pattern, substituting
//!    a placeholder for genuinely empty input and never discarding content.
//!
//! 2. **Tree Sanitizer** - Walks an arbitrary JSON tree, sanitizing every
//!    string leaf and pruning empty sequences and mappings, except for an
//!    allow-list of containers the schema expects to find.
//!
//! ## Failure Modes Handled
//!
//! | Problem | Example | Handling |
//! |---------|---------|----------|
//! | Surrounding padding | `"  AC-1 "` | Trimmed |
//! | Invisible padding | `"\u{FEFF}AC-1\u{200B}"` | Stripped from both ends |
//! | Blank optional field | `"   "` | Placeholder or dropped |
//! | Multi-line prose | `"a\nb"` | Kept as is |
//! | Empty container | `"statements": []` | Dropped unless allow-listed |
//! | Half-empty annotation | `{"name": "", "value": "x"}` | Dropped, never defaulted |
//!
//! ## Architecture
//!
//! ```text
//! ┌────────────────────────────────────────────────────────┐
//! │                    TREE SANITIZER                      │
//! │                                                        │
//! │   mapping ──▶ sanitize values ──▶ drop / preserve keys │
//! │   sequence ─▶ sanitize items  ──▶ drop if empty        │
//! │   string ───┐                                          │
//! │             ▼                                          │
//! │   ┌──────────────────────────┐                         │
//! │   │    STRING SANITIZER      │                         │
//! │   │  trim ▶ trim ▶ verify    │                         │
//! │   │  placeholder if empty    │                         │
//! │   └──────────────────────────┘                         │
//! └────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```rust
//! use ssp_sanitize::{sanitize_document, SanitizeOptions};
//! use serde_json::json;
//!
//! let options = SanitizeOptions::default();
//! let doc = json!({
//!     "system-security-plan": {
//!         "metadata": { "title": " Example SSP " },
//!         "system-implementation": { "users": [] }
//!     }
//! });
//!
//! let clean = sanitize_document(&doc, &options);
//! assert_eq!(clean["system-security-plan"]["metadata"]["title"], "Example SSP");
//! assert_eq!(clean["system-security-plan"]["system-implementation"]["users"], json!([]));
//! ```

pub mod models;
pub mod text;
pub mod tree;

pub use models::{SanitizeError, SanitizeOptions, DEFAULT_PLACEHOLDER, DEFAULT_PRESERVE_EMPTY};
pub use text::{sanitize_scalar, sanitize_string, satisfies_pattern};
pub use tree::{sanitize_document, sanitize_value};
