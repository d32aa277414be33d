//! # Catalog Provenance
//!
//! Recovers which catalog release a document was generated against. Older
//! exports recorded this inconsistently, so the catalog URL is searched in
//! three tiers, most specific first:
//!
//! | Tier | Source |
//! |------|--------|
//! | 1 | `metadata.links[]` with `rel` of `source-profile`, `profile` or `import` |
//! | 2 | any `metadata.links[]` whose `href` contains a version-like token |
//! | 3 | `import-profile.href` |
//!
//! A version token is then parsed out of the resolved URL with three
//! successively looser patterns; the first one that matches wins.

use crate::catalog::catalog_body;
use crate::controls::ssp_root;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::OnceLock;
use tracing::debug;

/// Link relations that name the catalog or profile a document derives from.
pub const PROVENANCE_RELATIONS: &[&str] = &["source-profile", "profile", "import"];

/// Catalog provenance recovered from one document.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CatalogProvenance {
    /// Resolved catalog or profile URL; empty when none was found.
    pub catalog_url: String,

    /// Version token parsed from `catalog_url`; empty when none matched.
    pub catalog_version: String,

    /// `metadata.oscal-version` of the document.
    pub oscal_version: String,

    /// `metadata.version` of the document.
    pub document_version: String,
}

fn version_patterns() -> &'static [Regex; 3] {
    static PATTERNS: OnceLock<[Regex; 3]> = OnceLock::new();
    PATTERNS.get_or_init(|| {
        [
            Regex::new(r"/v?(\d+\.\d+\.\d+)/").expect("path version regex must compile"),
            Regex::new(r"[/_-]v?(\d+\.\d+(?:\.\d+)?)")
                .expect("delimited version regex must compile"),
            Regex::new(r"(\d+(?:\.\d+)+)").expect("loose version regex must compile"),
        ]
    })
}

/// Parses a catalog version token out of a URL.
///
/// Tries a path-embedded `major.minor.patch` segment first, then a version
/// after a `/`, `_` or `-` delimiter, then any dotted number.
///
/// # Example
///
/// ```rust
/// use ssp_extract::provenance::parse_version;
///
/// assert_eq!(
///     parse_version("https://example.org/oscal/v5.1.1/catalog.json").as_deref(),
///     Some("5.1.1")
/// );
/// assert_eq!(parse_version("NIST_SP-800-53_rev5-v5.2_catalog.json").as_deref(), Some("5.2"));
/// assert_eq!(parse_version("catalog.json"), None);
/// ```
pub fn parse_version(url: &str) -> Option<String> {
    version_patterns()
        .iter()
        .find_map(|pattern| pattern.captures(url))
        .and_then(|captures| captures.get(1))
        .map(|token| token.as_str().to_string())
}

/// Recovers catalog provenance from a document of any supported shape.
pub fn extract_provenance(document: &Value) -> CatalogProvenance {
    let root = ssp_root(document);
    let metadata = root.get("metadata");
    let metadata_text = |key: &str| {
        metadata
            .and_then(|m| m.get(key))
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string()
    };

    let catalog_url = resolve_catalog_url(root).unwrap_or_default();
    let catalog_version = parse_version(&catalog_url).unwrap_or_default();

    debug!(url = %catalog_url, version = %catalog_version, "Recovered catalog provenance");

    CatalogProvenance {
        catalog_url,
        catalog_version,
        oscal_version: metadata_text("oscal-version"),
        document_version: metadata_text("version"),
    }
}

/// Where a catalog document says it is published.
///
/// Reads the catalog's own `metadata.links[]`: a `canonical` link first,
/// then any link whose `href` carries a version token.
///
/// # Returns
///
/// `None` when the catalog names no published location.
pub fn catalog_location(document: &Value) -> Option<String> {
    let links: Vec<(&str, &str)> = catalog_body(document)?
        .pointer("/metadata/links")?
        .as_array()?
        .iter()
        .filter_map(|link| {
            let href = link.get("href")?.as_str()?.trim();
            let rel = link.get("rel").and_then(Value::as_str).unwrap_or_default();
            (!href.is_empty()).then_some((rel, href))
        })
        .collect();

    links
        .iter()
        .find(|(rel, _)| *rel == "canonical")
        .or_else(|| links.iter().find(|(_, href)| parse_version(href).is_some()))
        .map(|(_, href)| href.to_string())
}

fn resolve_catalog_url(root: &Value) -> Option<String> {
    let links: Vec<(&str, &str)> = root
        .pointer("/metadata/links")
        .and_then(Value::as_array)
        .into_iter()
        .flatten()
        .filter_map(|link| {
            let href = link.get("href")?.as_str()?.trim();
            let rel = link.get("rel").and_then(Value::as_str).unwrap_or_default();
            (!href.is_empty()).then_some((rel, href))
        })
        .collect();

    let by_relation = links
        .iter()
        .find(|(rel, _)| PROVENANCE_RELATIONS.contains(rel))
        .map(|(_, href)| *href);

    let by_version = || {
        links
            .iter()
            .find(|(_, href)| parse_version(href).is_some())
            .map(|(_, href)| *href)
    };

    let by_import = || {
        root.pointer("/import-profile/href")
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|href| !href.is_empty())
    };

    by_relation
        .or_else(by_version)
        .or_else(by_import)
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_relation_link_wins() {
        let doc = json!({
            "system-security-plan": {
                "metadata": {
                    "version": "2.0",
                    "oscal-version": "1.1.2",
                    "links": [
                        { "href": "https://example.org/docs/v9.9.9/readme", "rel": "reference" },
                        { "href": "https://example.org/rev5/v5.1.1/profile.json", "rel": "source-profile" }
                    ]
                },
                "import-profile": { "href": "https://example.org/v1.0.0/legacy.json" }
            }
        });

        let provenance = extract_provenance(&doc);
        assert_eq!(provenance.catalog_url, "https://example.org/rev5/v5.1.1/profile.json");
        assert_eq!(provenance.catalog_version, "5.1.1");
        assert_eq!(provenance.oscal_version, "1.1.2");
        assert_eq!(provenance.document_version, "2.0");
    }

    #[test]
    fn test_version_like_link_is_second_tier() {
        let doc = json!({
            "metadata": {
                "links": [
                    { "href": "https://example.org/about" },
                    { "href": "https://example.org/catalog_v4.0.json", "rel": "related" }
                ]
            },
            "import-profile": { "href": "https://example.org/v1.0.0/legacy.json" }
        });

        let provenance = extract_provenance(&doc);
        assert_eq!(provenance.catalog_url, "https://example.org/catalog_v4.0.json");
        assert_eq!(provenance.catalog_version, "4.0");
    }

    #[test]
    fn test_import_profile_is_last_resort() {
        let doc = json!({
            "system-security-plan": {
                "metadata": { "links": [{ "href": "https://example.org/about" }] },
                "import-profile": { "href": "https://example.org/v1.0.0/legacy.json" }
            }
        });

        let provenance = extract_provenance(&doc);
        assert_eq!(provenance.catalog_url, "https://example.org/v1.0.0/legacy.json");
        assert_eq!(provenance.catalog_version, "1.0.0");
    }

    #[test]
    fn test_nothing_found() {
        assert_eq!(extract_provenance(&json!({})), CatalogProvenance::default());
    }

    #[test]
    fn test_pattern_precedence() {
        // Path-embedded triple beats an earlier delimited pair.
        assert_eq!(parse_version("x-2.1/a/3.4.5/b").as_deref(), Some("3.4.5"));
        // Delimited pair beats an earlier bare number.
        assert_eq!(parse_version("rev10.2_v5.0").as_deref(), Some("5.0"));
        // Loose fallback.
        assert_eq!(parse_version("catalog5.1").as_deref(), Some("5.1"));
    }

    #[test]
    fn test_catalog_location_prefers_canonical_link() {
        let catalog = json!({
            "catalog": {
                "metadata": {
                    "links": [
                        { "href": "https://example.org/v5.1.1/catalog.xml", "rel": "alternate" },
                        { "href": "https://example.org/catalog.json", "rel": "canonical" }
                    ]
                },
                "controls": []
            }
        });
        assert_eq!(
            catalog_location(&catalog).as_deref(),
            Some("https://example.org/catalog.json")
        );
    }

    #[test]
    fn test_catalog_location_falls_back_to_versioned_link() {
        let catalog = json!({
            "catalog": {
                "metadata": { "links": [{ "href": "https://example.org/v5.1.1/catalog.xml", "rel": "alternate" }] },
                "controls": []
            }
        });
        assert_eq!(
            catalog_location(&catalog).as_deref(),
            Some("https://example.org/v5.1.1/catalog.xml")
        );
        assert_eq!(catalog_location(&json!({ "catalog": { "metadata": {}, "controls": [] } })), None);
        assert_eq!(catalog_location(&json!({ "controls-elsewhere": [] })), None);
    }
}
