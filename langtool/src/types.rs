//! Core, format-agnostic types for langtool.
//! Codecs decode into these; encoders serialize these.

use std::{
    collections::{BTreeMap, BTreeSet},
    fmt::Display,
    str::FromStr,
};

use serde::{Deserialize, Serialize};

use crate::error::Error;

/// Default xcstrings schema version written for catalogs that never had one.
pub const DEFAULT_VERSION: &str = "1.0";

/// Language assumed for single-language files that carry no language marker.
pub const DEFAULT_SOURCE_LANGUAGE: &str = "en";

/// The normalized, in-memory form of a localization file.
///
/// A catalog is built fresh by a codec for every conversion run, enriched by
/// the merge step, and consumed once by an encoder.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Catalog {
    /// The authoritative language whose text is the input to translation.
    pub source_language: String,

    /// Schema version, only meaningful for `.xcstrings`.
    pub version: String,

    /// All entries, keyed by their identifier.
    pub entries: BTreeMap<String, CatalogEntry>,

    /// `@`-prefixed ARB metadata, kept verbatim (key includes the `@`).
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    #[serde(default)]
    pub annotations: BTreeMap<String, serde_json::Value>,
}

impl Catalog {
    pub fn new(source_language: impl Into<String>) -> Self {
        Catalog {
            source_language: source_language.into(),
            version: DEFAULT_VERSION.to_string(),
            entries: BTreeMap::new(),
            annotations: BTreeMap::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn get(&self, key: &str) -> Option<&CatalogEntry> {
        self.entries.get(key)
    }

    pub fn get_mut(&mut self, key: &str) -> Option<&mut CatalogEntry> {
        self.entries.get_mut(key)
    }

    /// Inserts an entry, replacing any entry with the same key.
    ///
    /// Empty keys are rejected: every key in a catalog addresses a real unit.
    pub fn insert(&mut self, entry: CatalogEntry) -> Result<(), Error> {
        if entry.key.is_empty() {
            return Err(Error::validation_error("catalog keys must not be empty"));
        }
        self.entries.insert(entry.key.clone(), entry);
        Ok(())
    }

    /// Convenience for single-value inserts and merges into existing entries.
    pub fn set_translation(
        &mut self,
        key: &str,
        language: &str,
        value: impl Into<String>,
    ) -> Result<(), Error> {
        if key.is_empty() {
            return Err(Error::validation_error("catalog keys must not be empty"));
        }
        self.entries
            .entry(key.to_string())
            .or_insert_with(|| CatalogEntry::new(key))
            .translations
            .insert(language.to_string(), value.into());
        Ok(())
    }

    /// Every language that has a value (possibly empty) for at least one entry.
    pub fn languages(&self) -> BTreeSet<String> {
        self.entries
            .values()
            .flat_map(|entry| entry.translations.keys().cloned())
            .collect()
    }

    /// The `@key` ARB annotation belonging to a data key, if any.
    pub fn annotation_for(&self, key: &str) -> Option<&serde_json::Value> {
        self.annotations.get(&format!("@{}", key))
    }

    /// The source-language text of an entry, when present and non-empty.
    pub fn source_value<'a>(&self, entry: &'a CatalogEntry) -> Option<&'a str> {
        entry
            .translations
            .get(&self.source_language)
            .map(String::as_str)
            .filter(|value| !value.is_empty())
    }
}

/// A single translatable unit and all its known translations.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct CatalogEntry {
    /// Unique identifier of this unit. For `.strings`, ARB and JSON it is the
    /// left-hand key; for `.xcstrings` the key of the `strings` map.
    pub key: String,

    /// Language code → translated value.
    pub translations: BTreeMap<String, String>,

    /// Developer note carried through from the source format.
    #[serde(skip_serializing_if = "Option::is_none")]
    #[serde(default)]
    pub comment: Option<String>,

    /// xcstrings `extractionState` (e.g. `manual`, `stale`).
    #[serde(skip_serializing_if = "Option::is_none")]
    #[serde(default)]
    pub extraction_state: Option<String>,

    /// xcstrings per-localization `stringUnit.state` (e.g. `translated`, `needs_review`).
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    #[serde(default)]
    pub states: BTreeMap<String, String>,

    /// Any additional, format-specific flags attached to this entry.
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    #[serde(default)]
    pub custom: BTreeMap<String, String>,
}

impl CatalogEntry {
    pub fn new(key: impl Into<String>) -> Self {
        CatalogEntry {
            key: key.into(),
            translations: BTreeMap::new(),
            comment: None,
            extraction_state: None,
            states: BTreeMap::new(),
            custom: BTreeMap::new(),
        }
    }

    pub fn with_translation(mut self, language: impl Into<String>, value: impl Into<String>) -> Self {
        self.translations.insert(language.into(), value.into());
        self
    }

    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = Some(comment.into());
        self
    }

    pub fn translation(&self, language: &str) -> Option<&str> {
        self.translations.get(language).map(String::as_str)
    }
}

impl Display for CatalogEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "CatalogEntry {{ key: {}, languages: {} }}",
            self.key,
            self.translations
                .keys()
                .cloned()
                .collect::<Vec<_>>()
                .join(", ")
        )
    }
}

/// Target platform of a conversion. Decides the accepted input files and
/// the output convention.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PlatformType {
    /// Apple platforms: `.strings` or `.xcstrings`.
    Ios,
    /// Flutter: `.arb`.
    Flutter,
    /// Electron / web: flat `.json` catalogs.
    Electron,
}

impl PlatformType {
    /// File extensions (lowercase, without dot) this platform reads.
    pub fn accepted_extensions(&self) -> &'static [&'static str] {
        match self {
            PlatformType::Ios => &["strings", "xcstrings"],
            PlatformType::Flutter => &["arb"],
            PlatformType::Electron => &["json"],
        }
    }
}

impl Display for PlatformType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PlatformType::Ios => write!(f, "ios"),
            PlatformType::Flutter => write!(f, "flutter"),
            PlatformType::Electron => write!(f, "electron"),
        }
    }
}

impl FromStr for PlatformType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "ios" | "apple" | "macos" => Ok(PlatformType::Ios),
            "flutter" => Ok(PlatformType::Flutter),
            "electron" | "web" => Ok(PlatformType::Electron),
            other => Err(Error::validation_error(format!(
                "Unknown platform: '{}'. Supported platforms: ios, flutter, electron",
                other
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_rejects_empty_key() {
        let mut catalog = Catalog::new("en");
        assert!(catalog.insert(CatalogEntry::new("")).is_err());
        assert!(catalog.set_translation("", "fr", "x").is_err());
        assert!(catalog.is_empty());
    }

    #[test]
    fn test_set_translation_creates_and_updates() {
        let mut catalog = Catalog::new("en");
        catalog.set_translation("hello", "en", "Hello").unwrap();
        catalog.set_translation("hello", "fr", "Bonjour").unwrap();
        let entry = catalog.get("hello").unwrap();
        assert_eq!(entry.translation("en"), Some("Hello"));
        assert_eq!(entry.translation("fr"), Some("Bonjour"));
        assert_eq!(
            catalog.languages().into_iter().collect::<Vec<_>>(),
            vec!["en".to_string(), "fr".to_string()]
        );
    }

    #[test]
    fn test_source_value_ignores_empty() {
        let mut catalog = Catalog::new("en");
        catalog
            .insert(CatalogEntry::new("blank").with_translation("en", ""))
            .unwrap();
        let entry = catalog.get("blank").unwrap();
        assert_eq!(catalog.source_value(entry), None);
    }

    #[test]
    fn test_annotation_lookup_uses_at_prefix() {
        let mut catalog = Catalog::new("en");
        catalog.annotations.insert(
            "@title".into(),
            serde_json::json!({"description": "Page title"}),
        );
        assert!(catalog.annotation_for("title").is_some());
        assert!(catalog.annotation_for("missing").is_none());
    }

    #[test]
    fn test_platform_from_str() {
        assert_eq!("iOS".parse::<PlatformType>().unwrap(), PlatformType::Ios);
        assert_eq!(
            " flutter ".parse::<PlatformType>().unwrap(),
            PlatformType::Flutter
        );
        assert_eq!(
            "ELECTRON".parse::<PlatformType>().unwrap(),
            PlatformType::Electron
        );
        assert!("android".parse::<PlatformType>().is_err());
    }

    #[test]
    fn test_platform_accepted_extensions() {
        assert_eq!(
            PlatformType::Ios.accepted_extensions(),
            &["strings", "xcstrings"]
        );
        assert_eq!(PlatformType::Flutter.accepted_extensions(), &["arb"]);
        assert_eq!(PlatformType::Electron.accepted_extensions(), &["json"]);
    }
}
