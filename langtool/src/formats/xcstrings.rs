//! Support for Apple `.xcstrings` string catalogs.
//!
//! Two entry shapes are read: the current one, where the source text is just
//! another entry of `localizations`, and an older one that carries the source
//! text in a separate `source.stringUnit`. Only the current shape is written.

use std::{collections::BTreeMap, io::Write};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{
    error::Error,
    formats::LocalizationFormat,
    traits::Parser,
    types::{Catalog, CatalogEntry},
};

const SHOULD_TRANSLATE: &str = "should_translate";
const IS_COMMENT_AUTO_GENERATED: &str = "is_comment_auto_generated";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Format {
    pub source_language: String,
    pub strings: BTreeMap<String, Item>,
    pub version: String,
}

impl Parser for Format {
    const FORMAT: LocalizationFormat = LocalizationFormat::Xcstrings;

    /// Parses the xcstrings JSON document.
    fn parse(bytes: &[u8], origin: &str) -> Result<Self, Error> {
        serde_json::from_slice(bytes)
            .map_err(|e| Error::decode(LocalizationFormat::Xcstrings, origin, e))
    }

    /// Serializes the xcstrings format to a writer.
    fn to_writer<W: Write>(&self, writer: W) -> Result<(), Error> {
        serde_json::to_writer_pretty(writer, &self)
            .map_err(|e| Error::encode(LocalizationFormat::Xcstrings, e))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Item {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extraction_state: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_comment_auto_generated: Option<bool>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub localizations: BTreeMap<String, Localization>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub should_translate: Option<bool>,
    /// Older catalogs keep the source-language text here instead of in `localizations`.
    #[serde(default, skip_serializing)]
    pub source: Option<Localization>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Localization {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub string_unit: Option<StringUnit>,
}

impl From<StringUnit> for Localization {
    fn from(string_unit: StringUnit) -> Self {
        Localization {
            string_unit: Some(string_unit),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct StringUnit {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    pub value: String,
}

impl Format {
    /// Builds the canonical xcstrings document for a catalog.
    pub fn from_catalog(catalog: &Catalog) -> Self {
        let strings = catalog
            .entries
            .values()
            .map(|entry| (entry.key.clone(), Item::from_entry(entry)))
            .collect();

        Format {
            source_language: catalog.source_language.clone(),
            strings,
            version: catalog.version.clone(),
        }
    }

    /// Converts into the normalized catalog, folding the legacy `source`
    /// field into the source language's translation.
    pub fn into_catalog(self) -> Catalog {
        let mut catalog = Catalog::new(self.source_language);
        catalog.version = self.version;

        for (key, item) in self.strings {
            if key.is_empty() {
                debug!("skipping xcstrings entry with an empty key");
                continue;
            }
            let entry = item.into_entry(key, &catalog.source_language);
            catalog.entries.insert(entry.key.clone(), entry);
        }
        catalog
    }
}

impl Item {
    fn from_entry(entry: &CatalogEntry) -> Self {
        let localizations = entry
            .translations
            .iter()
            .map(|(language, value)| {
                let unit = StringUnit {
                    state: entry.states.get(language).cloned(),
                    value: value.clone(),
                };
                (language.clone(), Localization::from(unit))
            })
            .collect();

        Item {
            comment: entry.comment.clone(),
            extraction_state: entry.extraction_state.clone(),
            is_comment_auto_generated: entry
                .custom
                .get(IS_COMMENT_AUTO_GENERATED)
                .and_then(|s| s.parse().ok()),
            localizations,
            should_translate: entry
                .custom
                .get(SHOULD_TRANSLATE)
                .and_then(|s| s.parse().ok()),
            source: None,
        }
    }

    fn into_entry(self, key: String, source_language: &str) -> CatalogEntry {
        let mut entry = CatalogEntry::new(key);
        entry.comment = self.comment;
        entry.extraction_state = self.extraction_state;

        if let Some(flag) = self.should_translate {
            entry.custom.insert(SHOULD_TRANSLATE.into(), flag.to_string());
        }
        if let Some(flag) = self.is_comment_auto_generated {
            entry
                .custom
                .insert(IS_COMMENT_AUTO_GENERATED.into(), flag.to_string());
        }

        for (language, localization) in self.localizations {
            match localization.string_unit {
                Some(unit) => {
                    if let Some(state) = unit.state {
                        entry.states.insert(language.clone(), state);
                    }
                    entry.translations.insert(language, unit.value);
                }
                // Plural/device variations have no single value to carry.
                None => debug!(key = %entry.key, %language, "skipping localization without stringUnit"),
            }
        }

        if let Some(unit) = self.source.and_then(|source| source.string_unit) {
            if !entry.translations.contains_key(source_language) {
                if let Some(state) = unit.state {
                    entry.states.insert(source_language.to_string(), state);
                }
                entry
                    .translations
                    .insert(source_language.to_string(), unit.value);
            }
        }

        entry
    }
}
