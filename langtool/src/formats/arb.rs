//! Support for Flutter Application Resource Bundle (`.arb`) files.
//!
//! An ARB file is a flat JSON object. Keys starting with `@` are metadata:
//! `@@locale` and other `@@` keys describe the file, `@key` describes the
//! data key `key`. Metadata never becomes a catalog entry but is carried in
//! [`Catalog::annotations`] and written back next to its data key.

use std::io::Write;

use serde_json::{Map, Value};
use tracing::debug;

use crate::{
    error::Error,
    formats::LocalizationFormat,
    traits::Parser,
    types::{Catalog, CatalogEntry},
};

const LOCALE_KEY: &str = "@@locale";

/// Represents one `.arb` file, in file order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Format {
    pub values: Map<String, Value>,
}

impl Parser for Format {
    const FORMAT: LocalizationFormat = LocalizationFormat::Arb;

    fn parse(bytes: &[u8], origin: &str) -> Result<Self, Error> {
        let value: Value = serde_json::from_slice(bytes)
            .map_err(|e| Error::decode(LocalizationFormat::Arb, origin, e))?;

        let Value::Object(values) = value else {
            return Err(Error::decode(
                LocalizationFormat::Arb,
                origin,
                "top-level value must be a JSON object",
            ));
        };

        if let Some((key, _)) = values
            .iter()
            .find(|(key, value)| !key.starts_with('@') && !value.is_string())
        {
            return Err(Error::decode(
                LocalizationFormat::Arb,
                origin,
                format!("value of `{}` must be a string", key),
            ));
        }

        Ok(Format { values })
    }

    fn to_writer<W: Write>(&self, writer: W) -> Result<(), Error> {
        serde_json::to_writer_pretty(writer, &self.values)
            .map_err(|e| Error::encode(LocalizationFormat::Arb, e))
    }
}

impl Format {
    /// The `@@locale` declared by the file, if any.
    pub fn locale(&self) -> Option<&str> {
        self.values.get(LOCALE_KEY).and_then(Value::as_str)
    }

    /// Converts into a single-language catalog. `@@locale` decides the
    /// language when present, `fallback_language` otherwise; it is carried
    /// by [`Catalog::source_language`] rather than as an annotation.
    pub fn into_catalog(self, fallback_language: &str) -> Catalog {
        let language = self.locale().unwrap_or(fallback_language).to_string();
        let mut catalog = Catalog::new(language.clone());

        for (key, value) in self.values {
            if key == LOCALE_KEY {
                continue;
            }
            if key.starts_with('@') {
                catalog.annotations.insert(key, value);
                continue;
            }
            if key.is_empty() {
                debug!("skipping ARB entry with an empty key");
                continue;
            }
            if let Value::String(text) = value {
                let entry = CatalogEntry::new(key.clone()).with_translation(&language, text);
                catalog.entries.insert(key, entry);
            }
        }
        catalog
    }

    /// Builds the `.arb` file for one language of a catalog.
    ///
    /// `@@locale` is always written first and set to `language`, followed by
    /// any other file-level `@@` metadata. Each `@key` follows its data key,
    /// and metadata whose data key is not written is appended at the end.
    pub fn from_catalog(catalog: &Catalog, language: &str) -> Self {
        let mut values = Map::new();
        values.insert(LOCALE_KEY.to_string(), Value::String(language.to_string()));

        for (key, value) in catalog
            .annotations
            .iter()
            .filter(|(k, _)| k.starts_with("@@") && *k != LOCALE_KEY)
        {
            values.insert(key.clone(), value.clone());
        }

        for entry in catalog.entries.values() {
            let Some(text) = entry.translation(language) else {
                continue;
            };
            values.insert(entry.key.clone(), Value::String(text.to_string()));
            if let Some(annotation) = catalog.annotation_for(&entry.key) {
                values.insert(format!("@{}", entry.key), annotation.clone());
            }
        }

        for (key, value) in &catalog.annotations {
            if !values.contains_key(key) {
                values.insert(key.clone(), value.clone());
            }
        }

        Format { values }
    }
}
