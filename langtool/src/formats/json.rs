//! Support for flat JSON catalogs (`{"key": "value", ...}`), the convention
//! used by Electron and most web i18n loaders. One language per file.

use std::{collections::BTreeMap, io::Write};

use serde_json::Value;

use crate::{
    error::Error,
    formats::LocalizationFormat,
    traits::Parser,
    types::{Catalog, CatalogEntry},
};

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Format {
    pub values: BTreeMap<String, String>,
}

impl Parser for Format {
    const FORMAT: LocalizationFormat = LocalizationFormat::JsonCatalog;

    fn parse(bytes: &[u8], origin: &str) -> Result<Self, Error> {
        let value: Value = serde_json::from_slice(bytes)
            .map_err(|e| Error::decode(LocalizationFormat::JsonCatalog, origin, e))?;

        let Value::Object(object) = value else {
            return Err(Error::decode(
                LocalizationFormat::JsonCatalog,
                origin,
                "top-level value must be a JSON object",
            ));
        };

        let values = object
            .into_iter()
            .map(|(key, value)| match value {
                Value::String(text) => Ok((key, text)),
                _ => Err(Error::decode(
                    LocalizationFormat::JsonCatalog,
                    origin,
                    format!("value of `{}` must be a string", key),
                )),
            })
            .collect::<Result<BTreeMap<_, _>, _>>()?;

        Ok(Format { values })
    }

    fn to_writer<W: Write>(&self, writer: W) -> Result<(), Error> {
        serde_json::to_writer_pretty(writer, &self.values)
            .map_err(|e| Error::encode(LocalizationFormat::JsonCatalog, e))
    }
}

impl Format {
    pub fn from_catalog(catalog: &Catalog, language: &str) -> Self {
        let values = catalog
            .entries
            .values()
            .filter_map(|entry| {
                entry
                    .translation(language)
                    .map(|text| (entry.key.clone(), text.to_string()))
            })
            .collect();
        Format { values }
    }

    /// Converts into a single-language catalog; the file itself names no language.
    pub fn into_catalog(self, language: &str) -> Catalog {
        let mut catalog = Catalog::new(language);
        for (key, text) in self.values.into_iter().filter(|(key, _)| !key.is_empty()) {
            let entry = CatalogEntry::new(key.clone()).with_translation(language, text);
            catalog.entries.insert(key, entry);
        }
        catalog
    }
}
