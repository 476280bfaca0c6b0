//! Merging fetched translations into a catalog.
//!
//! Merge is a key-level upsert: values for a `(key, language)` pair replace
//! whatever was there, unknown keys become new entries, and nothing besides
//! the value is touched (comments, extraction state and per-language state
//! stay as they were).

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::types::{Catalog, CatalogEntry};

/// `key -> (language -> translated text)`.
pub type TranslationSet = BTreeMap<String, BTreeMap<String, String>>;

/// Counters describing what a merge changed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MergeReport {
    /// Values written for a language the entry did not have yet.
    pub inserted: usize,
    /// Existing values replaced by a different text.
    pub updated: usize,
    /// Values identical to what the entry already had.
    pub unchanged: usize,
    /// Entries created because their key was unknown.
    pub created_entries: usize,
    /// Source-language values left alone.
    pub skipped_source: usize,
}

impl MergeReport {
    /// Number of values that differ from before the merge.
    pub fn changed(&self) -> usize {
        self.inserted + self.updated
    }
}

/// Upserts every `(key, language, text)` of `translations` into `catalog`.
///
/// An existing source-language value is never replaced; a key that has no
/// source value yet may receive one. Empty keys are ignored.
pub fn merge_translations(catalog: &mut Catalog, translations: &TranslationSet) -> MergeReport {
    let mut report = MergeReport::default();
    let source_language = catalog.source_language.clone();

    for (key, values) in translations {
        if key.is_empty() {
            debug!("ignoring translation for an empty key");
            continue;
        }
        if values.is_empty() {
            continue;
        }

        let entry = catalog.entries.entry(key.clone()).or_insert_with(|| {
            report.created_entries += 1;
            CatalogEntry::new(key.clone())
        });

        for (language, text) in values {
            if *language == source_language && entry.translations.contains_key(language) {
                report.skipped_source += 1;
                continue;
            }

            match entry.translations.get_mut(language) {
                Some(existing) if existing == text => report.unchanged += 1,
                Some(existing) => {
                    *existing = text.clone();
                    report.updated += 1;
                }
                None => {
                    entry.translations.insert(language.clone(), text.clone());
                    report.inserted += 1;
                }
            }
        }
    }

    info!(
        inserted = report.inserted,
        updated = report.updated,
        unchanged = report.unchanged,
        created = report.created_entries,
        "merged translations"
    );
    report
}
