//! Batching of catalog texts for machine translation.
//!
//! The actual service call sits behind [`Translator`]. This module decides
//! which texts to send, splits them into batches, checks what comes back and
//! maps results onto catalog keys as a [`TranslationSet`].

use std::collections::BTreeMap;

use lazy_static::lazy_static;
use regex::Regex;
use tracing::{debug, info};

use crate::{error::Error, merge::TranslationSet, types::Catalog};

/// Default number of texts sent in one translator call.
pub const DEFAULT_BATCH_SIZE: usize = 50;

lazy_static! {
    static ref FENCE_REGEX: Regex = Regex::new(r"(?s)```[a-zA-Z]*\s*\n(.*?)\n?```").unwrap();
}

/// A machine-translation backend.
///
/// Implementations receive an ordered list of texts and must return exactly
/// one translation per text, in the same order.
pub trait Translator: Send + Sync {
    fn translate(&self, texts: &[String], source: &str, target: &str) -> Result<Vec<String>, Error>;
}

/// Options for [`fetch_language`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchOptions {
    /// Maximum number of texts per translator call. Zero is treated as one.
    pub batch_size: usize,
    /// Skip keys that already have a non-empty value in the target language.
    pub only_missing: bool,
}

impl Default for FetchOptions {
    fn default() -> Self {
        FetchOptions {
            batch_size: DEFAULT_BATCH_SIZE,
            only_missing: false,
        }
    }
}

/// The texts to translate for one catalog and the keys each text serves.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TranslationPlan {
    /// Unique texts in first-seen key order.
    pub texts: Vec<String>,
    /// Text -> every key whose source text it is.
    pub keys_by_text: BTreeMap<String, Vec<String>>,
}

impl TranslationPlan {
    /// Builds the plan for a catalog.
    ///
    /// An entry's text is its non-empty source value, or the key itself when
    /// the key is the text (projects keyed by Chinese source strings). With
    /// `only_missing_for`, entries that already have a non-empty value in that
    /// language are left out.
    pub fn from_catalog(catalog: &Catalog, only_missing_for: Option<&str>) -> Self {
        let mut plan = TranslationPlan::default();

        for entry in catalog.entries.values() {
            if let Some(target) = only_missing_for {
                if entry.translation(target).is_some_and(|v| !v.is_empty()) {
                    continue;
                }
            }

            let text = catalog
                .source_value(entry)
                .unwrap_or(entry.key.as_str())
                .to_string();
            let keys = plan.keys_by_text.entry(text.clone()).or_default();
            if keys.is_empty() {
                plan.texts.push(text);
            }
            keys.push(entry.key.clone());
        }
        plan
    }

    pub fn is_empty(&self) -> bool {
        self.texts.is_empty()
    }

    /// Number of catalog keys covered by the plan.
    pub fn key_count(&self) -> usize {
        self.keys_by_text.values().map(Vec::len).sum()
    }
}

/// Translates every planned text of `catalog` into `target`.
///
/// Batches are sent sequentially; the first failing batch aborts the fetch.
/// The result maps every covered key to `{target: translation}`.
pub fn fetch_language(
    catalog: &Catalog,
    translator: &dyn Translator,
    target: &str,
    options: &FetchOptions,
) -> Result<TranslationSet, Error> {
    let source = catalog.source_language.as_str();
    if target == source {
        return Err(Error::validation_error(format!(
            "target language `{}` is the source language",
            target
        )));
    }

    let plan = TranslationPlan::from_catalog(catalog, options.only_missing.then_some(target));
    let mut set = TranslationSet::new();
    if plan.is_empty() {
        debug!(target, "nothing to translate");
        return Ok(set);
    }

    let batch_size = options.batch_size.max(1);
    for (index, batch) in plan.texts.chunks(batch_size).enumerate() {
        debug!(target, batch = index, size = batch.len(), "sending batch");
        let translated = translator.translate(batch, source, target)?;
        if translated.len() != batch.len() {
            return Err(Error::translation(
                target,
                format!(
                    "expected {} translations, received {}",
                    batch.len(),
                    translated.len()
                ),
            ));
        }

        for (text, translation) in batch.iter().zip(translated) {
            for key in plan.keys_by_text.get(text).into_iter().flatten() {
                set.entry(key.clone())
                    .or_default()
                    .insert(target.to_string(), translation.clone());
            }
        }
    }

    info!(
        target,
        texts = plan.texts.len(),
        keys = plan.key_count(),
        "fetched translations"
    );
    Ok(set)
}

/// The user prompt sent to chat-style translation services.
pub fn build_prompt(texts: &[String], source: &str, target: &str) -> Result<String, Error> {
    let payload = serde_json::to_string_pretty(texts)?;
    Ok(format!(
        "Translate each string in the following JSON array from `{source}` to `{target}`.\n\
         Keep placeholders such as %@, %d, {{name}} and line breaks unchanged.\n\
         Reply with only a JSON array of {count} strings in the same order, without explanations.\n\n\
         {payload}",
        count = texts.len(),
    ))
}

/// Reads a chat reply back into one translation per requested text.
///
/// Accepts a JSON array of strings, optionally wrapped in a Markdown code
/// fence. Anything else is read as one translation per non-empty line.
pub fn parse_translation_response(
    response: &str,
    expected: usize,
    target: &str,
) -> Result<Vec<String>, Error> {
    let trimmed = response.trim();
    let body = FENCE_REGEX
        .captures(trimmed)
        .and_then(|captures| captures.get(1))
        .map(|m| m.as_str().trim())
        .unwrap_or(trimmed);

    let translations = match serde_json::from_str::<Vec<String>>(body) {
        Ok(values) => values,
        Err(_) => body
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(str::to_string)
            .collect(),
    };

    if translations.len() != expected {
        return Err(Error::translation(
            target,
            format!(
                "expected {} translations, received {}",
                expected,
                translations.len()
            ),
        ));
    }
    Ok(translations)
}
