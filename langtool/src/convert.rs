//! The conversion pipeline: read, translate, merge, write, export.
//!
//! A [`ConversionRequest`] is what a caller asks for. [`ConversionPlan::resolve`]
//! validates it without touching the input file, and [`run_conversion`]
//! executes the plan stage by stage, each stage completing before the next.

use std::{
    collections::BTreeSet,
    fmt::Display,
    path::{Path, PathBuf},
    str::FromStr,
};

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::{
    codec,
    error::Error,
    formats::LocalizationFormat,
    merge::{MergeReport, TranslationSet, merge_translations},
    paths::{OutputLayout, normalize_languages, resolve_format, write_outputs},
    translate::{DEFAULT_BATCH_SIZE, FetchOptions, Translator, fetch_language},
    types::{Catalog, PlatformType},
};

/// Side exports produced next to the converted output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    Csv,
}

impl ExportFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Csv => "csv",
        }
    }
}

impl Display for ExportFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.extension())
    }
}

impl FromStr for ExportFormat {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "csv" => Ok(ExportFormat::Csv),
            other => Err(Error::validation_error(format!(
                "Unknown export format: '{}'. Supported formats: csv",
                other
            ))),
        }
    }
}

/// Everything a caller chooses for one conversion run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversionRequest {
    pub platform: PlatformType,
    pub input: PathBuf,
    /// Output file (`.xcstrings`) or directory (one file per language).
    /// Must be omitted when `sync_to_source` is set.
    pub output: Option<PathBuf>,
    /// Target languages.
    pub languages: Vec<String>,
    /// Write back next to (or over, for `.xcstrings`) the input file.
    pub sync_to_source: bool,
    pub export: Option<ExportFormat>,
    /// Only translate keys that have no value in a target language yet.
    pub only_missing: bool,
    pub batch_size: usize,
}

impl ConversionRequest {
    pub fn new(platform: PlatformType, input: impl Into<PathBuf>) -> Self {
        ConversionRequest {
            platform,
            input: input.into(),
            output: None,
            languages: Vec::new(),
            sync_to_source: false,
            export: None,
            only_missing: false,
            batch_size: DEFAULT_BATCH_SIZE,
        }
    }

    pub fn with_output(mut self, output: impl Into<PathBuf>) -> Self {
        self.output = Some(output.into());
        self
    }

    pub fn with_languages<S: Into<String>>(mut self, languages: impl IntoIterator<Item = S>) -> Self {
        self.languages = languages.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_sync_to_source(mut self, sync: bool) -> Self {
        self.sync_to_source = sync;
        self
    }

    pub fn with_export(mut self, export: ExportFormat) -> Self {
        self.export = Some(export);
        self
    }
}

/// A validated request: codec, output layout and targets are all decided.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversionPlan {
    pub input: PathBuf,
    pub format: LocalizationFormat,
    pub layout: OutputLayout,
    pub languages: Vec<String>,
    /// Path of the CSV export, when requested.
    pub export: Option<PathBuf>,
    pub fetch: FetchOptions,
}

impl ConversionPlan {
    /// Validates a request. Fails with a validation error on a platform and
    /// extension mismatch, bad language codes, or an unusable output path.
    pub fn resolve(request: &ConversionRequest) -> Result<Self, Error> {
        let format = resolve_format(request.platform, &request.input)?;

        let languages = normalize_languages(&request.languages)?;
        if languages.is_empty() {
            return Err(Error::validation_error(
                "at least one target language is required",
            ));
        }

        let output = match (&request.output, request.sync_to_source) {
            (Some(_), true) => {
                return Err(Error::validation_error(
                    "an output path cannot be combined with syncing to the source file",
                ));
            }
            (Some(output), false) => output.clone(),
            (None, true) if format.is_multi_language() => request.input.clone(),
            (None, true) => parent_dir(&request.input),
            (None, false) => {
                return Err(Error::validation_error(
                    "an output path is required unless syncing to the source file",
                ));
            }
        };
        let layout = OutputLayout::for_output(format, &output)?;

        let export = request.export.map(|export| {
            let stem = request
                .input
                .file_stem()
                .map(|stem| stem.to_string_lossy().into_owned())
                .unwrap_or_else(|| "export".to_string());
            layout
                .directory()
                .join(format!("{}.{}", stem, export.extension()))
        });

        let plan = ConversionPlan {
            input: request.input.clone(),
            format,
            layout,
            languages,
            export,
            fetch: FetchOptions {
                batch_size: request.batch_size,
                only_missing: request.only_missing,
            },
        };
        debug!(?plan, "resolved conversion plan");
        Ok(plan)
    }
}

fn parent_dir(path: &Path) -> PathBuf {
    path.parent()
        .filter(|parent| !parent.as_os_str().is_empty())
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from("."))
}

/// Outcome of a successful conversion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversionReport {
    pub input: PathBuf,
    pub format: LocalizationFormat,
    /// Entries in the catalog after merging.
    pub entries: usize,
    pub languages: Vec<String>,
    pub written: Vec<PathBuf>,
    pub merge: MergeReport,
    pub export: Option<PathBuf>,
}

impl ConversionReport {
    /// One human-readable paragraph describing the run.
    pub fn summary(&self) -> String {
        let mut summary = format!(
            "Converted {} entries from {} into {} language(s) ({}); {} value(s) changed; wrote {}",
            self.entries,
            self.input.display(),
            self.languages.len(),
            self.languages.join(", "),
            self.merge.changed(),
            self.written
                .iter()
                .map(|path| path.display().to_string())
                .collect::<Vec<_>>()
                .join(", ")
        );
        if let Some(export) = &self.export {
            summary.push_str(&format!("; exported {}", export.display()));
        }
        summary
    }
}

/// Translates a catalog into each language in turn and combines the results.
pub fn fetch_languages(
    catalog: &Catalog,
    translator: &dyn Translator,
    languages: &[String],
    options: &FetchOptions,
) -> Result<TranslationSet, Error> {
    let mut combined = TranslationSet::new();
    for language in languages {
        let set = fetch_language(catalog, translator, language, options)?;
        combine_translations(&mut combined, set);
    }
    Ok(combined)
}

/// Folds `other` into `into`; later values win for the same key and language.
pub fn combine_translations(into: &mut TranslationSet, other: TranslationSet) {
    for (key, values) in other {
        into.entry(key).or_default().extend(values);
    }
}

/// Runs a plan with `translator` fetching every target language sequentially.
pub fn run_conversion(
    plan: &ConversionPlan,
    translator: &dyn Translator,
) -> Result<ConversionReport, Error> {
    run_conversion_with(plan, |catalog, languages| {
        fetch_languages(catalog, translator, languages, &plan.fetch)
    })
}

/// Runs a plan, asking `fetch` for the translations of the decoded catalog.
///
/// `fetch` receives the catalog and the target languages and returns the
/// combined translations; callers use it to parallelize across languages.
/// With a per-language layout, target files that already exist are read
/// first: their values count as present for `only_missing`, and keys the
/// input does not have are written back unchanged.
pub fn run_conversion_with<F>(plan: &ConversionPlan, fetch: F) -> Result<ConversionReport, Error>
where
    F: FnOnce(&Catalog, &[String]) -> Result<TranslationSet, Error>,
{
    let mut catalog = codec::read_catalog(&plan.input, plan.format, None)?;
    if catalog.is_empty() {
        return Err(Error::NoContent {
            origin: plan.input.display().to_string(),
        });
    }
    if let Some(language) = plan
        .languages
        .iter()
        .find(|language| **language == catalog.source_language)
    {
        return Err(Error::validation_error(format!(
            "target language `{}` is the source language of {}",
            language,
            plan.input.display()
        )));
    }
    info!(
        input = %plan.input.display(),
        entries = catalog.len(),
        source = %catalog.source_language,
        "decoded input"
    );

    let existing = read_existing_outputs(plan)?;
    let source_keys: BTreeSet<String> = catalog.entries.keys().cloned().collect();
    carry_existing(&mut catalog, &existing, |key| source_keys.contains(key))?;

    let translations = fetch(&catalog, &plan.languages)?;

    // Keys only the target files know are kept but never sent for translation.
    carry_existing(&mut catalog, &existing, |key| !source_keys.contains(key))?;
    let merge = merge_translations(&mut catalog, &translations);
    let written = write_outputs(&plan.layout, plan.format, &catalog, &plan.languages)?;

    if let Some(path) = &plan.export {
        crate::export::write_csv(path, &catalog)?;
        info!(path = %path.display(), "exported csv");
    }

    Ok(ConversionReport {
        input: plan.input.clone(),
        format: plan.format,
        entries: catalog.len(),
        languages: plan.languages.clone(),
        written,
        merge,
        export: plan.export.clone(),
    })
}

/// Decodes the per-language files the plan is about to overwrite.
///
/// A single-file layout holds every language of the input catalog, so only
/// per-language layouts are considered.
fn read_existing_outputs(plan: &ConversionPlan) -> Result<Vec<(String, Catalog)>, Error> {
    if !matches!(plan.layout, OutputLayout::PerLanguage { .. }) {
        return Ok(Vec::new());
    }

    let mut existing = Vec::new();
    for language in &plan.languages {
        let path = plan.layout.path_for(language);
        if !path.is_file() {
            continue;
        }
        let previous = codec::read_catalog(&path, plan.format, Some(language))?;
        debug!(path = %path.display(), entries = previous.len(), "read existing output");
        existing.push((language.clone(), previous));
    }
    Ok(existing)
}

fn carry_existing<F>(catalog: &mut Catalog, existing: &[(String, Catalog)], include: F) -> Result<(), Error>
where
    F: Fn(&str) -> bool,
{
    for (language, previous) in existing {
        for entry in previous.entries.values().filter(|entry| include(entry.key.as_str())) {
            if let Some(value) = entry.translation(language) {
                catalog.set_translation(&entry.key, language, value)?;
            }
        }
    }
    Ok(())
}
