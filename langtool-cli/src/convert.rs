use std::path::PathBuf;

use indicatif::{ProgressBar, ProgressStyle};
use langtool::{
    ConversionPlan, ConversionRequest, ExportFormat, PlatformType, TranslationSet,
    convert::combine_translations, run_conversion_with, translate::fetch_language,
};
use rayon::prelude::*;

use crate::config::{Provider, TranslatorConfig};
use crate::translator::ChatCompletionTranslator;

#[derive(Debug, Clone)]
pub struct ConvertOptions {
    pub platform: String,
    pub input: String,
    pub output: Option<String>,
    pub languages: Vec<String>,
    pub sync_to_source: bool,
    pub export: Option<String>,
    pub only_missing: bool,
    pub config: Option<String>,
    pub provider: Option<Provider>,
    pub batch_size: Option<usize>,
}

pub(crate) fn spinner() -> ProgressBar {
    let progress_bar = ProgressBar::new_spinner();
    progress_bar.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {wide_msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    progress_bar
}

/// Builds the library request from command-line options and the translator config.
pub fn build_request(
    options: &ConvertOptions,
    config: &TranslatorConfig,
) -> Result<ConversionRequest, String> {
    let platform: PlatformType = options.platform.parse().map_err(|e| format!("{}", e))?;

    let mut request = ConversionRequest::new(platform, PathBuf::from(&options.input))
        .with_languages(options.languages.iter().map(String::as_str))
        .with_sync_to_source(options.sync_to_source);
    if let Some(output) = &options.output {
        request = request.with_output(output);
    }
    if let Some(export) = &options.export {
        let export: ExportFormat = export.parse().map_err(|e| format!("{}", e))?;
        request = request.with_export(export);
    }
    request.only_missing = options.only_missing;
    request.batch_size = options.batch_size.unwrap_or(config.batch_size);
    Ok(request)
}

/// Run the convert command: decode, translate every target language in
/// parallel, merge, and write the platform outputs.
pub fn run_convert_command(options: ConvertOptions) -> Result<(), String> {
    let mut config = TranslatorConfig::load(options.config.as_deref().map(std::path::Path::new))?;
    if let Some(provider) = options.provider {
        config.provider = provider;
    }
    config.apply_env(|key| std::env::var(key).ok());

    // Request validation runs before the input is read and before credentials are checked.
    let request = build_request(&options, &config)?;
    let plan = ConversionPlan::resolve(&request).map_err(|e| e.to_string())?;
    let translator = ChatCompletionTranslator::new(&config)?;

    let progress_bar = spinner();
    progress_bar.set_message(format!("Reading {}...", plan.input.display()));

    let result = run_conversion_with(&plan, |catalog, languages| {
        progress_bar.set_message(format!(
            "Translating {} entries into {}...",
            catalog.len(),
            languages.join(", ")
        ));
        let sets = languages
            .par_iter()
            .map(|language| fetch_language(catalog, &translator, language, &plan.fetch))
            .collect::<Result<Vec<_>, _>>()?;

        let mut combined = TranslationSet::new();
        for set in sets {
            combine_translations(&mut combined, set);
        }
        progress_bar.set_message("Writing output...");
        Ok(combined)
    });

    match result {
        Ok(report) => {
            progress_bar.finish_with_message(format!("✅ {}", report.summary()));
            Ok(())
        }
        Err(e) => {
            progress_bar.finish_with_message(format!("❌ Conversion failed during {}", e.stage()));
            Err(e.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn options() -> ConvertOptions {
        ConvertOptions {
            platform: "flutter".into(),
            input: "lib/l10n/app_en.arb".into(),
            output: Some("out".into()),
            languages: vec!["fr".into(), "ja".into()],
            sync_to_source: false,
            export: Some("csv".into()),
            only_missing: true,
            config: None,
            provider: None,
            batch_size: None,
        }
    }

    #[test]
    fn test_build_request_uses_config_batch_size() {
        let config = TranslatorConfig {
            batch_size: 10,
            ..TranslatorConfig::default()
        };
        let request = build_request(&options(), &config).unwrap();
        assert_eq!(request.platform, PlatformType::Flutter);
        assert_eq!(request.batch_size, 10);
        assert_eq!(request.export, Some(ExportFormat::Csv));
        assert!(request.only_missing);

        let mut explicit = options();
        explicit.batch_size = Some(5);
        assert_eq!(build_request(&explicit, &config).unwrap().batch_size, 5);
    }

    #[test]
    fn test_build_request_rejects_unknown_values() {
        let config = TranslatorConfig::default();

        let mut bad_platform = options();
        bad_platform.platform = "android".into();
        assert!(build_request(&bad_platform, &config).unwrap_err().contains("Unknown platform"));

        let mut bad_export = options();
        bad_export.export = Some("xlsx".into());
        assert!(build_request(&bad_export, &config).unwrap_err().contains("Unknown export format"));
    }
}
