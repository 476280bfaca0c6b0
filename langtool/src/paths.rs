//! Platform rules for input files and output locations.
//!
//! A platform accepts a fixed set of input extensions, and the input format
//! decides whether output is one merged file (`.xcstrings`) or one file per
//! language in a directory (`<dir>/<lang>.<ext>`).

use std::path::{Path, PathBuf};

use tracing::{debug, warn};
use unic_langid::LanguageIdentifier;

use crate::{
    codec,
    error::{Error, WriteFailure},
    formats::LocalizationFormat,
    types::{Catalog, PlatformType},
};

/// Picks the codec for `input` after checking its extension against the
/// platform. Nothing is read from disk.
pub fn resolve_format(platform: PlatformType, input: &Path) -> Result<LocalizationFormat, Error> {
    let extension = input
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase)
        .ok_or_else(|| {
            Error::validation_error(format!(
                "input file `{}` has no extension; {} expects {}",
                input.display(),
                platform,
                expected_extensions(platform)
            ))
        })?;

    if !platform.accepted_extensions().contains(&extension.as_str()) {
        return Err(Error::validation_error(format!(
            "`.{}` files are not supported for {}; expected {}",
            extension,
            platform,
            expected_extensions(platform)
        )));
    }

    match extension.as_str() {
        "strings" => Ok(LocalizationFormat::Strings),
        "xcstrings" => Ok(LocalizationFormat::Xcstrings),
        "arb" => Ok(LocalizationFormat::Arb),
        "json" => Ok(LocalizationFormat::JsonCatalog),
        other => Err(Error::validation_error(format!(
            "no codec for `.{}` files",
            other
        ))),
    }
}

fn expected_extensions(platform: PlatformType) -> String {
    platform
        .accepted_extensions()
        .iter()
        .map(|ext| format!(".{}", ext))
        .collect::<Vec<_>>()
        .join(" or ")
}

/// Validates a BCP 47 language identifier such as `fr`, `zh-Hans` or `pt-BR`.
pub fn validate_language_code(code: &str) -> Result<(), Error> {
    if code.is_empty() {
        return Err(Error::validation_error("language code cannot be empty"));
    }
    let invalid = || {
        Error::validation_error(format!(
            "invalid language code `{}`; expected a BCP 47 identifier such as `fr` or `zh-Hans`",
            code
        ))
    };
    let id = code.parse::<LanguageIdentifier>().map_err(|_| invalid())?;
    let primary = id.language.as_str();
    if !(2..=3).contains(&primary.len()) || primary == "und" {
        return Err(invalid());
    }
    Ok(())
}

/// Trims, validates and de-duplicates a language list, keeping first-seen order.
pub fn normalize_languages<S: AsRef<str>>(languages: &[S]) -> Result<Vec<String>, Error> {
    let mut normalized: Vec<String> = Vec::with_capacity(languages.len());
    for language in languages {
        let language = language.as_ref().trim();
        if language.is_empty() {
            continue;
        }
        validate_language_code(language)?;
        if !normalized.iter().any(|seen| seen == language) {
            normalized.push(language.to_string());
        }
    }
    Ok(normalized)
}

/// Where converted output goes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutputLayout {
    /// One multi-language file at an exact path.
    SingleFile(PathBuf),
    /// One file per language, named `<dir>/<lang>.<extension>`.
    PerLanguage { dir: PathBuf, extension: String },
}

impl OutputLayout {
    /// Layout for writing `format` to `output`, validated against the
    /// filesystem as it is now.
    pub fn for_output(format: LocalizationFormat, output: &Path) -> Result<Self, Error> {
        if format.is_multi_language() {
            let ok = output
                .extension()
                .and_then(|ext| ext.to_str())
                .is_some_and(|ext| ext.eq_ignore_ascii_case(format.extension()));
            if !ok {
                return Err(Error::validation_error(format!(
                    "output `{}` must be a .{} file",
                    output.display(),
                    format.extension()
                )));
            }
            return Ok(OutputLayout::SingleFile(output.to_path_buf()));
        }

        if output.is_file() {
            return Err(Error::validation_error(format!(
                "output `{}` is a file; {} output is written as one file per language into a directory",
                output.display(),
                format
            )));
        }
        Ok(OutputLayout::PerLanguage {
            dir: output.to_path_buf(),
            extension: format.extension().to_string(),
        })
    }

    /// The file that receives `language`.
    pub fn path_for(&self, language: &str) -> PathBuf {
        match self {
            OutputLayout::SingleFile(path) => path.clone(),
            OutputLayout::PerLanguage { dir, extension } => {
                dir.join(format!("{}.{}", language, extension))
            }
        }
    }

    /// Directory the output lives in.
    pub fn directory(&self) -> PathBuf {
        match self {
            OutputLayout::SingleFile(path) => path
                .parent()
                .map(Path::to_path_buf)
                .unwrap_or_default(),
            OutputLayout::PerLanguage { dir, .. } => dir.clone(),
        }
    }
}

/// Writes `catalog` according to `layout` and returns the written paths.
///
/// A single-file layout is one write. A per-language layout attempts every
/// language even after a failure; if any write failed the result is
/// [`Error::Write`] listing each failure, and files already written stay on
/// disk.
pub fn write_outputs(
    layout: &OutputLayout,
    format: LocalizationFormat,
    catalog: &Catalog,
    languages: &[String],
) -> Result<Vec<PathBuf>, Error> {
    match layout {
        OutputLayout::SingleFile(path) => {
            codec::write_catalog(path, format, catalog, &catalog.source_language)?;
            debug!(path = %path.display(), "wrote catalog");
            Ok(vec![path.clone()])
        }
        OutputLayout::PerLanguage { .. } => {
            let mut written = Vec::with_capacity(languages.len());
            let mut failures = Vec::new();

            for language in languages {
                let path = layout.path_for(language);
                match codec::write_catalog(&path, format, catalog, language) {
                    Ok(()) => {
                        debug!(path = %path.display(), language = %language, "wrote catalog");
                        written.push(path);
                    }
                    Err(e) => {
                        warn!(path = %path.display(), error = %e, "failed to write output");
                        failures.push(WriteFailure {
                            path,
                            reason: e.to_string(),
                        });
                    }
                }
            }

            if failures.is_empty() {
                Ok(written)
            } else {
                Err(Error::Write {
                    failures,
                    written: written.len(),
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Stage;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_resolve_format_per_platform() {
        assert_eq!(
            resolve_format(PlatformType::Ios, Path::new("Localizable.strings")).unwrap(),
            LocalizationFormat::Strings
        );
        assert_eq!(
            resolve_format(PlatformType::Ios, Path::new("Localizable.XCStrings")).unwrap(),
            LocalizationFormat::Xcstrings
        );
        assert_eq!(
            resolve_format(PlatformType::Flutter, Path::new("lib/l10n/app_en.arb")).unwrap(),
            LocalizationFormat::Arb
        );
        assert_eq!(
            resolve_format(PlatformType::Electron, Path::new("locales/en.json")).unwrap(),
            LocalizationFormat::JsonCatalog
        );
    }

    #[test]
    fn test_resolve_format_rejects_mismatch_without_reading() {
        // The file does not exist; the extension alone decides.
        let error = resolve_format(PlatformType::Electron, Path::new("missing/app_en.arb")).unwrap_err();
        assert_eq!(error.stage(), Stage::Validate);
        assert!(error.to_string().contains(".arb"));
        assert!(error.to_string().contains("electron"));

        assert!(resolve_format(PlatformType::Flutter, Path::new("en.json")).is_err());
        assert!(resolve_format(PlatformType::Ios, Path::new("Localizable")).is_err());
    }

    #[test]
    fn test_validate_language_code() {
        assert!(validate_language_code("fr").is_ok());
        assert!(validate_language_code("zh-Hans").is_ok());
        assert!(validate_language_code("pt-BR").is_ok());
        assert!(validate_language_code("").is_err());
        assert!(validate_language_code("invalid").is_err());
        assert!(validate_language_code("123").is_err());
        assert!(validate_language_code("en-").is_err());
    }

    #[test]
    fn test_normalize_languages_dedupes_and_trims() {
        let languages = normalize_languages(&[" fr", "de", "fr", ""]).unwrap();
        assert_eq!(languages, vec!["fr", "de"]);
        assert!(normalize_languages(&["fr", "not a code"]).is_err());
    }

    #[test]
    fn test_layout_for_xcstrings_requires_extension() {
        let layout = OutputLayout::for_output(LocalizationFormat::Xcstrings, Path::new("out/All.xcstrings"))
            .unwrap();
        assert_eq!(layout, OutputLayout::SingleFile(PathBuf::from("out/All.xcstrings")));
        assert_eq!(layout.path_for("fr"), PathBuf::from("out/All.xcstrings"));

        let error = OutputLayout::for_output(LocalizationFormat::Xcstrings, Path::new("out/All.json"))
            .unwrap_err();
        assert_eq!(error.stage(), Stage::Validate);
    }

    #[test]
    fn test_per_language_layout_naming() {
        let layout = OutputLayout::for_output(LocalizationFormat::Arb, Path::new("out")).unwrap();
        assert_eq!(layout.path_for("zh-Hans"), PathBuf::from("out/zh-Hans.arb"));
        assert_eq!(layout.directory(), PathBuf::from("out"));
    }

    #[test]
    fn test_per_language_layout_rejects_existing_file() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("taken.json");
        fs::write(&file, "{}").unwrap();
        assert!(OutputLayout::for_output(LocalizationFormat::JsonCatalog, &file).is_err());
    }

    #[test]
    fn test_write_outputs_attempts_every_language() {
        let dir = TempDir::new().unwrap();
        let layout = OutputLayout::for_output(LocalizationFormat::JsonCatalog, dir.path()).unwrap();

        // A directory where `fr.json` should go makes that one write fail.
        fs::create_dir_all(dir.path().join("fr.json")).unwrap();

        let mut catalog = Catalog::new("en");
        catalog.set_translation("hi", "en", "Hi").unwrap();
        catalog.set_translation("hi", "de", "Hallo").unwrap();
        catalog.set_translation("hi", "fr", "Salut").unwrap();
        catalog.set_translation("hi", "ja", "やあ").unwrap();

        let languages = vec!["de".to_string(), "fr".to_string(), "ja".to_string()];
        let error = write_outputs(&layout, LocalizationFormat::JsonCatalog, &catalog, &languages)
            .unwrap_err();

        match &error {
            Error::Write { failures, written } => {
                assert_eq!(*written, 2);
                assert_eq!(failures.len(), 1);
                assert!(failures[0].path.ends_with("fr.json"));
            }
            other => panic!("unexpected error: {other}"),
        }
        assert!(dir.path().join("de.json").is_file());
        assert!(dir.path().join("ja.json").is_file());
    }

    #[test]
    fn test_write_outputs_single_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("Localizable.xcstrings");
        let layout = OutputLayout::for_output(LocalizationFormat::Xcstrings, &path).unwrap();

        let mut catalog = Catalog::new("en");
        catalog.set_translation("hi", "en", "Hi").unwrap();
        let written = write_outputs(&layout, LocalizationFormat::Xcstrings, &catalog, &[]).unwrap();
        assert_eq!(written, vec![path.clone()]);
        assert!(path.is_file());
    }
}
