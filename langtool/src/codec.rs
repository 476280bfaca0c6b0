//! Format dispatch: decoding bytes of any [`LocalizationFormat`] into a
//! [`Catalog`] and encoding a catalog back, plus the file-level helpers the
//! conversion pipeline builds on.

use std::path::Path;

use tracing::debug;
use unic_langid::LanguageIdentifier;

use crate::{
    error::Error,
    formats::{ArbFormat, JsonCatalogFormat, LocalizationFormat, StringsFormat, XcstringsFormat},
    traits::Parser,
    types::{Catalog, DEFAULT_SOURCE_LANGUAGE},
};

/// Decodes `bytes` in the given format.
///
/// `language` names the language of single-language formats when the file
/// itself does not declare one (`.strings` header, ARB `@@locale`). It is
/// ignored for `.xcstrings`. `origin` is used in error messages.
pub fn decode(
    format: LocalizationFormat,
    bytes: &[u8],
    origin: &str,
    language: &str,
) -> Result<Catalog, Error> {
    let catalog = match format {
        LocalizationFormat::Strings => StringsFormat::parse(bytes, origin)?.into_catalog(language),
        LocalizationFormat::Xcstrings => XcstringsFormat::parse(bytes, origin)?.into_catalog(),
        LocalizationFormat::Arb => ArbFormat::parse(bytes, origin)?.into_catalog(language),
        LocalizationFormat::JsonCatalog => {
            JsonCatalogFormat::parse(bytes, origin)?.into_catalog(language)
        }
    };
    debug!(%format, origin, entries = catalog.len(), "decoded catalog");
    Ok(catalog)
}

/// Encodes a catalog in the given format.
///
/// Single-language formats write only `language`; `.xcstrings` writes every
/// language and ignores it.
pub fn encode(
    format: LocalizationFormat,
    catalog: &Catalog,
    language: &str,
) -> Result<Vec<u8>, Error> {
    match format {
        LocalizationFormat::Strings => StringsFormat::from_catalog(catalog, language).to_bytes(),
        LocalizationFormat::Xcstrings => XcstringsFormat::from_catalog(catalog).to_bytes(),
        LocalizationFormat::Arb => ArbFormat::from_catalog(catalog, language).to_bytes(),
        LocalizationFormat::JsonCatalog => {
            JsonCatalogFormat::from_catalog(catalog, language).to_bytes()
        }
    }
}

/// Reads and decodes a file. The language of single-language files is taken
/// from `language_hint`, else inferred from the path, else `en`.
pub fn read_catalog<P: AsRef<Path>>(
    path: P,
    format: LocalizationFormat,
    language_hint: Option<&str>,
) -> Result<Catalog, Error> {
    let path = path.as_ref();
    let origin = path.display().to_string();
    let bytes = std::fs::read(path).map_err(|e| Error::decode(format, origin.as_str(), e))?;

    let inferred = infer_language_from_path(path);
    let language = language_hint
        .or(inferred.as_deref())
        .unwrap_or(DEFAULT_SOURCE_LANGUAGE);

    decode(format, &bytes, &origin, language)
}

/// Encodes and writes one file, creating parent directories as needed.
pub fn write_catalog<P: AsRef<Path>>(
    path: P,
    format: LocalizationFormat,
    catalog: &Catalog,
    language: &str,
) -> Result<(), Error> {
    let path = path.as_ref();
    let bytes = encode(format, catalog, language)?;
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, bytes)?;
    Ok(())
}

/// Infers a language code from common path conventions:
/// `fr.lproj/Localizable.strings`, `zh-Hans.json`, `app_de.arb`.
///
/// `Base.lproj` and stems that are not language identifiers yield `None`.
pub fn infer_language_from_path<P: AsRef<Path>>(path: P) -> Option<String> {
    let path = path.as_ref();

    let from_lproj = path.components().rev().find_map(|component| {
        let component = component.as_os_str().to_str()?;
        component.strip_suffix(".lproj").map(str::to_string)
    });
    if let Some(language) = from_lproj {
        return is_language_code(&language).then_some(language);
    }

    let stem = path.file_stem()?.to_str()?;
    if !stem.contains('_') && is_language_code(stem) {
        return Some(stem.to_string());
    }
    // Flutter convention: `<prefix>_<locale>.arb`
    stem.split_once('_')
        .map(|(_, locale)| locale)
        .filter(|locale| is_language_code(locale))
        .map(str::to_string)
}

/// Whether `code` looks like a language tag (two or three letter primary subtag).
pub fn is_language_code(code: &str) -> bool {
    code.parse::<LanguageIdentifier>()
        .map(|id| {
            let primary = id.language.as_str();
            (2..=3).contains(&primary.len()) && primary != "und"
        })
        .unwrap_or(false)
}
