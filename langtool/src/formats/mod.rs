//! All supported localization file formats for langtool.
//!
//! This module re-exports the main types for each format and provides
//! the [`LocalizationFormat`] enum for generic format handling across the crate.

pub mod arb;
pub mod json;
pub mod strings;
pub mod xcstrings;

use std::{
    fmt::{Display, Formatter},
    path::Path,
    str::FromStr,
};

// Reexporting the formats for easier access
pub use arb::Format as ArbFormat;
pub use json::Format as JsonCatalogFormat;
pub use strings::Format as StringsFormat;
pub use xcstrings::Format as XcstringsFormat;

use crate::Error;

/// Represents all supported localization file formats for generic handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LocalizationFormat {
    /// Apple `.strings`: one language per file.
    Strings,
    /// Apple `.xcstrings`: every language in one JSON file.
    Xcstrings,
    /// Flutter `.arb`: one language per file, with `@` metadata.
    Arb,
    /// Flat `key -> value` JSON, one language per file.
    JsonCatalog,
}

/// Implements [`std::fmt::Display`] for [`LocalizationFormat`].
///
/// # Example
/// ```rust
/// use langtool::formats::LocalizationFormat;
/// assert_eq!(LocalizationFormat::Strings.to_string(), "strings");
/// assert_eq!(LocalizationFormat::JsonCatalog.to_string(), "json");
/// ```
impl Display for LocalizationFormat {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            LocalizationFormat::Strings => write!(f, "strings"),
            LocalizationFormat::Xcstrings => write!(f, "xcstrings"),
            LocalizationFormat::Arb => write!(f, "arb"),
            LocalizationFormat::JsonCatalog => write!(f, "json"),
        }
    }
}

/// Accepts `strings`, `xcstrings`, `arb`, and `json` (case-insensitive).
impl FromStr for LocalizationFormat {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim().to_ascii_lowercase();
        match s.as_str() {
            "strings" => Ok(LocalizationFormat::Strings),
            "xcstrings" => Ok(LocalizationFormat::Xcstrings),
            "arb" => Ok(LocalizationFormat::Arb),
            "json" | "jsoncatalog" => Ok(LocalizationFormat::JsonCatalog),
            other => Err(Error::validation_error(format!(
                "unknown format `{}`",
                other
            ))),
        }
    }
}

impl LocalizationFormat {
    /// Returns the typical file extension for this format.
    pub fn extension(&self) -> &'static str {
        match self {
            LocalizationFormat::Strings => "strings",
            LocalizationFormat::Xcstrings => "xcstrings",
            LocalizationFormat::Arb => "arb",
            LocalizationFormat::JsonCatalog => "json",
        }
    }

    /// Whether one file holds every language (`true`) or a single one.
    pub fn is_multi_language(&self) -> bool {
        matches!(self, LocalizationFormat::Xcstrings)
    }

    /// Infers the format from a path's extension, if it is a known one.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Option<Self> {
        let extension = path.as_ref().extension()?.to_str()?.to_ascii_lowercase();
        match extension.as_str() {
            "strings" => Some(LocalizationFormat::Strings),
            "xcstrings" => Some(LocalizationFormat::Xcstrings),
            "arb" => Some(LocalizationFormat::Arb),
            "json" => Some(LocalizationFormat::JsonCatalog),
            _ => None,
        }
    }
}
