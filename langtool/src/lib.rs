#![forbid(unsafe_code)]
//! Localization file conversion and translation merging for Rust.
//!
//! Reads Apple `.strings` / `.xcstrings`, Flutter `.arb` and flat JSON
//! catalogs into one [`Catalog`] model, merges machine translations into it,
//! and writes it back out per platform convention or as a CSV export.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use langtool::{ConversionPlan, ConversionRequest, PlatformType, run_conversion};
//! # use langtool::{Error, Translator};
//! # struct Upper;
//! # impl Translator for Upper {
//! #     fn translate(&self, texts: &[String], _: &str, _: &str) -> Result<Vec<String>, Error> {
//! #         Ok(texts.iter().map(|t| t.to_uppercase()).collect())
//! #     }
//! # }
//!
//! let request = ConversionRequest::new(PlatformType::Flutter, "lib/l10n/app_en.arb")
//!     .with_languages(["fr", "ja"])
//!     .with_output("lib/l10n");
//! let plan = ConversionPlan::resolve(&request)?;
//! let report = run_conversion(&plan, &Upper)?;
//! println!("{}", report.summary());
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! # Supported Formats
//!
//! - **Apple `.strings`**: one language per file, `"key" = "value";` lines
//! - **Apple `.xcstrings`**: every language in one JSON string catalog
//! - **Flutter `.arb`**: one language per file, `@` metadata preserved
//! - **JSON**: flat `key -> value` objects used by Electron and web apps

pub mod codec;
pub mod convert;
pub mod error;
pub mod export;
pub mod extract;
pub mod formats;
pub mod merge;
pub mod paths;
pub mod traits;
pub mod translate;
pub mod types;

// Re-export most used types for easy consumption
pub use crate::{
    codec::{decode, encode, read_catalog, write_catalog},
    convert::{
        ConversionPlan, ConversionReport, ConversionRequest, ExportFormat, run_conversion,
        run_conversion_with,
    },
    error::{Error, Stage},
    formats::LocalizationFormat,
    merge::{MergeReport, TranslationSet, merge_translations},
    paths::{OutputLayout, resolve_format},
    translate::{FetchOptions, Translator, fetch_language},
    types::{Catalog, CatalogEntry, PlatformType},
};
