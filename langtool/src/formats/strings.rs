//! Support for Apple `.strings` localization format.
//!
//! Every non-empty, non-`//` line of the form `"key" = "value";` is one pair.
//! Lines that do not match are skipped rather than rejected; this lax policy
//! mirrors how hand-edited `.strings` files are usually consumed.
//!
//! Provides parsing, serialization, and conversion to/from the [`Catalog`] model.

use std::{collections::HashMap, io::Write};

use indoc::formatdoc;
use lazy_static::lazy_static;
use regex::Regex;
use tracing::debug;

use crate::{
    error::Error,
    formats::LocalizationFormat,
    traits::Parser,
    types::{Catalog, CatalogEntry},
};

lazy_static! {
    /// `"key" = "value";`, where both sides may contain backslash escapes.
    static ref PAIR_REGEX: Regex =
        Regex::new(r#""((?:[^"\\]|\\.)*)"\s*=\s*"((?:[^"\\]|\\.)*)"\s*;"#).unwrap();
}

/// Represents an Apple `.strings` localization file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Format {
    /// Language code from the `//: Language:` header, empty when absent.
    pub language: String,
    /// All key-value pairs in file order.
    pub pairs: Vec<Pair>,
}

impl Parser for Format {
    const FORMAT: LocalizationFormat = LocalizationFormat::Strings;

    /// Parses `.strings` bytes.
    ///
    /// Input with a UTF-8 or UTF-16 byte-order mark is decoded accordingly;
    /// input without one must be valid UTF-8.
    fn parse(bytes: &[u8], origin: &str) -> Result<Self, Error> {
        let content = decode_text(bytes, origin)?;

        let mut header = HashMap::<String, String>::new();
        let mut skipped = 0usize;
        let mut pairs = Vec::new();

        for line in content.lines() {
            let trimmed = line.trim();
            if let Some(rest) = trimmed.strip_prefix("//:") {
                // Header line, e.g. "//: Language: fr"
                if let Some((key, value)) = rest.split_once(':') {
                    header.insert(key.trim().to_string(), value.trim().to_string());
                }
                continue;
            }
            if trimmed.is_empty() || trimmed.starts_with("//") {
                continue;
            }

            match PAIR_REGEX.captures(trimmed) {
                Some(captures) => {
                    let key = unescape(&captures[1]);
                    if key.is_empty() {
                        skipped += 1;
                        continue;
                    }
                    pairs.push(Pair {
                        key,
                        value: unescape(&captures[2]),
                        comment: None,
                    });
                }
                None => skipped += 1,
            }
        }

        if skipped > 0 {
            debug!(origin, skipped, "skipped malformed .strings lines");
        }

        Ok(Format {
            language: header.remove("Language").unwrap_or_default(),
            pairs,
        })
    }

    fn to_writer<W: Write>(&self, mut writer: W) -> Result<(), Error> {
        let mut content = formatdoc! {"
            // This file is generated by langtool.
            //
            //: Language: {}
            //

            ",
            self.language
        };

        for pair in &self.pairs {
            content.push_str(&pair.to_string());
            content.push('\n');
        }

        writer.write_all(content.as_bytes()).map_err(Error::Io)
    }
}

impl Format {
    /// Builds the `.strings` file for one language of a catalog.
    ///
    /// Entries without a value for `language` are left out.
    pub fn from_catalog(catalog: &Catalog, language: &str) -> Self {
        let pairs = catalog
            .entries
            .values()
            .filter_map(|entry| {
                entry.translation(language).map(|value| Pair {
                    key: entry.key.clone(),
                    value: value.to_string(),
                    comment: entry.comment.clone(),
                })
            })
            .collect();

        Format {
            language: language.to_string(),
            pairs,
        }
    }

    /// Converts into a single-language catalog.
    ///
    /// The header language wins; `fallback_language` is used otherwise.
    pub fn into_catalog(self, fallback_language: &str) -> Catalog {
        let language = if self.language.is_empty() {
            fallback_language.to_string()
        } else {
            self.language
        };

        let mut catalog = Catalog::new(language.clone());
        for pair in self.pairs {
            // Duplicate keys: the last assignment wins, as in Foundation.
            let entry = CatalogEntry::new(pair.key.clone()).with_translation(&language, pair.value);
            catalog.entries.insert(pair.key, entry);
        }
        catalog
    }
}

/// A single key-value pair in a `.strings` file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pair {
    /// The key for this localization entry (unescaped).
    pub key: String,
    /// The value for this localization entry (unescaped).
    pub value: String,
    /// Comment written above the pair. Never populated by the parser.
    pub comment: Option<String>,
}

impl std::fmt::Display for Pair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if let Some(comment) = &self.comment {
            for line in comment.lines() {
                writeln!(f, "// {}", line)?;
            }
        }
        write!(f, "\"{}\" = \"{}\";", escape(&self.key), escape(&self.value))
    }
}

fn decode_text(bytes: &[u8], origin: &str) -> Result<String, Error> {
    if let Some((encoding, bom_length)) = encoding_rs::Encoding::for_bom(bytes) {
        let (text, had_errors) = encoding.decode_without_bom_handling(&bytes[bom_length..]);
        if had_errors {
            return Err(Error::decode(
                LocalizationFormat::Strings,
                origin,
                format!("invalid {} byte sequence", encoding.name()),
            ));
        }
        return Ok(text.into_owned());
    }

    String::from_utf8(bytes.to_vec())
        .map_err(|e| Error::decode(LocalizationFormat::Strings, origin, e))
}

fn escape(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '\\' => escaped.push_str(r"\\"),
            '"' => escaped.push_str("\\\""),
            '\n' => escaped.push_str(r"\n"),
            '\r' => escaped.push_str(r"\r"),
            '\t' => escaped.push_str(r"\t"),
            other => escaped.push(other),
        }
    }
    escaped
}

fn unescape(raw: &str) -> String {
    let mut unescaped = String::with_capacity(raw.len());
    let mut chars = raw.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            unescaped.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => unescaped.push('\n'),
            Some('r') => unescaped.push('\r'),
            Some('t') => unescaped.push('\t'),
            Some('"') => unescaped.push('"'),
            Some('\\') => unescaped.push('\\'),
            // Unknown escapes (e.g. `\U2026`) are kept as written.
            Some(other) => {
                unescaped.push('\\');
                unescaped.push(other);
            }
            None => unescaped.push('\\'),
        }
    }
    unescaped
}
