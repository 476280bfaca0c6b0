//! Tabular export of a catalog for spreadsheet tools.
//!
//! Only languages with at least one non-empty value become columns; a column
//! that would be blank for every row is left out.

use std::path::Path;

use csv::{QuoteStyle, WriterBuilder};

use crate::{error::Error, types::Catalog};

/// UTF-8 byte-order mark, so spreadsheet tools detect the encoding.
pub const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Languages with at least one non-empty value, source language first and
/// the rest in sorted order.
pub fn exported_languages(catalog: &Catalog) -> Vec<String> {
    let mut languages: Vec<String> = catalog
        .languages()
        .into_iter()
        .filter(|language| {
            catalog
                .entries
                .values()
                .any(|entry| entry.translation(language).is_some_and(|v| !v.is_empty()))
        })
        .collect();

    if let Some(position) = languages
        .iter()
        .position(|language| *language == catalog.source_language)
    {
        let source = languages.remove(position);
        languages.insert(0, source);
    }
    languages
}

/// Flattens a catalog into rows: a `Key` header followed by one row per entry.
/// Missing values are empty strings.
pub fn project(catalog: &Catalog) -> Vec<Vec<String>> {
    let languages = exported_languages(catalog);

    let mut rows = Vec::with_capacity(catalog.len() + 1);
    let mut header = vec!["Key".to_string()];
    header.extend(languages.iter().cloned());
    rows.push(header);

    for entry in catalog.entries.values() {
        let mut row = vec![entry.key.clone()];
        row.extend(
            languages
                .iter()
                .map(|language| entry.translation(language).unwrap_or_default().to_string()),
        );
        rows.push(row);
    }
    rows
}

/// Renders the projection as CSV: BOM, plain header, every data field
/// quote-wrapped with internal quotes doubled.
pub fn to_csv(catalog: &Catalog) -> Result<Vec<u8>, Error> {
    let rows = project(catalog);
    let mut rows = rows.into_iter();

    let mut buffer = UTF8_BOM.to_vec();

    let mut header_writer = WriterBuilder::new()
        .quote_style(QuoteStyle::Necessary)
        .from_writer(&mut buffer);
    if let Some(header) = rows.next() {
        header_writer.write_record(&header)?;
    }
    header_writer.flush()?;
    drop(header_writer);

    let mut writer = WriterBuilder::new()
        .quote_style(QuoteStyle::Always)
        .from_writer(&mut buffer);
    for row in rows {
        writer.write_record(&row)?;
    }
    writer.flush()?;
    drop(writer);

    Ok(buffer)
}

/// Writes the CSV export to `path`.
pub fn write_csv<P: AsRef<Path>>(path: P, catalog: &Catalog) -> Result<(), Error> {
    let bytes = to_csv(catalog)?;
    std::fs::write(path, bytes)?;
    Ok(())
}
