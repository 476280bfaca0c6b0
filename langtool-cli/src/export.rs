use std::path::Path;

use langtool::{
    PlatformType, formats::LocalizationFormat, export::write_csv, read_catalog, resolve_format,
};

use crate::convert::spinner;

/// Picks the input codec: checked against the platform when one is given,
/// otherwise inferred from the extension.
pub fn input_format(input: &Path, platform: Option<&str>) -> Result<LocalizationFormat, String> {
    match platform {
        Some(platform) => {
            let platform: PlatformType = platform.parse().map_err(|e| format!("{}", e))?;
            resolve_format(platform, input).map_err(|e| e.to_string())
        }
        None => LocalizationFormat::from_path(input).ok_or_else(|| {
            format!(
                "Cannot infer format from extension: {}. Expected .strings, .xcstrings, .arb or .json",
                input.display()
            )
        }),
    }
}

/// Run the export command: write a localization file as a CSV table.
pub fn run_export_command(
    input: String,
    platform: Option<String>,
    output: String,
) -> Result<(), String> {
    let input_path = Path::new(&input);
    let format = input_format(input_path, platform.as_deref())?;

    let progress_bar = spinner();
    progress_bar.set_message(format!("Reading {}...", input));
    let catalog = match read_catalog(input_path, format, None) {
        Ok(catalog) => catalog,
        Err(e) => {
            progress_bar.finish_with_message("❌ Error reading input file");
            return Err(e.to_string());
        }
    };

    progress_bar.set_message("Writing CSV...");
    if let Err(e) = write_csv(&output, &catalog) {
        progress_bar.finish_with_message("❌ Error writing output file");
        return Err(format!("Error writing to {}: {}", output, e));
    }

    progress_bar.finish_with_message(format!(
        "✅ Exported {} entries to {}",
        catalog.len(),
        output
    ));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_input_format() {
        assert_eq!(
            input_format(Path::new("Localizable.xcstrings"), None).unwrap(),
            LocalizationFormat::Xcstrings
        );
        assert_eq!(
            input_format(Path::new("app_en.arb"), Some("flutter")).unwrap(),
            LocalizationFormat::Arb
        );
        assert!(input_format(Path::new("app_en.arb"), Some("ios")).is_err());
        assert!(input_format(Path::new("strings.txt"), None).is_err());
    }
}
