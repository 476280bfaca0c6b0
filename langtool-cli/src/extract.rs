use std::fs;

use langtool::extract::extract_han_keys;
use serde_json::Value;
use tracing::info;

/// Collects Chinese keys from a JSON document, one key per line.
pub fn extract_keys_from_json(content: &str) -> Result<Vec<String>, String> {
    let value: Value =
        serde_json::from_str(content).map_err(|e| format!("Invalid JSON input: {}", e))?;
    Ok(extract_han_keys(&value).into_iter().collect())
}

/// Run the extract-keys command: print or write every Han-script key found
/// anywhere in a JSON document.
pub fn run_extract_keys_command(input: String, output: Option<String>) -> Result<(), String> {
    let content =
        fs::read_to_string(&input).map_err(|e| format!("Error reading {}: {}", input, e))?;
    let keys = extract_keys_from_json(&content).map_err(|e| format!("{} ({})", e, input))?;
    info!(count = keys.len(), input = %input, "extracted keys");

    let mut text = keys.join("\n");
    if !text.is_empty() {
        text.push('\n');
    }

    match output {
        Some(path) => {
            fs::write(&path, text).map_err(|e| format!("Error writing to {}: {}", path, e))?;
            eprintln!("✅ Extracted {} keys to {}", keys.len(), path);
        }
        None => print!("{}", text),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_keys_from_json() {
        let keys = extract_keys_from_json(r#"{"设置": {"语言": "x", "theme": 1}, "list": [{"关于": null}]}"#)
            .unwrap();
        assert_eq!(keys, vec!["关于", "设置", "语言"]);
    }

    #[test]
    fn test_invalid_json() {
        assert!(extract_keys_from_json("{").unwrap_err().contains("Invalid JSON"));
    }
}
