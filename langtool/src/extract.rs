//! Extraction of Chinese (Han script) text from JSON documents and catalogs.
//!
//! Some projects use the Chinese source text itself as the localization key.
//! Collecting those keys gives the list of texts to send for translation.

use std::collections::BTreeSet;

use lazy_static::lazy_static;
use regex::Regex;
use serde_json::Value;

use crate::types::Catalog;

lazy_static! {
    static ref HAN_REGEX: Regex = Regex::new(r"\p{Han}").unwrap();
}

/// Whether `text` contains at least one Han character.
pub fn contains_han(text: &str) -> bool {
    HAN_REGEX.is_match(text)
}

/// Collects every object key containing a Han character, at any depth.
///
/// Object values and array elements are always descended into, whether or
/// not their key matched.
///
/// ```rust
/// let value = serde_json::json!({"你好": 1, "world": {"再见": "x"}});
/// let keys = langtool::extract::extract_han_keys(&value);
/// assert_eq!(keys.into_iter().collect::<Vec<_>>(), vec!["你好", "再见"]);
/// ```
pub fn extract_han_keys(value: &Value) -> BTreeSet<String> {
    let mut keys = BTreeSet::new();
    collect_han_keys(value, &mut keys);
    keys
}

fn collect_han_keys(value: &Value, keys: &mut BTreeSet<String>) {
    match value {
        Value::Object(object) => {
            for (key, child) in object {
                if contains_han(key) {
                    keys.insert(key.clone());
                }
                collect_han_keys(child, keys);
            }
        }
        Value::Array(items) => {
            for item in items {
                collect_han_keys(item, keys);
            }
        }
        Value::String(_) | Value::Number(_) | Value::Bool(_) | Value::Null => {}
    }
}

/// Catalog keys containing a Han character.
pub fn extract_han_keys_from_catalog(catalog: &Catalog) -> BTreeSet<String> {
    catalog
        .entries
        .keys()
        .filter(|key| contains_han(key))
        .cloned()
        .collect()
}

/// De-duplicated, non-empty source-language values of a catalog.
pub fn collect_source_values(catalog: &Catalog) -> BTreeSet<String> {
    catalog
        .entries
        .values()
        .filter_map(|entry| catalog.source_value(entry))
        .map(str::to_string)
        .collect()
}
