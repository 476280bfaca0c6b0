//! Translator configuration: a TOML file plus environment overrides.

use std::{
    fmt::Display,
    path::{Path, PathBuf},
    str::FromStr,
};

use serde::{Deserialize, Serialize};
use tracing::debug;

/// Variable naming an explicit config file.
pub const CONFIG_ENV: &str = "LANGTOOL_CONFIG";
/// Provider-independent API key variable; wins over the provider-specific one.
pub const API_KEY_ENV: &str = "LANGTOOL_API_KEY";
pub const BASE_URL_ENV: &str = "LANGTOOL_BASE_URL";
pub const MODEL_ENV: &str = "LANGTOOL_MODEL";

/// Hosted translation services speaking the chat-completions protocol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    #[default]
    Deepseek,
    Gemini,
    Aliyun,
    /// Any compatible endpoint; `base_url` and `model` are required.
    Custom,
}

impl Provider {
    pub fn default_base_url(&self) -> Option<&'static str> {
        match self {
            Provider::Deepseek => Some("https://api.deepseek.com/chat/completions"),
            Provider::Gemini => {
                Some("https://generativelanguage.googleapis.com/v1beta/openai/chat/completions")
            }
            Provider::Aliyun => {
                Some("https://dashscope.aliyuncs.com/compatible-mode/v1/chat/completions")
            }
            Provider::Custom => None,
        }
    }

    pub fn default_model(&self) -> Option<&'static str> {
        match self {
            Provider::Deepseek => Some("deepseek-chat"),
            Provider::Gemini => Some("gemini-2.0-flash"),
            Provider::Aliyun => Some("qwen-mt-turbo"),
            Provider::Custom => None,
        }
    }

    /// Provider-specific API key variable.
    pub fn api_key_env(&self) -> Option<&'static str> {
        match self {
            Provider::Deepseek => Some("DEEPSEEK_API_KEY"),
            Provider::Gemini => Some("GEMINI_API_KEY"),
            Provider::Aliyun => Some("DASHSCOPE_API_KEY"),
            Provider::Custom => None,
        }
    }
}

impl Display for Provider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Provider::Deepseek => write!(f, "deepseek"),
            Provider::Gemini => write!(f, "gemini"),
            Provider::Aliyun => write!(f, "aliyun"),
            Provider::Custom => write!(f, "custom"),
        }
    }
}

impl FromStr for Provider {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "deepseek" => Ok(Provider::Deepseek),
            "gemini" => Ok(Provider::Gemini),
            "aliyun" | "dashscope" | "qwen" => Ok(Provider::Aliyun),
            "custom" => Ok(Provider::Custom),
            other => Err(format!(
                "Unknown provider: '{}'. Supported providers: deepseek, gemini, aliyun, custom",
                other
            )),
        }
    }
}

/// Settings for the hosted translator.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct TranslatorConfig {
    pub provider: Provider,
    pub api_key: Option<String>,
    /// Full chat-completions URL; the provider default when unset.
    pub base_url: Option<String>,
    pub model: Option<String>,
    pub timeout_secs: u64,
    pub batch_size: usize,
    pub temperature: f32,
}

impl Default for TranslatorConfig {
    fn default() -> Self {
        TranslatorConfig {
            provider: Provider::default(),
            api_key: None,
            base_url: None,
            model: None,
            timeout_secs: 60,
            batch_size: langtool::translate::DEFAULT_BATCH_SIZE,
            temperature: 0.2,
        }
    }
}

impl TranslatorConfig {
    pub fn from_toml_str(content: &str) -> Result<Self, String> {
        toml::from_str(content).map_err(|e| format!("Invalid config: {}", e))
    }

    pub fn load_file(path: &Path) -> Result<Self, String> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| format!("Cannot read config {}: {}", path.display(), e))?;
        Self::from_toml_str(&content).map_err(|e| format!("{} ({})", e, path.display()))
    }

    /// `$LANGTOOL_CONFIG`, else `$HOME/.config/langtool/config.toml`.
    pub fn default_path(lookup: impl Fn(&str) -> Option<String>) -> Option<PathBuf> {
        lookup(CONFIG_ENV).map(PathBuf::from).or_else(|| {
            lookup("HOME").map(|home| {
                PathBuf::from(home)
                    .join(".config")
                    .join("langtool")
                    .join("config.toml")
            })
        })
    }

    /// Loads the explicit file, which must exist, or else the default file
    /// when present, or else the built-in defaults.
    pub fn load(explicit: Option<&Path>) -> Result<Self, String> {
        if let Some(path) = explicit {
            return Self::load_file(path);
        }
        match Self::default_path(|key| std::env::var(key).ok()) {
            Some(path) if path.is_file() => {
                debug!(path = %path.display(), "loading translator config");
                Self::load_file(&path)
            }
            _ => Ok(Self::default()),
        }
    }

    /// Overrides settings from the environment. Call after the provider is final,
    /// since the provider decides which key variable is read.
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let non_empty = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        if let Some(key) = non_empty(API_KEY_ENV)
            .or_else(|| self.provider.api_key_env().and_then(|name| non_empty(name)))
        {
            self.api_key = Some(key);
        }
        if let Some(url) = non_empty(BASE_URL_ENV) {
            self.base_url = Some(url);
        }
        if let Some(model) = non_empty(MODEL_ENV) {
            self.model = Some(model);
        }
    }

    pub fn endpoint(&self) -> Result<String, String> {
        self.base_url
            .clone()
            .or_else(|| self.provider.default_base_url().map(str::to_string))
            .ok_or_else(|| format!("Provider '{}' requires base_url to be set", self.provider))
    }

    pub fn model_name(&self) -> Result<String, String> {
        self.model
            .clone()
            .or_else(|| self.provider.default_model().map(str::to_string))
            .ok_or_else(|| format!("Provider '{}' requires model to be set", self.provider))
    }

    pub fn require_api_key(&self) -> Result<&str, String> {
        match self.api_key.as_deref().filter(|key| !key.trim().is_empty()) {
            Some(key) => Ok(key),
            None => {
                let hint = match self.provider.api_key_env() {
                    Some(name) => format!("{} or {}", name, API_KEY_ENV),
                    None => API_KEY_ENV.to_string(),
                };
                Err(format!(
                    "Missing API key for provider '{}'. Set {} or api_key in the config file",
                    self.provider, hint
                ))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = TranslatorConfig::default();
        assert_eq!(config.provider, Provider::Deepseek);
        assert_eq!(config.timeout_secs, 60);
        assert_eq!(config.batch_size, 50);
        assert_eq!(
            config.endpoint().unwrap(),
            "https://api.deepseek.com/chat/completions"
        );
        assert_eq!(config.model_name().unwrap(), "deepseek-chat");
    }

    #[test]
    fn test_parse_toml() {
        let config = TranslatorConfig::from_toml_str(
            r#"
            provider = "gemini"
            api_key = "secret"
            batch_size = 20
            "#,
        )
        .unwrap();
        assert_eq!(config.provider, Provider::Gemini);
        assert_eq!(config.api_key.as_deref(), Some("secret"));
        assert_eq!(config.batch_size, 20);
        assert_eq!(config.timeout_secs, 60);
        assert_eq!(config.model_name().unwrap(), "gemini-2.0-flash");
    }

    #[test]
    fn test_unknown_field_is_rejected() {
        assert!(TranslatorConfig::from_toml_str("provder = \"gemini\"").is_err());
    }

    #[test]
    fn test_env_overrides() {
        let mut config = TranslatorConfig {
            provider: Provider::Aliyun,
            api_key: Some("from-file".into()),
            ..TranslatorConfig::default()
        };
        config.apply_env(env(&[("DASHSCOPE_API_KEY", "dash"), ("LANGTOOL_MODEL", "qwen-max")]));
        assert_eq!(config.api_key.as_deref(), Some("dash"));
        assert_eq!(config.model_name().unwrap(), "qwen-max");

        config.apply_env(env(&[("LANGTOOL_API_KEY", "generic"), ("DASHSCOPE_API_KEY", "dash")]));
        assert_eq!(config.api_key.as_deref(), Some("generic"));
    }

    #[test]
    fn test_env_for_other_provider_is_ignored() {
        let mut config = TranslatorConfig::default();
        config.apply_env(env(&[("GEMINI_API_KEY", "g")]));
        assert!(config.require_api_key().is_err());
    }

    #[test]
    fn test_custom_provider_needs_url_and_model() {
        let config = TranslatorConfig {
            provider: Provider::Custom,
            ..TranslatorConfig::default()
        };
        assert!(config.endpoint().is_err());
        assert!(config.model_name().is_err());
        assert!(config.require_api_key().unwrap_err().contains("LANGTOOL_API_KEY"));
    }

    #[test]
    fn test_default_path() {
        let path = TranslatorConfig::default_path(env(&[("HOME", "/home/me")])).unwrap();
        assert_eq!(path, PathBuf::from("/home/me/.config/langtool/config.toml"));

        let path =
            TranslatorConfig::default_path(env(&[("HOME", "/home/me"), (CONFIG_ENV, "/etc/lt.toml")]))
                .unwrap();
        assert_eq!(path, PathBuf::from("/etc/lt.toml"));
    }

    #[test]
    fn test_provider_from_str() {
        assert_eq!("DashScope".parse::<Provider>().unwrap(), Provider::Aliyun);
        assert!("openai".parse::<Provider>().is_err());
    }
}
