//! CLI library for testing purposes

pub mod config;
pub mod convert;
pub mod export;
pub mod extract;
pub mod translator;

pub use config::{Provider, TranslatorConfig};
pub use translator::ChatCompletionTranslator;
