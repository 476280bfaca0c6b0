//! Hosted machine translation over the OpenAI-compatible chat-completions API.

use std::time::Duration;

use langtool::{
    Error, Translator,
    translate::{build_prompt, parse_translation_response},
};
use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::TranslatorConfig;

const SYSTEM_PROMPT: &str = "You are a professional software localization translator. \
Translate user interface strings faithfully and concisely. \
Answer with a JSON array of strings only.";

#[derive(Debug, Serialize)]
pub struct ChatRequest<'a> {
    pub model: &'a str,
    pub messages: Vec<ChatMessage>,
    pub temperature: f32,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

/// Sends each batch as one chat-completion request.
pub struct ChatCompletionTranslator {
    client: Client,
    endpoint: String,
    model: String,
    api_key: String,
    temperature: f32,
}

impl ChatCompletionTranslator {
    /// Fails when the configuration has no API key, or no endpoint or model
    /// for a custom provider.
    pub fn new(config: &TranslatorConfig) -> Result<Self, String> {
        let api_key = config.require_api_key()?.to_string();
        let endpoint = config.endpoint()?;
        let model = config.model_name()?;
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| format!("Cannot create HTTP client: {}", e))?;

        Ok(ChatCompletionTranslator {
            client,
            endpoint,
            model,
            api_key,
            temperature: config.temperature,
        })
    }

    pub fn request_body<'a>(
        &'a self,
        texts: &[String],
        source: &str,
        target: &str,
    ) -> Result<ChatRequest<'a>, Error> {
        Ok(ChatRequest {
            model: &self.model,
            messages: vec![
                ChatMessage {
                    role: "system".to_string(),
                    content: SYSTEM_PROMPT.to_string(),
                },
                ChatMessage {
                    role: "user".to_string(),
                    content: build_prompt(texts, source, target)?,
                },
            ],
            temperature: self.temperature,
        })
    }
}

/// Extracts the translations from a chat-completions response body.
pub fn parse_chat_response(body: &str, expected: usize, target: &str) -> Result<Vec<String>, Error> {
    let response: ChatResponse = serde_json::from_str(body)
        .map_err(|e| Error::translation(target, format!("invalid response data: {}", e)))?;
    let content = response
        .choices
        .into_iter()
        .next()
        .map(|choice| choice.message.content)
        .ok_or_else(|| Error::translation(target, "invalid response data: no choices"))?;
    parse_translation_response(&content, expected, target)
}

impl Translator for ChatCompletionTranslator {
    fn translate(&self, texts: &[String], source: &str, target: &str) -> Result<Vec<String>, Error> {
        let body = self.request_body(texts, source, target)?;
        debug!(endpoint = %self.endpoint, target, count = texts.len(), "requesting translations");

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .map_err(|e| Error::translation(target, format!("request failed: {}", e)))?;

        let status = response.status();
        let text = response
            .text()
            .map_err(|e| Error::translation(target, format!("invalid response data: {}", e)))?;
        if !status.is_success() {
            return Err(Error::translation(
                target,
                format!("service returned {}: {}", status, text.trim()),
            ));
        }
        parse_chat_response(&text, texts.len(), target)
    }
}
