//! Request shapes for each hosted LLM API.

use serde_json::{json, Value};

use crate::config::{LlmConfig, LlmSettings, ProviderKind};
use crate::error::{ReviewError, Result};

/// A provider-specific HTTP request, ready to POST as JSON.
#[derive(Debug, Clone)]
pub struct ProviderRequest {
    pub url: String,
    pub headers: Vec<(&'static str, String)>,
    pub body: Value,
}

/// One hosted LLM API: how to ask it something and where the answer lives.
pub trait LlmProvider: Send + Sync {
    fn kind(&self) -> ProviderKind;

    fn build_request(&self, prompt: &str) -> ProviderRequest;

    /// Pull the generated text out of the provider's JSON envelope.
    fn extract_text(&self, response: &Value) -> Result<String>;
}

/// Settings shared by every provider implementation.
#[derive(Debug, Clone)]
struct Generation {
    base_url: String,
    model: String,
    api_key: String,
    temperature: f32,
    max_tokens: u32,
}

impl Generation {
    fn new(config: &LlmConfig, settings: &LlmSettings, default_base: &str) -> Self {
        let base = settings.api_base.as_deref().unwrap_or(default_base);
        Self {
            base_url: base.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            api_key: config.api_key.clone(),
            temperature: settings.temperature,
            max_tokens: settings.max_tokens,
        }
    }
}

/// Pick the provider implementation for `config`.
pub fn provider_for(config: &LlmConfig, settings: &LlmSettings) -> Box<dyn LlmProvider> {
    match config.provider {
        ProviderKind::OpenAi => Box::new(OpenAiProvider(Generation::new(
            config,
            settings,
            "https://api.openai.com",
        ))),
        ProviderKind::Anthropic => Box::new(AnthropicProvider(Generation::new(
            config,
            settings,
            "https://api.anthropic.com",
        ))),
        ProviderKind::Gemini => Box::new(GeminiProvider(Generation::new(
            config,
            settings,
            "https://generativelanguage.googleapis.com",
        ))),
    }
}

fn text_at(response: &Value, pointer: &str, provider: ProviderKind) -> Result<String> {
    response.pointer(pointer).and_then(Value::as_str).map(str::to_string).ok_or_else(|| {
        ReviewError::MalformedResponse(format!(
            "{provider} response has no text at {pointer}: {}",
            truncate(&response.to_string(), 500)
        ))
    })
}

fn truncate(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => format!("{}...", &text[..idx]),
        None => text.to_string(),
    }
}

/// OpenAI chat completions.
struct OpenAiProvider(Generation);

impl LlmProvider for OpenAiProvider {
    fn kind(&self) -> ProviderKind {
        ProviderKind::OpenAi
    }

    fn build_request(&self, prompt: &str) -> ProviderRequest {
        let g = &self.0;
        ProviderRequest {
            url: format!("{}/v1/chat/completions", g.base_url),
            headers: vec![("Authorization", format!("Bearer {}", g.api_key))],
            body: json!({
                "model": g.model,
                "messages": [{ "role": "user", "content": prompt }],
                "temperature": g.temperature,
                "max_tokens": g.max_tokens,
                "response_format": { "type": "json_object" },
            }),
        }
    }

    fn extract_text(&self, response: &Value) -> Result<String> {
        text_at(response, "/choices/0/message/content", self.kind())
    }
}

/// Anthropic messages API.
struct AnthropicProvider(Generation);

impl LlmProvider for AnthropicProvider {
    fn kind(&self) -> ProviderKind {
        ProviderKind::Anthropic
    }

    fn build_request(&self, prompt: &str) -> ProviderRequest {
        let g = &self.0;
        ProviderRequest {
            url: format!("{}/v1/messages", g.base_url),
            headers: vec![
                ("x-api-key", g.api_key.clone()),
                ("anthropic-version", "2023-06-01".to_string()),
            ],
            body: json!({
                "model": g.model,
                "messages": [{ "role": "user", "content": prompt }],
                "temperature": g.temperature,
                "max_tokens": g.max_tokens,
            }),
        }
    }

    fn extract_text(&self, response: &Value) -> Result<String> {
        text_at(response, "/content/0/text", self.kind())
    }
}

/// Gemini generateContent. The key travels in the query string.
struct GeminiProvider(Generation);

impl LlmProvider for GeminiProvider {
    fn kind(&self) -> ProviderKind {
        ProviderKind::Gemini
    }

    fn build_request(&self, prompt: &str) -> ProviderRequest {
        let g = &self.0;
        ProviderRequest {
            url: format!("{}/v1/models/{}:generateContent?key={}", g.base_url, g.model, g.api_key),
            headers: Vec::new(),
            body: json!({
                "contents": [{ "role": "user", "parts": [{ "text": prompt }] }],
                "generationConfig": {
                    "temperature": g.temperature,
                    "maxOutputTokens": g.max_tokens,
                },
            }),
        }
    }

    fn extract_text(&self, response: &Value) -> Result<String> {
        text_at(response, "/candidates/0/content/parts/0/text", self.kind())
    }
}
