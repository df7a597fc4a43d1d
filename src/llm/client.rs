//! HTTP client that sends prompts to the configured provider.

use std::time::Duration;

use reqwest::Client;
use serde_json::Value;

use super::provider::{provider_for, LlmProvider};
use crate::config::{LlmConfig, LlmSettings};
use crate::error::{ReviewError, Result};

/// Sends one prompt per call and returns the generated text.
pub struct LlmClient {
    http: Client,
    provider: Box<dyn LlmProvider>,
}

impl LlmClient {
    pub fn new(config: &LlmConfig, settings: &LlmSettings) -> Result<Self> {
        let http = Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs))
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| ReviewError::Config(format!("failed to build HTTP client: {e}")))?;

        Ok(Self { http, provider: provider_for(config, settings) })
    }

    /// POST the prompt and extract the model's text.
    ///
    /// Non-2xx responses become [`ReviewError::Api`] carrying the body so the
    /// caller can decide whether to retry.
    pub async fn generate(&self, prompt: &str) -> Result<String> {
        let request = self.provider.build_request(prompt);
        tracing::info!("Sending code review request to {}", self.provider.kind());

        let mut builder = self.http.post(&request.url).json(&request.body);
        for (name, value) in &request.headers {
            builder = builder.header(*name, value);
        }

        let response = builder.send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ReviewError::Api { status: status.as_u16(), body });
        }

        let text = response.text().await?;
        let json: Value = serde_json::from_str(&text).map_err(|e| {
            ReviewError::MalformedResponse(format!("provider response is not JSON: {e}"))
        })?;

        let generated = self.provider.extract_text(&json)?;
        tracing::debug!("Received {} characters from {}", generated.len(), self.provider.kind());
        Ok(generated)
    }
}
