//! LLM provider configuration read from the environment

use std::fmt;
use std::str::FromStr;

use crate::error::{ReviewError, Result};

/// Hosted LLM APIs we know how to talk to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderKind {
    OpenAi,
    Anthropic,
    Gemini,
}

impl ProviderKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::OpenAi => "OPEN_AI",
            Self::Anthropic => "ANTHROPIC",
            Self::Gemini => "GEMINI",
        }
    }

    pub fn api_key_var(&self) -> &'static str {
        match self {
            Self::OpenAi => "OPENAI_API_KEY",
            Self::Anthropic => "ANTHROPIC_API_KEY",
            Self::Gemini => "GEMINI_API_KEY",
        }
    }

    pub fn model_var(&self) -> &'static str {
        match self {
            Self::OpenAi => "OPENAI_MODEL",
            Self::Anthropic => "ANTHROPIC_MODEL",
            Self::Gemini => "GEMINI_MODEL",
        }
    }

    pub fn default_model(&self) -> &'static str {
        match self {
            Self::OpenAi => "gpt-4o",
            Self::Anthropic => "claude-3-opus-20240229",
            Self::Gemini => "gemini-1.5-pro",
        }
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProviderKind {
    type Err = ReviewError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim() {
            "OPEN_AI" => Ok(Self::OpenAi),
            "ANTHROPIC" => Ok(Self::Anthropic),
            "GEMINI" => Ok(Self::Gemini),
            other => Err(ReviewError::Config(format!(
                "Unsupported LLM provider: {other}. Must be one of: OPEN_AI, ANTHROPIC, GEMINI"
            ))),
        }
    }
}

/// Provider, model and credentials, resolved once at startup.
#[derive(Clone, PartialEq, Eq)]
pub struct LlmConfig {
    pub provider: ProviderKind,
    pub model: String,
    pub api_key: String,
}

impl fmt::Debug for LlmConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LlmConfig")
            .field("provider", &self.provider)
            .field("model", &self.model)
            .field("api_key", &"<redacted>")
            .finish()
    }
}

impl LlmConfig {
    /// Read `LLM_PROVIDER`, the provider's API key and optional model
    /// override from the process environment.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Same as [`LlmConfig::from_env`] with an injectable variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let provider: ProviderKind = get("LLM_PROVIDER")
            .ok_or_else(|| {
                ReviewError::Config(
                    "LLM_PROVIDER environment variable is not set. Set it to OPEN_AI, ANTHROPIC, or GEMINI"
                        .to_string(),
                )
            })?
            .parse()?;

        let api_key = get(provider.api_key_var()).ok_or_else(|| {
            ReviewError::Config(format!(
                "{} environment variable is not set. This is required for the {} provider.",
                provider.api_key_var(),
                provider
            ))
        })?;

        let model =
            get(provider.model_var()).unwrap_or_else(|| provider.default_model().to_string());

        tracing::info!("Using LLM provider: {}, model: {}", provider, model);

        Ok(Self { provider, model, api_key })
    }
}
