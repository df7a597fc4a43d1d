//! Configuration loading
//!
//! Provider choice and secrets come from the environment (`LLM_PROVIDER` and
//! the provider's API key). Everything else comes from an optional config
//! file, falling back to defaults.

use serde::{Deserialize, Serialize};

use crate::chunk::{ChunkPolicy, DEFAULT_MAX_CHUNK_CHARS};
use crate::retry::RetryPolicy;

pub mod llm;
pub mod loader;

pub use llm::{LlmConfig, ProviderKind};
pub use loader::load_settings;

/// Non-secret settings read from `code-review.toml` / `code-review.yml`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    /// Chunk size limit in characters.
    pub max_chunk_chars: usize,
    pub chunk_policy: ChunkPolicy,
    pub retry: RetryPolicy,
    pub flattener: FlattenerSettings,
    pub llm: LlmSettings,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            max_chunk_chars: DEFAULT_MAX_CHUNK_CHARS,
            chunk_policy: ChunkPolicy::default(),
            retry: RetryPolicy::default(),
            flattener: FlattenerSettings::default(),
            llm: LlmSettings::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FlattenerSettings {
    /// Executable to run; looked up on `PATH` when not absolute.
    pub command: String,
    /// Passed before the generated arguments.
    pub extra_args: Vec<String>,
}

impl Default for FlattenerSettings {
    fn default() -> Self {
        Self { command: "repomix".to_string(), extra_args: Vec::new() }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LlmSettings {
    pub temperature: f32,
    pub max_tokens: u32,
    pub timeout_secs: u64,
    /// Replaces the provider's public base URL (proxies, tests).
    pub api_base: Option<String>,
}

impl Default for LlmSettings {
    fn default() -> Self {
        Self { temperature: 0.0, max_tokens: 4000, timeout_secs: 300, api_base: None }
    }
}
