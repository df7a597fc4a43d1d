//! LLM provider abstraction and HTTP client

pub mod client;
pub mod provider;

pub use client::LlmClient;
pub use provider::{provider_for, LlmProvider, ProviderRequest};
