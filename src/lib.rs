//! code-review-server: LLM code reviews for whole repositories
//!
//! Flattens a repository with an external tool, splits oversized output on
//! file boundaries, sends it to a hosted LLM and parses the structured review
//! that comes back. Exposed as an MCP stdio server and as a CLI.

pub mod chunk;
pub mod cli;
pub mod config;
pub mod domain;
pub mod error;
pub mod flatten;
pub mod llm;
pub mod retry;
pub mod review;
pub mod server;
pub mod utils;

pub use domain::{CodeReviewResult, DetailLevel, FocusArea, ReviewOptions};
pub use error::{ReviewError, Result};
