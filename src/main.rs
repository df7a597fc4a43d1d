//! code-review-server: Review repositories with hosted LLMs
//!
//! Runs as an MCP stdio server (`serve`) or as a one-shot CLI (`analyze`,
//! `review`, `review-file`).

use anyhow::Result;

#[tokio::main]
async fn main() -> Result<()> {
    code_review_server::cli::run().await
}
