//! End-to-end review pipeline: flatten, chunk, prompt, call, parse, merge.

use std::path::Path;
use std::sync::Arc;

use crate::chunk::{normalize_flattened, BoundaryChunker, ChunkPolicy};
use crate::config::{LlmConfig, Settings};
use crate::domain::{CodeReviewResult, ReviewOptions};
use crate::error::{ReviewError, Result};
use crate::flatten::{read_flattened_file, FlattenRequest, Flattener};
use crate::llm::LlmClient;
use crate::retry::call_with_retry;

use super::parse::parse_review_response;
use super::prompt::build_review_prompt;

/// Reviews code with the configured LLM.
///
/// Holds only immutable state, so one instance can serve concurrent
/// requests; every call owns its chunks and retry loop.
pub struct CodeReviewService {
    settings: Arc<Settings>,
    llm: LlmClient,
    flattener: Flattener,
    chunker: BoundaryChunker,
    policy: ChunkPolicy,
}

impl CodeReviewService {
    pub fn new(settings: Arc<Settings>, config: &LlmConfig) -> Result<Self> {
        let llm = LlmClient::new(config, &settings.llm)?;
        let flattener = Flattener::new(&settings.flattener);
        let chunker = BoundaryChunker::new(settings.max_chunk_chars);
        let policy = settings.chunk_policy;
        Ok(Self { settings, llm, flattener, chunker, policy })
    }

    /// Flatten the repository at `repo_path` and review it.
    pub async fn review_repo(
        &self,
        repo_path: &Path,
        request: &FlattenRequest,
        options: &ReviewOptions,
    ) -> Result<CodeReviewResult> {
        let flattened = self.flattener.flatten(repo_path, request).await?;
        self.review_flattened(&flattened, options).await
    }

    /// Review an already flattened repository read from `path`.
    pub async fn review_flattened_file(
        &self,
        path: &Path,
        options: &ReviewOptions,
    ) -> Result<CodeReviewResult> {
        let flattened = read_flattened_file(path).await?;
        self.review_flattened(&flattened, options).await
    }

    /// Review a single source file, bypassing the flattener.
    pub async fn review_file(&self, path: &Path, options: &ReviewOptions) -> Result<CodeReviewResult> {
        let code = tokio::fs::read_to_string(path).await?;
        let name = path.file_name().map_or_else(
            || path.display().to_string(),
            |n| n.to_string_lossy().into_owned(),
        );
        self.review_flattened(&format!("File: {name}\n{code}"), options).await
    }

    /// Normalize flattener output, then review it.
    pub async fn review_flattened(&self, raw: &str, options: &ReviewOptions) -> Result<CodeReviewResult> {
        let normalized = normalize_flattened(raw);
        self.review_code(&normalized, options).await
    }

    /// Chunk `code`, review the chunks the policy selects and merge them.
    pub async fn review_code(&self, code: &str, options: &ReviewOptions) -> Result<CodeReviewResult> {
        let chunks = self.chunker.chunk(code);
        tracing::info!(chunks = chunks.len(), "Split code into {} chunk(s)", chunks.len());

        let selected = self.policy.select(chunks);
        let total = selected.len();
        let mut parts = Vec::with_capacity(total);

        for (idx, chunk) in selected.into_iter().enumerate() {
            tracing::debug!(chunk = idx + 1, total, chars = chunk.len(), "Reviewing chunk");
            parts.push(self.review_chunk(chunk, options).await?);
        }

        CodeReviewResult::merge(parts)
            .ok_or_else(|| ReviewError::MalformedResponse("no review was produced".to_string()))
    }

    async fn review_chunk(&self, chunk: &str, options: &ReviewOptions) -> Result<CodeReviewResult> {
        let prompt = build_review_prompt(chunk, options);
        let llm = &self.llm;
        let prompt = prompt.as_str();

        call_with_retry(&self.settings.retry, move || async move {
            let text = llm.generate(prompt).await?;
            parse_review_response(&text)
        })
        .await
    }
}
