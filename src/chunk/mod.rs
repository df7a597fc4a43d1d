//! Splitting flattened repositories into bounded chunks

use serde::{Deserialize, Serialize};

use crate::utils::estimate_tokens;

pub mod boundary_chunker;
pub mod normalize;

pub use boundary_chunker::BoundaryChunker;
pub use normalize::normalize_flattened;

/// Separator line the flattener puts around file headers.
pub const FILE_BOUNDARY_MARKER: &str = "================";

/// Default chunk size in characters.
pub const DEFAULT_MAX_CHUNK_CHARS: usize = 100_000;

/// Which chunks of an oversized codebase get reviewed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChunkPolicy {
    /// Review only the first chunk; the rest is dropped with a warning.
    #[default]
    First,
    /// Review every chunk in order and merge the results.
    Merge,
}

impl ChunkPolicy {
    pub fn select<'a>(&self, chunks: Vec<&'a str>) -> Vec<&'a str> {
        match self {
            Self::First => {
                if chunks.len() > 1 {
                    let skipped: usize = chunks[1..].iter().map(|c| estimate_tokens(c)).sum();
                    tracing::warn!(
                        chunks = chunks.len(),
                        skipped_tokens = skipped,
                        "Code was split into {} chunks. Only reviewing the first chunk.",
                        chunks.len()
                    );
                }
                chunks.into_iter().take(1).collect()
            }
            Self::Merge => chunks,
        }
    }
}
