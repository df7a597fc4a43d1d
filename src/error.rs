//! Error taxonomy for the review pipeline

use crate::retry::Retryable;

/// Errors raised while flattening, prompting or parsing a review.
#[derive(Debug, thiserror::Error)]
pub enum ReviewError {
    /// Missing or invalid configuration. Never retried.
    #[error("Configuration error: {0}")]
    Config(String),

    /// The request never produced an HTTP response (connect, timeout, reset).
    #[error("LLM request failed: {0}")]
    Transport(String),

    /// The provider answered with a non-success status.
    #[error("LLM API request failed: {status} - {body}")]
    Api { status: u16, body: String },

    /// The reply could not be turned into a review.
    #[error("Failed to parse LLM response: {0}")]
    MalformedResponse(String),

    /// The external flattener failed or is unavailable.
    #[error("Failed to flatten repository: {0}")]
    Flatten(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Retryable for ReviewError {
    fn is_retryable(&self) -> bool {
        match self {
            Self::Transport(_) => true,
            Self::Api { status, .. } => is_transient_status(*status),
            Self::Config(_) | Self::MalformedResponse(_) | Self::Flatten(_) | Self::Io(_) => false,
        }
    }
}

/// 408, 409, 429 and every 5xx are worth another attempt; other statuses
/// (bad key, bad request) will fail the same way again.
fn is_transient_status(status: u16) -> bool {
    matches!(status, 408 | 409 | 429) || (500..600).contains(&status)
}

impl From<reqwest::Error> for ReviewError {
    fn from(err: reqwest::Error) -> Self {
        // Gemini carries the API key in the query string.
        let err = err.without_url();
        if err.is_decode() {
            Self::MalformedResponse(err.to_string())
        } else if err.is_builder() {
            Self::Config(err.to_string())
        } else {
            Self::Transport(err.to_string())
        }
    }
}

pub type Result<T> = std::result::Result<T, ReviewError>;
