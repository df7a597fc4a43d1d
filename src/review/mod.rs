//! Code review: prompt building, reply parsing and the review pipeline

pub mod parse;
pub mod prompt;
pub mod service;

pub use parse::parse_review_response;
pub use prompt::build_review_prompt;
pub use service::CodeReviewService;
