//! Turning the model's reply into a [`CodeReviewResult`]

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;

use crate::domain::CodeReviewResult;
use crate::error::{ReviewError, Result};

/// A reply that is one fenced block and nothing else. Greedy, so fences
/// inside string values stay part of the body.
static WHOLE_FENCE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\A```(?:json)?\s*([\s\S]*)```\z").expect("whole fence regex is valid")
});

/// First fenced block of a reply with prose around it.
static FIRST_FENCE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"```(?:json)?\s*([\s\S]*?)```").expect("code fence regex is valid")
});

const REQUIRED_LISTS: [&str; 3] = ["issues", "strengths", "recommendations"];

/// Parse and validate a review reply.
///
/// The trimmed reply is parsed as JSON first; only when that fails is a
/// Markdown code fence unwrapped. Anything that does not match the review
/// schema is a [`ReviewError::MalformedResponse`]; the raw text is logged.
pub fn parse_review_response(text: &str) -> Result<CodeReviewResult> {
    parse_inner(text).inspect_err(|e| {
        tracing::error!(raw_response = %text, "Failed to parse LLM response: {e}");
    })
}

fn parse_inner(text: &str) -> Result<CodeReviewResult> {
    let value = reply_json(text)?;

    let Some(object) = value.as_object() else {
        return Err(ReviewError::MalformedResponse("reply is not a JSON object".to_string()));
    };

    match object.get("summary") {
        Some(Value::String(s)) if !s.trim().is_empty() => {}
        Some(Value::String(_)) => {
            return Err(ReviewError::MalformedResponse("`summary` is empty".to_string()));
        }
        Some(_) => {
            return Err(ReviewError::MalformedResponse("`summary` is not a string".to_string()));
        }
        None => return Err(ReviewError::MalformedResponse("missing `summary`".to_string())),
    }

    for field in REQUIRED_LISTS {
        match object.get(field) {
            Some(Value::Array(_)) => {}
            Some(_) => {
                return Err(ReviewError::MalformedResponse(format!("`{field}` is not an array")));
            }
            None => return Err(ReviewError::MalformedResponse(format!("missing `{field}`"))),
        }
    }

    serde_json::from_value(value)
        .map_err(|e| ReviewError::MalformedResponse(format!("unexpected review shape: {e}")))
}

fn reply_json(text: &str) -> Result<Value> {
    let trimmed = text.trim();
    let bare_err = match serde_json::from_str(trimmed) {
        Ok(value) => return Ok(value),
        Err(e) => e,
    };

    for fence in [&WHOLE_FENCE, &FIRST_FENCE] {
        let Some(body) = fence.captures(trimmed).and_then(|caps| caps.get(1)) else {
            continue;
        };
        if let Ok(value) = serde_json::from_str(body.as_str().trim()) {
            return Ok(value);
        }
    }

    Err(ReviewError::MalformedResponse(format!(
        "reply is not valid JSON and holds no fenced JSON block: {bare_err}"
    )))
}
