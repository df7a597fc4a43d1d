//! Prompt text sent to the model

use crate::domain::{DetailLevel, FocusArea, ReviewOptions};

const PREAMBLE: &str = "You are an expert code reviewer with deep knowledge of programming best \
practices, security, and performance optimization.

TASK:
Review the provided code and deliver a structured analysis following these guidelines.";

const APPROACH: &str = "ANALYSIS APPROACH:
1. First pass: Get a high-level understanding of the code structure and purpose
2. Second pass: Identify potential issues based on the focus areas
3. Third pass: Evaluate implementation quality and identify strengths
4. Final pass: Formulate specific, actionable recommendations";

const RESPONSE_FORMAT: &str = r#"RESPONSE FORMAT:
Your response must be valid JSON with the following structure:

{
  "summary": "Brief summary of the code purpose and overall assessment",
  "issues": [
    {
      "type": "SECURITY|PERFORMANCE|QUALITY|MAINTAINABILITY",
      "severity": "HIGH|MEDIUM|LOW",
      "description": "Clear description of the specific issue",
      "line_numbers": [12, 15],
      "recommendation": "Detailed, actionable suggestion to fix the issue"
    }
  ],
  "strengths": ["Description of code strengths and good practices identified"],
  "recommendations": ["Overall recommendations for improving the code"]
}"#;

const RULES: &str = "IMPORTANT:
- Be specific in your analysis
- Provide concrete examples when possible
- Include specific line numbers for issues when applicable
- Ensure recommendations are clear and actionable
- Maintain a balanced perspective, highlighting both issues and strengths
- Your response MUST be valid JSON";

fn focus_line(area: FocusArea) -> &'static str {
    match area {
        FocusArea::Security => {
            "- Security: Look for vulnerabilities (XSS, CSRF, injection attacks), \
             authentication/authorization issues, sensitive data exposure, insecure \
             dependencies, and unsafe operations"
        }
        FocusArea::Performance => {
            "- Performance: Identify inefficient algorithms, excessive resource usage, memory \
             leaks, unnecessary computations, unoptimized database queries, and scaling concerns"
        }
        FocusArea::Quality => {
            "- Quality: Analyze code clarity, naming conventions, adherence to design patterns, \
             separation of concerns, code duplication, excessive complexity, and testability"
        }
        FocusArea::Maintainability => {
            "- Maintainability: Assess documentation quality, test coverage, modularity, \
             extensibility, configuration management, dependency management, and architectural \
             coherence"
        }
    }
}

fn detail_line(level: DetailLevel) -> &'static str {
    match level {
        DetailLevel::Detailed => {
            "Provide a comprehensive, in-depth review with specific line references and \
             detailed explanations"
        }
        DetailLevel::Basic => {
            "Provide a high-level overview of key findings and most critical issues"
        }
    }
}

/// Build the review prompt for `code`.
pub fn build_review_prompt(code: &str, options: &ReviewOptions) -> String {
    let focus = options.focus_areas.iter().map(|a| focus_line(*a)).collect::<Vec<_>>().join("\n");

    let mut prompt = String::with_capacity(code.len() + 2048);
    prompt.push_str(PREAMBLE);
    prompt.push_str("\n\nFOCUS AREAS:\n");
    prompt.push_str(&focus);
    prompt.push_str("\n\nDETAIL LEVEL:\n");
    prompt.push_str(detail_line(options.detail_level));
    prompt.push_str("\n\n");
    prompt.push_str(APPROACH);
    prompt.push_str("\n\n");
    prompt.push_str(RESPONSE_FORMAT);
    prompt.push_str("\n\n");
    prompt.push_str(RULES);
    prompt.push_str("\n\nCODE TO REVIEW:\n");
    prompt.push_str(code);
    prompt.push('\n');
    prompt
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompt_lists_only_selected_areas() {
        let options = ReviewOptions::from_parts(
            Some(DetailLevel::Basic),
            Some(vec![FocusArea::Security, FocusArea::Quality]),
        );
        let prompt = build_review_prompt("fn main() {}", &options);

        assert!(prompt.contains("- Security: Look for vulnerabilities"));
        assert!(prompt.contains("- Quality: Analyze code clarity"));
        assert!(!prompt.contains("- Performance:"));
        assert!(!prompt.contains("- Maintainability:"));
        assert!(prompt.contains("high-level overview of key findings"));
    }

    #[test]
    fn test_prompt_ends_with_code() {
        let prompt = build_review_prompt("let x = 1;", &ReviewOptions::default());

        assert!(prompt.contains("comprehensive, in-depth review"));
        assert!(prompt.contains("\"line_numbers\": [12, 15]"));
        assert!(prompt.ends_with("CODE TO REVIEW:\nlet x = 1;\n"));
    }

    #[test]
    fn test_line_continuations_keep_single_spaces() {
        let prompt = build_review_prompt("", &ReviewOptions::default());
        assert!(prompt.contains("best practices, security"));
        assert!(prompt.contains("insecure dependencies, and unsafe operations"));
        assert!(!prompt.contains("  dependencies"));
    }
}
