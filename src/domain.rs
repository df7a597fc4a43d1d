//! Core domain types shared by the reviewer, the CLI and the MCP server

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// How thorough the requested review should be.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum DetailLevel {
    Basic,
    #[default]
    Detailed,
}

impl DetailLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Basic => "basic",
            Self::Detailed => "detailed",
        }
    }
}

impl FromStr for DetailLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "basic" => Ok(Self::Basic),
            "detailed" => Ok(Self::Detailed),
            other => Err(format!("Invalid detail level '{other}'. Use: basic, detailed")),
        }
    }
}

/// Review category used to steer prompt content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum FocusArea {
    Security,
    Performance,
    Quality,
    Maintainability,
}

impl FocusArea {
    pub const ALL: [FocusArea; 4] =
        [Self::Security, Self::Performance, Self::Quality, Self::Maintainability];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Security => "security",
            Self::Performance => "performance",
            Self::Quality => "quality",
            Self::Maintainability => "maintainability",
        }
    }
}

impl FromStr for FocusArea {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "security" => Ok(Self::Security),
            "performance" => Ok(Self::Performance),
            "quality" => Ok(Self::Quality),
            "maintainability" => Ok(Self::Maintainability),
            other => Err(format!(
                "Invalid focus area '{other}'. Use: security, performance, quality, maintainability"
            )),
        }
    }
}

/// Options controlling a single review request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReviewOptions {
    pub detail_level: DetailLevel,
    pub focus_areas: Vec<FocusArea>,
}

impl Default for ReviewOptions {
    fn default() -> Self {
        Self { detail_level: DetailLevel::Detailed, focus_areas: FocusArea::ALL.to_vec() }
    }
}

impl ReviewOptions {
    /// Build options from optional request fields, falling back to a detailed
    /// review of every focus area. An empty focus list counts as "not given".
    pub fn from_parts(
        detail_level: Option<DetailLevel>,
        focus_areas: Option<Vec<FocusArea>>,
    ) -> Self {
        let focus = focus_areas
            .filter(|areas| !areas.is_empty())
            .unwrap_or_else(|| FocusArea::ALL.to_vec());
        let mut seen = Vec::with_capacity(focus.len());
        for area in focus {
            if !seen.contains(&area) {
                seen.push(area);
            }
        }
        Self { detail_level: detail_level.unwrap_or_default(), focus_areas: seen }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum IssueType {
    #[serde(alias = "security")]
    Security,
    #[serde(alias = "performance")]
    Performance,
    #[serde(alias = "quality")]
    Quality,
    #[serde(alias = "maintainability")]
    Maintainability,
}

impl fmt::Display for IssueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Security => "SECURITY",
            Self::Performance => "PERFORMANCE",
            Self::Quality => "QUALITY",
            Self::Maintainability => "MAINTAINABILITY",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Severity {
    #[serde(alias = "high")]
    High,
    #[serde(alias = "medium")]
    Medium,
    #[serde(alias = "low")]
    Low,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::High => "HIGH",
            Self::Medium => "MEDIUM",
            Self::Low => "LOW",
        };
        f.write_str(s)
    }
}

/// A single finding reported by the model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviewIssue {
    #[serde(rename = "type")]
    pub issue_type: IssueType,
    pub severity: Severity,
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line_numbers: Option<Vec<u64>>,
    pub recommendation: String,
}

/// Structured review returned to callers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodeReviewResult {
    pub summary: String,
    pub issues: Vec<ReviewIssue>,
    pub strengths: Vec<String>,
    pub recommendations: Vec<String>,
}

impl CodeReviewResult {
    /// Merge per-chunk reviews into one result, in chunk order.
    ///
    /// Summaries are prefixed with `Part i/n:` when there is more than one
    /// part. Strengths and recommendations drop exact duplicates.
    pub fn merge(parts: Vec<CodeReviewResult>) -> Option<CodeReviewResult> {
        let total = parts.len();
        if total <= 1 {
            return parts.into_iter().next();
        }

        let mut merged = CodeReviewResult {
            summary: String::new(),
            issues: Vec::new(),
            strengths: Vec::new(),
            recommendations: Vec::new(),
        };
        let mut summaries = Vec::with_capacity(total);

        for (idx, part) in parts.into_iter().enumerate() {
            summaries.push(format!("Part {}/{}: {}", idx + 1, total, part.summary.trim()));
            merged.issues.extend(part.issues);
            push_unique(&mut merged.strengths, part.strengths);
            push_unique(&mut merged.recommendations, part.recommendations);
        }

        merged.summary = summaries.join("\n");
        Some(merged)
    }
}

fn push_unique(target: &mut Vec<String>, items: Vec<String>) {
    for item in items {
        if !target.contains(&item) {
            target.push(item);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn review(summary: &str, strengths: &[&str]) -> CodeReviewResult {
        CodeReviewResult {
            summary: summary.to_string(),
            issues: vec![ReviewIssue {
                issue_type: IssueType::Quality,
                severity: Severity::Low,
                description: format!("issue in {summary}"),
                line_numbers: None,
                recommendation: "fix".to_string(),
            }],
            strengths: strengths.iter().map(|s| s.to_string()).collect(),
            recommendations: vec!["add tests".to_string()],
        }
    }

    #[test]
    fn test_options_default_to_detailed_all_areas() {
        let opts = ReviewOptions::from_parts(None, Some(Vec::new()));
        assert_eq!(opts.detail_level, DetailLevel::Detailed);
        assert_eq!(opts.focus_areas, FocusArea::ALL.to_vec());
    }

    #[test]
    fn test_options_dedupe_focus_areas() {
        let opts = ReviewOptions::from_parts(
            Some(DetailLevel::Basic),
            Some(vec![FocusArea::Security, FocusArea::Security, FocusArea::Quality]),
        );
        assert_eq!(opts.focus_areas, vec![FocusArea::Security, FocusArea::Quality]);
    }

    #[test]
    fn test_parse_focus_area_rejects_unknown() {
        assert_eq!("Security".parse::<FocusArea>(), Ok(FocusArea::Security));
        assert!("style".parse::<FocusArea>().is_err());
        assert!("verbose".parse::<DetailLevel>().is_err());
    }

    #[test]
    fn test_issue_accepts_lowercase_enums() {
        let issue: ReviewIssue = serde_json::from_str(
            r#"{"type":"security","severity":"high","description":"d","recommendation":"r"}"#,
        )
        .expect("issue");
        assert_eq!(issue.issue_type, IssueType::Security);
        assert_eq!(issue.severity, Severity::High);
        assert!(issue.line_numbers.is_none());

        let out = serde_json::to_value(&issue).expect("json");
        assert_eq!(out["type"], "SECURITY");
        assert!(out.get("line_numbers").is_none());
    }

    #[test]
    fn test_merge_single_part_is_unchanged() {
        let one = review("only", &["tidy"]);
        assert_eq!(CodeReviewResult::merge(vec![one.clone()]), Some(one));
        assert_eq!(CodeReviewResult::merge(Vec::new()), None);
    }

    #[test]
    fn test_merge_multiple_parts() {
        let merged = CodeReviewResult::merge(vec![
            review("first", &["tidy", "typed"]),
            review("second", &["typed", "tested"]),
        ])
        .expect("merged");

        assert_eq!(merged.summary, "Part 1/2: first\nPart 2/2: second");
        assert_eq!(merged.issues.len(), 2);
        assert_eq!(merged.strengths, vec!["tidy", "typed", "tested"]);
        assert_eq!(merged.recommendations, vec!["add tests"]);
    }
}
