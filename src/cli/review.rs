//! Review and review-file command implementations

use anyhow::Result;
use clap::Args;
use console::style;
use std::fmt::Write as _;
use std::path::PathBuf;
use std::sync::Arc;

use super::utils::{parse_csv, spinner};
use crate::config::{LlmConfig, Settings};
use crate::domain::{CodeReviewResult, DetailLevel, FocusArea, ReviewOptions, Severity};
use crate::flatten::FlattenRequest;
use crate::review::CodeReviewService;

#[derive(Args)]
pub struct ReviewArgs {
    /// Repository directory to review
    #[arg(value_name = "REPO_PATH")]
    pub repo_path: PathBuf,

    /// Only these files or directories, relative to the repository (comma-separated)
    #[arg(short = 'f', long, value_name = "PATHS")]
    pub files: Option<String>,

    /// Only these file types, e.g. ".rs,.toml" (comma-separated)
    #[arg(short = 't', long, value_name = "EXTS")]
    pub types: Option<String>,

    #[command(flatten)]
    pub review: ReviewFlags,
}

#[derive(Args)]
pub struct ReviewFileArgs {
    /// File to review
    #[arg(value_name = "FILE")]
    pub file: PathBuf,

    /// FILE is flattener output (from `analyze --output`) rather than a source file
    #[arg(long)]
    pub flattened: bool,

    #[command(flatten)]
    pub review: ReviewFlags,
}

#[derive(Args)]
pub struct ReviewFlags {
    /// Level of detail: basic or detailed [default: detailed]
    #[arg(short = 'd', long, value_name = "LEVEL")]
    pub detail: Option<DetailLevel>,

    /// Areas to focus on: security, performance, quality, maintainability
    /// (comma-separated) [default: all]
    #[arg(long, value_name = "AREAS", value_delimiter = ',')]
    pub focus: Vec<FocusArea>,

    /// Print the review as JSON instead of a report
    #[arg(long)]
    pub json: bool,
}

impl ReviewFlags {
    fn options(&self) -> ReviewOptions {
        ReviewOptions::from_parts(self.detail, Some(self.focus.clone()))
    }
}

pub async fn run(args: ReviewArgs, settings: Settings) -> Result<()> {
    let service = build_service(settings)?;
    let request = FlattenRequest::new(parse_csv(&args.files), parse_csv(&args.types));

    let progress = spinner("Reviewing repository...");
    let review = service.review_repo(&args.repo_path, &request, &args.review.options()).await;
    progress.finish_and_clear();

    print_review(&review?, args.review.json)
}

pub async fn run_file(args: ReviewFileArgs, settings: Settings) -> Result<()> {
    let service = build_service(settings)?;
    let options = args.review.options();

    let progress = spinner("Reviewing file...");
    let review = if args.flattened {
        service.review_flattened_file(&args.file, &options).await
    } else {
        service.review_file(&args.file, &options).await
    };
    progress.finish_and_clear();

    print_review(&review?, args.review.json)
}

fn build_service(settings: Settings) -> Result<CodeReviewService> {
    let config = LlmConfig::from_env()?;
    Ok(CodeReviewService::new(Arc::new(settings), &config)?)
}

fn print_review(review: &CodeReviewResult, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(review)?);
    } else {
        print!("{}", render_report(review));
    }
    Ok(())
}

/// Human-readable report: summary, numbered issues, strengths, recommendations.
pub fn render_report(review: &CodeReviewResult) -> String {
    let mut out = String::new();

    let _ = writeln!(out, "{}", style("Summary").bold().underlined());
    let _ = writeln!(out, "{}\n", review.summary);

    if review.issues.is_empty() {
        let _ = writeln!(out, "{}\n", style("No issues found.").green());
    } else {
        let _ = writeln!(
            out,
            "{} ({})",
            style("Issues").bold().underlined(),
            review.issues.len()
        );
        for (idx, issue) in review.issues.iter().enumerate() {
            let severity = match issue.severity {
                Severity::High => style(issue.severity).red().bold(),
                Severity::Medium => style(issue.severity).yellow(),
                Severity::Low => style(issue.severity).cyan(),
            };
            let _ = write!(out, "{}. [{}] {}", idx + 1, severity, issue.issue_type);
            if let Some(lines) = issue.line_numbers.as_ref().filter(|l| !l.is_empty()) {
                let lines: Vec<String> = lines.iter().map(u64::to_string).collect();
                let _ = write!(out, " (lines {})", lines.join(", "));
            }
            let _ = writeln!(out);
            let _ = writeln!(out, "   {}", issue.description);
            let _ = writeln!(out, "   Fix: {}", issue.recommendation);
        }
        out.push('\n');
    }

    write_list(&mut out, "Strengths", &review.strengths);
    write_list(&mut out, "Recommendations", &review.recommendations);
    out
}

fn write_list(out: &mut String, title: &str, items: &[String]) {
    if items.is_empty() {
        return;
    }
    let _ = writeln!(out, "{}", style(title).bold().underlined());
    for item in items {
        let _ = writeln!(out, "  - {item}");
    }
    out.push('\n');
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{IssueType, ReviewIssue};

    #[test]
    fn test_render_report() {
        console::set_colors_enabled(false);
        let review = CodeReviewResult {
            summary: "A tidy little crate".into(),
            issues: vec![ReviewIssue {
                issue_type: IssueType::Security,
                severity: Severity::High,
                description: "Token logged in plain text".into(),
                line_numbers: Some(vec![12, 15]),
                recommendation: "Redact it".into(),
            }],
            strengths: vec!["Small modules".into()],
            recommendations: Vec::new(),
        };

        let report = render_report(&review);
        assert!(report.contains("A tidy little crate"));
        assert!(report.contains("1. [HIGH] SECURITY (lines 12, 15)"), "{report}");
        assert!(report.contains("   Fix: Redact it"));
        assert!(report.contains("  - Small modules"));
        assert!(!report.contains("Recommendations"));
    }

    #[test]
    fn test_render_report_without_issues() {
        console::set_colors_enabled(false);
        let review = CodeReviewResult {
            summary: "Fine".into(),
            issues: Vec::new(),
            strengths: Vec::new(),
            recommendations: vec!["Add CI".into()],
        };
        let report = render_report(&review);
        assert!(report.contains("No issues found."));
        assert!(report.contains("  - Add CI"));
    }
}
