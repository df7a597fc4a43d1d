//! Analyze command implementation

use anyhow::{Context, Result};
use clap::Args;
use std::path::PathBuf;

use super::utils::{parse_csv, spinner};
use crate::config::Settings;
use crate::flatten::{FlattenRequest, Flattener};
use crate::utils::{estimate_tokens, format_with_commas};

#[derive(Args)]
pub struct AnalyzeArgs {
    /// Repository directory to flatten
    #[arg(value_name = "REPO_PATH")]
    pub repo_path: PathBuf,

    /// Only these files or directories, relative to the repository (comma-separated)
    #[arg(short = 'f', long, value_name = "PATHS")]
    pub files: Option<String>,

    /// Only these file types, e.g. ".rs,.toml" (comma-separated)
    #[arg(short = 't', long, value_name = "EXTS")]
    pub types: Option<String>,

    /// Write the flattened text to FILE instead of stdout
    #[arg(short = 'o', long, value_name = "FILE")]
    pub output: Option<PathBuf>,
}

pub async fn run(args: AnalyzeArgs, settings: Settings) -> Result<()> {
    let request = FlattenRequest::new(parse_csv(&args.files), parse_csv(&args.types));
    let flattener = Flattener::new(&settings.flattener);

    let progress = spinner("Flattening repository...");
    let flattened = flattener.flatten(&args.repo_path, &request).await;
    progress.finish_and_clear();
    let text = flattened?;

    match args.output {
        Some(path) => {
            std::fs::write(&path, &text)
                .with_context(|| format!("Failed writing {}", path.display()))?;
            eprintln!(
                "Wrote {} characters (~{} tokens) to {}",
                format_with_commas(text.chars().count() as u64),
                format_with_commas(estimate_tokens(&text) as u64),
                path.display()
            );
        }
        None => print!("{text}"),
    }

    Ok(())
}
