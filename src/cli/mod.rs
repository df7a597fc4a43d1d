//! Command-line interface for code-review-server
//!
//! `serve` runs the MCP stdio server; `analyze`, `review` and `review-file`
//! run the same pipeline once from the terminal.

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::Level;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::config::load_settings;

mod analyze;
mod review;
mod utils;

/// LLM-powered code reviews for local repositories
#[derive(Parser)]
#[command(name = "code-review-server")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging (sets log level to DEBUG)
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Settings file (TOML or YAML); defaults to code-review.toml in the
    /// working directory when present
    #[arg(short, long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the MCP server over stdio
    Serve,

    /// Flatten a repository and print the text the model would see
    Analyze(analyze::AnalyzeArgs),

    /// Flatten a repository and review it with the configured LLM
    Review(review::ReviewArgs),

    /// Review a single file without running the flattener
    ReviewFile(review::ReviewFileArgs),
}

pub async fn run() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    // RUST_LOG in the environment always takes precedence; --verbose falls back to DEBUG.
    // The server logs at INFO by default since its stderr is the only diagnostic channel.
    let level = if cli.verbose {
        Level::DEBUG
    } else if matches!(cli.command, Commands::Serve) {
        Level::INFO
    } else {
        Level::WARN
    };
    let filter = EnvFilter::from_default_env().add_directive(level.into());
    let _ = tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .try_init();

    let settings = load_settings(&std::env::current_dir()?, cli.config.as_deref())?;

    match cli.command {
        Commands::Serve => crate::server::serve(settings).await,
        Commands::Analyze(args) => analyze::run(args, settings).await,
        Commands::Review(args) => review::run(args, settings).await,
        Commands::ReviewFile(args) => review::run_file(args, settings).await,
    }
}
