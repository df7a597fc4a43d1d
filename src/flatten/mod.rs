//! Repository flattening via an external CLI (repomix)
//!
//! The flattener turns a directory tree into one plain-text document with a
//! `File: <path>` header per file. We only drive the subprocess and collect
//! its output.

use std::ffi::OsString;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::process::Stdio;

use tokio::process::Command;

use crate::config::FlattenerSettings;
use crate::error::{ReviewError, Result};
use crate::utils::normalize_path;

const OUTPUT_FILE_NAME: &str = "repomix-output.txt";

/// What to include in the flattened output.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FlattenRequest {
    /// Paths relative to the repository root. Empty means the whole tree.
    pub include_paths: Vec<String>,
    /// Extensions such as `.rs` or `ts`; empty means every file type.
    pub file_types: Vec<String>,
}

impl FlattenRequest {
    pub fn new(include_paths: Option<Vec<String>>, file_types: Option<Vec<String>>) -> Self {
        Self {
            include_paths: include_paths.unwrap_or_default(),
            file_types: file_types.unwrap_or_default(),
        }
    }
}

/// Runs the configured flattener command.
#[derive(Debug, Clone)]
pub struct Flattener {
    command: String,
    extra_args: Vec<String>,
}

impl Flattener {
    pub fn new(settings: &FlattenerSettings) -> Self {
        Self { command: settings.command.clone(), extra_args: settings.extra_args.clone() }
    }

    /// Flatten the repository at `repo_path` and return the text.
    pub async fn flatten(&self, repo_path: &Path, request: &FlattenRequest) -> Result<String> {
        let repo = validate_repo_path(repo_path)?;
        let out_dir = tempfile::tempdir()?;
        let output_path = out_dir.path().join(OUTPUT_FILE_NAME);
        let args = self.build_args(request, &output_path);

        tracing::info!("Flattening repository at {} with {}", repo.display(), self.command);
        tracing::debug!(?args, "flattener arguments");

        let output = Command::new(&self.command)
            .args(&args)
            .current_dir(&repo)
            .stdin(Stdio::null())
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|e| match e.kind() {
                ErrorKind::NotFound => ReviewError::Flatten(format!(
                    "command `{}` not found. Install repomix (npm install -g repomix) or set \
                     flattener.command in the config file",
                    self.command
                )),
                _ => ReviewError::Flatten(format!("failed to run `{}`: {e}", self.command)),
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(ReviewError::Flatten(format!(
                "`{}` exited with {}: {}",
                self.command,
                output.status,
                stderr.trim()
            )));
        }

        let text = match tokio::fs::read_to_string(&output_path).await {
            Ok(text) => text,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                String::from_utf8_lossy(&output.stdout).into_owned()
            }
            Err(e) => return Err(ReviewError::Flatten(format!("unreadable flattener output: {e}"))),
        };

        if text.trim().is_empty() {
            return Err(ReviewError::Flatten("flattener produced no output".to_string()));
        }

        tracing::info!("Flattened repository: {} characters", text.chars().count());
        Ok(text)
    }

    /// Command-line arguments for one run, writing to `output_path`.
    pub fn build_args(&self, request: &FlattenRequest, output_path: &Path) -> Vec<OsString> {
        let mut args: Vec<OsString> = self.extra_args.iter().map(OsString::from).collect();
        args.push("--style".into());
        args.push("plain".into());
        args.push("--output".into());
        args.push(output_path.as_os_str().to_owned());

        let globs = include_globs(&request.file_types);
        if !globs.is_empty() {
            args.push("--include".into());
            args.push(globs.join(",").into());
        }

        let paths: Vec<String> = request
            .include_paths
            .iter()
            .map(|p| p.trim())
            .filter(|p| !p.is_empty())
            .map(normalize_path)
            .collect();
        if paths.is_empty() {
            args.push(".".into());
        } else {
            args.extend(paths.into_iter().map(OsString::from));
        }

        args
    }
}

/// Read a previously written flattener output file.
pub async fn read_flattened_file(path: &Path) -> Result<String> {
    let text = tokio::fs::read_to_string(path).await.map_err(|e| {
        ReviewError::Flatten(format!("cannot read flattened output {}: {e}", path.display()))
    })?;
    if text.trim().is_empty() {
        return Err(ReviewError::Flatten(format!(
            "flattened output file is empty: {}",
            path.display()
        )));
    }
    Ok(text)
}

/// `.rs`, `rs` and `*.rs` all become `**/*.rs`.
fn include_globs(file_types: &[String]) -> Vec<String> {
    let mut globs = Vec::new();
    for raw in file_types {
        let ext = raw.trim().trim_start_matches('*').trim_start_matches('.');
        if ext.is_empty() {
            continue;
        }
        let glob = format!("**/*.{ext}");
        if !globs.contains(&glob) {
            globs.push(glob);
        }
    }
    globs
}

fn validate_repo_path(path: &Path) -> Result<PathBuf> {
    let canonical = path.canonicalize().map_err(|e| {
        ReviewError::Flatten(format!("repository path {} is not accessible: {e}", path.display()))
    })?;
    if !canonical.is_dir() {
        return Err(ReviewError::Flatten(format!(
            "repository path is not a directory: {}",
            path.display()
        )));
    }
    Ok(canonical)
}
