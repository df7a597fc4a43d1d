//! Config file loading

use super::Settings;
use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

/// Section name that may wrap the settings inside a shared config file.
const SECTION: &str = "code-review";

const CANDIDATES: [&str; 4] =
    ["code-review.toml", ".code-review.toml", "code-review.yml", "code-review.yaml"];

/// Load settings from `config_path`, or from a file discovered in
/// `search_dir` when no path is given.
///
/// An explicit file that cannot be read or parsed is an error. A discovered
/// one only logs a warning and yields the defaults.
pub fn load_settings(search_dir: &Path, config_path: Option<&Path>) -> Result<Settings> {
    let explicit = config_path.is_some();

    let Some(config_file) = config_path.map(Path::to_path_buf).or_else(|| discover(search_dir))
    else {
        return Ok(Settings::default());
    };

    match read_settings(&config_file) {
        Ok(settings) => {
            tracing::debug!("Loaded settings from {}", config_file.display());
            Ok(settings)
        }
        Err(e) if !explicit => {
            tracing::warn!(
                "Ignoring auto-discovered config {}: {:#}",
                config_file.display(),
                e
            );
            Ok(Settings::default())
        }
        Err(e) => Err(e),
    }
}

fn read_settings(config_file: &Path) -> Result<Settings> {
    let content = fs::read_to_string(config_file)
        .with_context(|| format!("Failed reading config file: {}", config_file.display()))?;

    let ext = config_file.extension().and_then(|e| e.to_str()).unwrap_or("").to_ascii_lowercase();

    match ext.as_str() {
        "toml" => parse_toml(&content, config_file),
        "yaml" | "yml" => parse_yaml(&content, config_file),
        other => anyhow::bail!(
            "Unsupported config extension '.{}' for file {}",
            other,
            config_file.display()
        ),
    }
}

/// Parse TOML settings, unwrapping a `[code-review]` section if present.
fn parse_toml(content: &str, config_file: &Path) -> Result<Settings> {
    let raw: toml::Value = toml::from_str(content)
        .with_context(|| format!("Invalid TOML syntax: {}", config_file.display()))?;

    let value = match raw.get(SECTION) {
        Some(nested) => nested.clone(),
        None => raw,
    };

    value.try_into().with_context(|| format!("Invalid TOML config: {}", config_file.display()))
}

/// Parse YAML settings, unwrapping a `code-review:` section if present.
fn parse_yaml(content: &str, config_file: &Path) -> Result<Settings> {
    let raw: serde_yaml::Value = serde_yaml::from_str(content)
        .with_context(|| format!("Invalid YAML syntax: {}", config_file.display()))?;

    // An empty YAML document parses as null; treat it as "no settings".
    if raw.is_null() {
        return Ok(Settings::default());
    }

    let value = match raw.get(SECTION) {
        Some(nested) => nested.clone(),
        None => raw,
    };

    serde_yaml::from_value(value)
        .with_context(|| format!("Invalid YAML config: {}", config_file.display()))
}

fn discover(search_dir: &Path) -> Option<PathBuf> {
    CANDIDATES.iter().map(|name| search_dir.join(name)).find(|path| path.is_file())
}
