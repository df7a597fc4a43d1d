//! Integration tests for CLI

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

/// Command with a clean provider environment, run from an empty directory so
/// no `.env` or `code-review.toml` leaks in.
fn cli(workdir: &TempDir) -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("code-review-server"));
    cmd.current_dir(workdir.path());
    for var in [
        "LLM_PROVIDER",
        "OPENAI_API_KEY",
        "ANTHROPIC_API_KEY",
        "GEMINI_API_KEY",
        "OPENAI_MODEL",
        "ANTHROPIC_MODEL",
        "GEMINI_MODEL",
        "RUST_LOG",
    ] {
        cmd.env_remove(var);
    }
    cmd
}

#[test]
fn test_cli_version() {
    let tmp = TempDir::new().unwrap();
    cli(&tmp).arg("--version").assert().success().stdout(predicate::str::contains("code-review-server"));
}

#[test]
fn test_cli_help() {
    let tmp = TempDir::new().unwrap();
    cli(&tmp)
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("serve"))
        .stdout(predicate::str::contains("analyze"))
        .stdout(predicate::str::contains("review"))
        .stdout(predicate::str::contains("review-file"));
}

#[test]
fn test_review_rejects_invalid_detail_level() {
    let tmp = TempDir::new().unwrap();
    cli(&tmp)
        .args(["review", ".", "--detail", "verbose"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid detail level"));
}

#[test]
fn test_review_rejects_invalid_focus_area() {
    let tmp = TempDir::new().unwrap();
    cli(&tmp)
        .args(["review", ".", "--focus", "security,style"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid focus area"));
}

#[test]
fn test_review_requires_provider() {
    let tmp = TempDir::new().unwrap();
    cli(&tmp)
        .args(["review", "."])
        .assert()
        .failure()
        .stderr(predicate::str::contains("LLM_PROVIDER environment variable is not set"));
}

#[test]
fn test_review_file_requires_api_key() {
    let tmp = TempDir::new().unwrap();
    fs::write(tmp.path().join("main.rs"), "fn main() {}\n").unwrap();
    cli(&tmp)
        .env("LLM_PROVIDER", "GEMINI")
        .args(["review-file", "main.rs"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("GEMINI_API_KEY"));
}

#[test]
fn test_unsupported_provider_is_reported() {
    let tmp = TempDir::new().unwrap();
    cli(&tmp)
        .env("LLM_PROVIDER", "MISTRAL")
        .args(["review", "."])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unsupported LLM provider: MISTRAL"));
}

#[test]
fn test_explicit_invalid_config_fails() {
    let tmp = TempDir::new().unwrap();
    fs::write(tmp.path().join("bad.toml"), "max_chunk_chars = 'many'\n").unwrap();
    cli(&tmp)
        .args(["--config", "bad.toml", "analyze", "."])
        .assert()
        .failure()
        .stderr(predicate::str::contains("bad.toml"));
}

#[test]
fn test_analyze_reports_missing_flattener() {
    let tmp = TempDir::new().unwrap();
    fs::write(
        tmp.path().join("code-review.toml"),
        "[flattener]\ncommand = 'code-review-test-no-such-binary'\n",
    )
    .unwrap();
    cli(&tmp)
        .args(["analyze", "."])
        .assert()
        .failure()
        .stderr(predicate::str::contains("not found"));
}

#[cfg(unix)]
mod with_fake_flattener {
    use super::*;
    use std::os::unix::fs::PermissionsExt;
    use std::path::{Path, PathBuf};

    /// Shell script standing in for repomix: writes a fixed flattened
    /// document to the `--output` path.
    fn fake_repomix(dir: &Path) -> PathBuf {
        let path = dir.join("fake-repomix");
        fs::write(
            &path,
            "#!/bin/sh\nout=\"\"\nwhile [ $# -gt 0 ]; do\n  case \"$1\" in\n    --output) out=\"$2\"; shift 2 ;;\n    *) shift ;;\n  esac\ndone\nprintf 'File: src/main.rs\\nfn main() {}\\n' > \"$out\"\n",
        )
        .unwrap();
        let mut perms = fs::metadata(&path).unwrap().permissions();
        perms.set_mode(0o755);
        fs::set_permissions(&path, perms).unwrap();
        path
    }

    fn config_for(dir: &Path, flattener: &Path) -> PathBuf {
        let config = dir.join("review.toml");
        fs::write(&config, format!("[flattener]\ncommand = '{}'\n", flattener.display())).unwrap();
        config
    }

    #[test]
    fn test_analyze_prints_flattened_text() {
        let tmp = TempDir::new().unwrap();
        let repo = TempDir::new().unwrap();
        let config = config_for(tmp.path(), &fake_repomix(tmp.path()));

        cli(&tmp)
            .arg("--config")
            .arg(&config)
            .arg("analyze")
            .arg(repo.path())
            .assert()
            .success()
            .stdout(predicate::str::contains("File: src/main.rs"))
            .stdout(predicate::str::contains("fn main() {}"));
    }

    #[test]
    fn test_analyze_writes_output_file() {
        let tmp = TempDir::new().unwrap();
        let repo = TempDir::new().unwrap();
        let config = config_for(tmp.path(), &fake_repomix(tmp.path()));
        let out = tmp.path().join("flat.txt");

        cli(&tmp)
            .arg("--config")
            .arg(&config)
            .arg("analyze")
            .arg(repo.path())
            .arg("--output")
            .arg(&out)
            .assert()
            .success()
            .stderr(predicate::str::contains("Wrote"));

        assert_eq!(fs::read_to_string(&out).unwrap(), "File: src/main.rs\nfn main() {}\n");
    }
}

#[tokio::test(flavor = "multi_thread")]
async fn test_review_file_against_mock_provider() {
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    let server = MockServer::start().await;
    let review = serde_json::json!({
        "summary": "Minimal program",
        "issues": [{
            "type": "QUALITY",
            "severity": "LOW",
            "description": "No error handling",
            "line_numbers": [1],
            "recommendation": "Return a Result from main"
        }],
        "strengths": ["Short"],
        "recommendations": ["Add tests"]
    });
    let body = serde_json::json!({
        "choices": [{ "message": { "role": "assistant", "content": review.to_string() } }]
    });
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(body.to_string(), "application/json"))
        .expect(1)
        .mount(&server)
        .await;

    let tmp = TempDir::new().unwrap();
    fs::write(tmp.path().join("main.rs"), "fn main() {}\n").unwrap();
    fs::write(
        tmp.path().join("code-review.toml"),
        format!("[llm]\napi_base = '{}'\n", server.uri()),
    )
    .unwrap();

    let mut cmd = cli(&tmp);
    cmd.env("LLM_PROVIDER", "OPEN_AI")
        .env("OPENAI_API_KEY", "sk-test")
        .args(["review-file", "main.rs", "--json"]);
    let output = tokio::task::spawn_blocking(move || cmd.output()).await.unwrap().unwrap();

    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));
    let printed: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(printed, review);
}
