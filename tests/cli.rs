use assert_cmd::Command;
use predicates::prelude::*;

fn summarizer() -> Command {
    let mut cmd = Command::cargo_bin("summarizer").unwrap();
    cmd.env_remove("GEMINI_API_KEY").env_remove("RUST_LOG");
    cmd
}

#[test]
fn test_models_lists_both_variants() {
    summarizer()
        .arg("models")
        .assert()
        .success()
        .stdout(predicate::str::contains("gemini-2.0-flash-exp"))
        .stdout(predicate::str::contains("gemini-2.0-flash -"));
}

#[test]
fn test_missing_api_key_fails_before_any_fetch() {
    summarizer()
        .args(["--quiet", "summarize", "https://www.youtube.com/watch?v=abc123", "--no-prompt"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("FAILED(START)"))
        .stderr(predicate::str::contains("API key"));
}

#[test]
fn test_empty_url_is_rejected() {
    summarizer()
        .args(["--quiet", "summarize", "", "--api-key", "k", "--no-prompt"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Please enter a YouTube URL"));
}

#[test]
fn test_invalid_proxy_is_rejected() {
    summarizer()
        .args([
            "--quiet",
            "summarize",
            "abc123",
            "--api-key",
            "k",
            "--proxy",
            "ftp://proxy.local",
            "--no-prompt",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Proxy must use one of"));
}

#[test]
fn test_config_file_override() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.yaml");
    fs_err::write(&path, "gemini:\n  default_model: gemini-2.0-flash\n").unwrap();

    summarizer()
        .arg("--config")
        .arg(&path)
        .arg("models")
        .assert()
        .success()
        .stdout(predicate::str::contains("gemini-2.0-flash - stable, standard quality (default)"));
}

#[test]
fn test_invalid_config_file_is_reported() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.yaml");
    fs_err::write(&path, "punctuation:\n  endpoint: not a url\n").unwrap();

    summarizer()
        .arg("--config")
        .arg(&path)
        .arg("models")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid punctuation.endpoint"));
}
