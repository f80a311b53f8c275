#![allow(clippy::unwrap_used, clippy::expect_used)]

//! Runs the `rage` binary against a mock Ollama server.

use serde_json::json;
use std::path::Path;
use std::process::Output;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn run_rage(dir: &Path, base_url: &str, args: &[&str]) -> Output {
    let config = dir.join("rage.toml");
    std::fs::write(
        &config,
        format!("[ollama]\napi_base_url = \"{base_url}\"\ntimeout_secs = 5\n"),
    )
    .unwrap();

    tokio::process::Command::new(env!("CARGO_BIN_EXE_rage"))
        .current_dir(dir)
        .env("RUST_LOG", "info")
        .arg("--config")
        .arg(&config)
        .arg("--data-dir")
        .arg(dir.join("data"))
        .args(args)
        .output()
        .await
        .unwrap()
}

#[tokio::test]
async fn stdout_carries_only_the_answer() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/generate"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"response": "hi there"})))
        .expect(1)
        .mount(&server)
        .await;

    let tmp = tempfile::tempdir().unwrap();
    let out = run_rage(tmp.path(), &server.uri(), &["ollama", "hello"]).await;

    assert!(out.status.success());
    assert_eq!(String::from_utf8(out.stdout).unwrap(), "AI Response: hi there\n");
    let logs = String::from_utf8(out.stderr).unwrap();
    assert!(logs.contains("Memory system initialized"));
}

#[tokio::test]
async fn model_failure_exits_nonzero_with_empty_stdout() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/generate"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .mount(&server)
        .await;

    let tmp = tempfile::tempdir().unwrap();
    let out = run_rage(tmp.path(), &server.uri(), &["ollama", "hello"]).await;

    assert!(!out.status.success());
    assert!(out.stdout.is_empty());
    assert!(String::from_utf8(out.stderr)
        .unwrap()
        .contains("Model request failed"));

    let log: serde_json::Value = serde_json::from_str(
        &std::fs::read_to_string(tmp.path().join("data/conversations/conversation.json"))
            .unwrap(),
    )
    .unwrap();
    assert_eq!(log, json!({"entries": []}));
}
