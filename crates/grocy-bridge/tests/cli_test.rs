//! Integration tests for the `grocy-bridge` binary.
//!
//! Argument parsing, help output, completions and error exit codes run
//! without a Grocy server; the rest talk to a wiremock one.
#![allow(clippy::unwrap_used)]

use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use serde_json::json;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

// ── Helpers ─────────────────────────────────────────────────────────

/// The `grocy-bridge` binary with env isolation.
///
/// Clears all `GROCY_BRIDGE_*` env vars and points config directories at
/// a nonexistent path so tests never touch the user's real configuration.
fn bridge_cmd() -> assert_cmd::Command {
    let mut cmd = cargo_bin_cmd!("grocy-bridge");
    cmd.env("HOME", "/tmp/grocy-bridge-test-nonexistent")
        .env("XDG_CONFIG_HOME", "/tmp/grocy-bridge-test-nonexistent")
        .env_remove("GROCY_BRIDGE_PROFILE")
        .env_remove("GROCY_BRIDGE_URL")
        .env_remove("GROCY_BRIDGE_PORT")
        .env_remove("GROCY_BRIDGE_API_KEY")
        .env_remove("GROCY_BRIDGE_OUTPUT")
        .env_remove("GROCY_BRIDGE_INSECURE")
        .env_remove("GROCY_BRIDGE_TIMEOUT")
        .env_remove("GROCY_BRIDGE_LISTEN")
        .env_remove("RUST_LOG");
    cmd
}

/// Same, pointed at `grocy` through flags alone.
fn bridge_cmd_for(grocy: &MockServer) -> assert_cmd::Command {
    let addr = grocy.address();
    let mut cmd = bridge_cmd();
    cmd.args([
        "--url",
        &format!("http://{}", addr.ip()),
        "--port",
        &addr.port().to_string(),
        "--api-key",
        "test-key",
    ]);
    cmd
}

fn combined_output(output: &std::process::Output) -> String {
    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);
    format!("{stdout}{stderr}")
}

// ── Basic invocation ────────────────────────────────────────────────

#[test]
fn test_no_args_shows_help() {
    let output = bridge_cmd().output().unwrap();
    assert_eq!(output.status.code(), Some(2));
    let text = combined_output(&output);
    assert!(text.contains("Usage"), "Expected 'Usage' in output:\n{text}");
}

#[test]
fn test_help_flag() {
    bridge_cmd().arg("--help").assert().success().stdout(
        predicate::str::contains("serve")
            .and(predicate::str::contains("entities"))
            .and(predicate::str::contains("todo"))
            .and(predicate::str::contains("call")),
    );
}

#[test]
fn test_version_flag() {
    bridge_cmd()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("grocy-bridge"));
}

#[test]
fn test_invalid_subcommand() {
    let output = bridge_cmd().arg("frobnicate").output().unwrap();
    assert_eq!(output.status.code(), Some(2));
}

#[test]
fn test_unknown_entity_key_rejected() {
    let output = bridge_cmd().args(["fetch", "pantry"]).output().unwrap();
    assert_eq!(output.status.code(), Some(2));
    assert!(combined_output(&output).contains("pantry"));
}

// ── Shell completions ───────────────────────────────────────────────

#[test]
fn test_completions() {
    for shell in ["bash", "zsh", "fish"] {
        bridge_cmd()
            .args(["completions", shell])
            .assert()
            .success()
            .stdout(predicate::str::is_empty().not());
    }
}

// ── No server configured ────────────────────────────────────────────

#[test]
fn test_entities_without_config() {
    let output = bridge_cmd().arg("entities").output().unwrap();
    assert_eq!(output.status.code(), Some(2));
    assert!(combined_output(&output).contains("config init"));
}

#[test]
fn test_unknown_profile() {
    let output = bridge_cmd()
        .args(["--profile", "attic", "entities"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(4));
}

#[test]
fn test_config_path_prints_location() {
    bridge_cmd()
        .args(["config", "path"])
        .assert()
        .success()
        .stdout(predicate::str::contains("config.toml"));
}

#[test]
fn test_call_lists_services_offline() {
    bridge_cmd().arg("call").assert().success().stdout(
        predicate::str::contains("complete_task")
            .and(predicate::str::contains("execute_chore"))
            .and(predicate::str::contains("consume_product_from_stock")),
    );
}

#[test]
fn test_call_rejects_bad_payload() {
    let output = bridge_cmd()
        .args(["--url", "http://127.0.0.1", "--api-key", "k"])
        .args(["call", "complete_task", "--data", "{not json"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(2));
}

#[test]
fn test_serve_rejects_short_poll_interval() {
    let output = bridge_cmd()
        .args(["--url", "http://127.0.0.1", "--api-key", "k"])
        .args(["serve", "--poll-interval", "5s"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(2));
}

// ── Against a mock Grocy ────────────────────────────────────────────

async fn mock_grocy() -> MockServer {
    let grocy = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/system/info"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "grocy_version": {"Version": "4.2.0", "ReleaseDate": "2024-03-01"},
            "php_version": "8.2.0",
            "sqlite_version": "3.45.0"
        })))
        .mount(&grocy)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/tasks"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"id": 1, "name": "Taxes", "due_date": "2000-01-01"},
            {"id": 2, "name": "Laundry", "due_date": "2999-01-01"}
        ])))
        .mount(&grocy)
        .await;
    grocy
}

#[tokio::test(flavor = "multi_thread")]
async fn test_check_reports_version() {
    let grocy = mock_grocy().await;
    bridge_cmd_for(&grocy)
        .args(["check", "--output", "plain"])
        .assert()
        .success()
        .stdout(predicate::str::contains("4.2.0"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_fetch_lists_record_ids() {
    let grocy = mock_grocy().await;
    let output = bridge_cmd_for(&grocy)
        .args(["fetch", "tasks", "-o", "plain"])
        .output()
        .unwrap();
    assert!(output.status.success(), "{}", combined_output(&output));
    assert_eq!(String::from_utf8_lossy(&output.stdout).trim(), "1\n2");
}

#[tokio::test(flavor = "multi_thread")]
async fn test_rejected_key_exits_with_auth_code() {
    let grocy = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/system/info"))
        .respond_with(
            ResponseTemplate::new(401).set_body_json(json!({"error_message": "Unauthorized"})),
        )
        .mount(&grocy)
        .await;

    let output = bridge_cmd_for(&grocy).arg("check").output().unwrap();
    assert_eq!(output.status.code(), Some(3));
}
