//! Basic CLI E2E tests.
//!
//! Tests invoke CLI commands via cargo run and verify outputs.

use std::process::Command;

/// Run a CLI command and return (stdout, stderr, exit code).
fn run_cli(args: &[&str]) -> (String, String, i32) {
    let output = Command::new("cargo")
        .args(["run", "-p", "focuslock-cli", "--"])
        .args(args)
        .output()
        .expect("Failed to execute CLI command");

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    let code = output.status.code().unwrap_or(-1);

    (stdout, stderr, code)
}

#[test]
fn test_help() {
    let (stdout, _, code) = run_cli(&["--help"]);
    assert_eq!(code, 0);
    assert!(stdout.contains("session"));
    assert!(stdout.contains("config"));
}

#[test]
fn test_config_list_is_json() {
    let (stdout, _, code) = run_cli(&["config", "list"]);
    assert_eq!(code, 0);
    let parsed: serde_json::Value =
        serde_json::from_str(&stdout).expect("config list should print JSON");
    assert!(parsed.get("session").is_some());
    assert!(parsed.get("enforcement").is_some());
}

#[test]
fn test_config_get_unknown_key_fails() {
    let (_, stderr, code) = run_cli(&["config", "get", "no.such.key"]);
    assert_ne!(code, 0);
    assert!(stderr.contains("unknown key"));
}

#[test]
fn test_session_start_one_shot() {
    let (stdout, stderr, code) = run_cli(&["session", "start", "--minutes", "5"]);
    assert_eq!(code, 0);
    assert!(stderr.contains("Timer started"));
    assert!(stdout.contains("SessionStarted"));
    assert!(stdout.contains("StateSnapshot"));
}

#[test]
fn test_session_start_with_hide_list() {
    let (stdout, _, code) = run_cli(&[
        "session",
        "start",
        "--minutes",
        "5",
        "--hide",
        "editorial,submissions",
    ]);
    assert_eq!(code, 0);
    assert!(stdout.contains("SectionsHidden"));
    assert!(stdout.contains("editorial"));
    assert!(stdout.contains("submissions"));
}

#[test]
fn test_session_start_rejects_unknown_section() {
    let (_, stderr, code) = run_cli(&["session", "start", "--hide", "comments"]);
    assert_ne!(code, 0);
    assert!(stderr.contains("Unknown section"));
}

#[test]
fn test_completions_bash() {
    let (stdout, _, code) = run_cli(&["completions", "bash"]);
    assert_eq!(code, 0);
    assert!(stdout.contains("focuslock-cli"));
}
