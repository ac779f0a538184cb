//! Basic CLI E2E tests.
//!
//! Each test runs the built binary against its own temporary data dir.

use std::process::{Command, Stdio};

use tempfile::TempDir;

/// Run a CLI command and return (stdout, stderr, exit code).
fn run_cli(dir: &TempDir, args: &[&str]) -> (String, String, i32) {
    let output = Command::new(env!("CARGO_BIN_EXE_flocus"))
        .args(args)
        .env("FLOCUS_DATA_DIR", dir.path())
        .env_remove("FLOCUS_DEBUG")
        .stdin(Stdio::null())
        .output()
        .expect("Failed to execute CLI command");

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    let code = output.status.code().unwrap_or(-1);

    (stdout, stderr, code)
}

fn json(stdout: &str) -> serde_json::Value {
    serde_json::from_str(stdout).expect("stdout is not JSON")
}

#[test]
fn test_timer_status_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let (stdout, _, code) = run_cli(&dir, &["timer", "status"]);
    assert_eq!(code, 0);
    let snapshot = json(&stdout);
    assert_eq!(snapshot["type"], "StateSnapshot");
    assert_eq!(snapshot["phase"], "focus");
    assert_eq!(snapshot["remaining_secs"], 1500);
    assert_eq!(snapshot["status"], "idle");
}

#[test]
fn test_timer_status_short() {
    let dir = tempfile::tempdir().unwrap();
    let (stdout, _, code) = run_cli(&dir, &["timer", "status", "--short"]);
    assert_eq!(code, 0);
    assert_eq!(stdout.trim(), "Focus 25:00 (session 1/4, streak 0)");
}

#[test]
fn test_skip_persists_between_runs() {
    let dir = tempfile::tempdir().unwrap();
    let (stdout, _, code) = run_cli(&dir, &["timer", "skip"]);
    assert_eq!(code, 0);
    let event = json(&stdout);
    assert_eq!(event["type"], "PhaseCompleted");
    assert_eq!(event["to"], "shortBreak");
    assert_eq!(event["skipped"], true);

    let (stdout, _, _) = run_cli(&dir, &["timer", "status"]);
    let snapshot = json(&stdout);
    assert_eq!(snapshot["phase"], "shortBreak");
    assert_eq!(snapshot["session_index"], 1);
    assert_eq!(snapshot["remaining_secs"], 300);
}

#[test]
fn test_settings_clamp_and_apply() {
    let dir = tempfile::tempdir().unwrap();
    let (stdout, _, code) = run_cli(
        &dir,
        &["settings", "set", "--focus", "500", "--short-break", "abc"],
    );
    assert_eq!(code, 0);
    assert_eq!(json(&stdout)["applied_now"], true);

    let (stdout, _, _) = run_cli(&dir, &["settings", "show"]);
    let shown = json(&stdout);
    assert_eq!(shown["focus"], 120);
    assert_eq!(shown["shortBreak"], 1);
    assert_eq!(shown["longBreak"], 15);

    let (stdout, _, _) = run_cli(&dir, &["timer", "status"]);
    assert_eq!(json(&stdout)["remaining_secs"], 7200);
}

#[test]
fn test_tasks_add_toggle_delete() {
    let dir = tempfile::tempdir().unwrap();
    let (stdout, _, code) = run_cli(&dir, &["tasks", "add", "Write intro"]);
    assert_eq!(code, 0);
    let item = json(&stdout);
    let id = item["id"].as_str().unwrap().to_string();
    assert_eq!(item["completed"], false);

    let (_, _, code) = run_cli(&dir, &["tasks", "toggle", "1", &id]);
    assert_eq!(code, 0);
    let (stdout, _, _) = run_cli(&dir, &["tasks", "list", "--session", "1"]);
    let entry = json(&stdout);
    assert_eq!(entry["sessionNumber"], 1);
    assert_eq!(entry["todos"][0]["completed"], true);

    let (_, _, code) = run_cli(&dir, &["tasks", "delete", "1", &id]);
    assert_eq!(code, 0);
    let (_, stderr, code) = run_cli(&dir, &["tasks", "delete", "1", &id]);
    assert_eq!(code, 1);
    assert!(stderr.contains("task not found"));
}

#[test]
fn test_tasks_reject_bad_session() {
    let dir = tempfile::tempdir().unwrap();
    let (_, stderr, code) = run_cli(&dir, &["tasks", "add", "x", "--session", "5"]);
    assert_eq!(code, 1);
    assert!(stderr.starts_with("error:"));
}

#[test]
fn test_progress_reset_keeps_settings() {
    let dir = tempfile::tempdir().unwrap();
    run_cli(&dir, &["settings", "set", "--focus", "30"]);
    run_cli(&dir, &["timer", "skip"]);
    let (stdout, _, code) = run_cli(&dir, &["progress", "reset"]);
    assert_eq!(code, 0);
    assert_eq!(json(&stdout)["type"], "ProgressReset");

    let (stdout, _, _) = run_cli(&dir, &["timer", "status"]);
    let snapshot = json(&stdout);
    assert_eq!(snapshot["phase"], "focus");
    assert_eq!(snapshot["session_index"], 0);
    assert_eq!(snapshot["remaining_secs"], 1800);
}

#[test]
fn test_config_set_get_roundtrip() {
    let dir = tempfile::tempdir().unwrap();
    let (_, _, code) = run_cli(&dir, &["config", "set", "quote.timeout_secs", "4"]);
    assert_eq!(code, 0);
    let (stdout, _, _) = run_cli(&dir, &["config", "get", "quote.timeout_secs"]);
    assert_eq!(stdout.trim(), "4");

    let (_, stderr, code) = run_cli(&dir, &["config", "get", "quote.nope"]);
    assert_eq!(code, 1);
    assert!(stderr.contains("unknown key"));
}

#[test]
fn test_quote_falls_back_when_service_is_down() {
    let dir = tempfile::tempdir().unwrap();
    run_cli(&dir, &["config", "set", "quote.endpoint", "http://127.0.0.1:9/q"]);
    run_cli(&dir, &["config", "set", "quote.min_display_secs", "0"]);
    let (stdout, _, code) = run_cli(&dir, &["quote"]);
    assert_eq!(code, 0);
    let quote = json(&stdout);
    assert!(!quote["text"].as_str().unwrap().is_empty());
    assert!(!quote["author"].as_str().unwrap().is_empty());
}

#[test]
fn test_timer_start_runs_one_phase() {
    let dir = tempfile::tempdir().unwrap();
    run_cli(&dir, &["config", "set", "timer.tick_interval_ms", "1"]);
    run_cli(&dir, &["settings", "set", "--focus", "1"]);
    let (stdout, _, code) = run_cli(&dir, &["timer", "start", "--no-quote"]);
    assert_eq!(code, 0);

    let events: Vec<serde_json::Value> = stdout.lines().map(json).collect();
    assert_eq!(events.first().unwrap()["type"], "TimerStarted");
    let last = events.last().unwrap();
    assert_eq!(last["type"], "PhaseCompleted");
    assert_eq!(last["from"], "focus");
    assert_eq!(last["skipped"], false);

    let (stdout, _, _) = run_cli(&dir, &["timer", "status"]);
    assert_eq!(json(&stdout)["phase"], "shortBreak");
}

#[test]
fn test_timer_start_prints_quote_after_focus() {
    let dir = tempfile::tempdir().unwrap();
    run_cli(&dir, &["config", "set", "timer.tick_interval_ms", "1"]);
    run_cli(&dir, &["config", "set", "quote.endpoint", "http://127.0.0.1:9/q"]);
    run_cli(&dir, &["config", "set", "quote.min_display_secs", "0"]);
    run_cli(&dir, &["settings", "set", "--focus", "1"]);
    let (stdout, _, code) = run_cli(&dir, &["timer", "start"]);
    assert_eq!(code, 0);

    let lines: Vec<serde_json::Value> = stdout.lines().map(json).collect();
    let completed = lines
        .iter()
        .position(|v| v["type"] == "PhaseCompleted")
        .expect("no PhaseCompleted line");
    let quote = lines.last().unwrap();
    assert!(completed < lines.len() - 1);
    assert!(quote.get("type").is_none());
    assert!(!quote["author"].as_str().unwrap().is_empty());
}
