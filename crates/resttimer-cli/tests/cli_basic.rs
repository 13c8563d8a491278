//! Basic CLI E2E tests.
//!
//! Tests invoke the built binary with HOME pointed at a temporary directory
//! so config, preferences and history stay isolated.

use std::path::Path;
use std::process::Command;

/// Run a CLI command and return (exit code, stdout, stderr).
fn run_cli(home: &Path, args: &[&str]) -> (i32, String, String) {
    let output = Command::new(env!("CARGO_BIN_EXE_resttimer"))
        .args(args)
        .env("HOME", home)
        .env_remove("RESTTIMER_ENV")
        .output()
        .expect("Failed to execute CLI command");

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    let code = output.status.code().unwrap_or(-1);

    (code, stdout, stderr)
}

#[test]
fn test_suggest_final_compound_set() {
    let home = tempfile::tempdir().unwrap();
    let (code, stdout, stderr) = run_cli(
        home.path(),
        &[
            "suggest", "--baseline", "90", "--set", "3", "--total-sets", "3", "--compound",
            "--intensity", "9",
        ],
    );
    assert_eq!(code, 0, "suggest failed: {stderr}");
    let parsed: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(parsed["suggested_time"], 90);
    let suggestions = parsed["suggestions"].as_array().unwrap();
    assert!(suggestions.len() <= 4);
    assert!(suggestions
        .iter()
        .any(|s| s["reason"] == "Final set" && s["time"] == 135));
    assert!(suggestions
        .iter()
        .any(|s| s["reason"] == "Compound movement" && s["time"] == 120));
}

#[test]
fn test_suggest_rejects_bad_intensity() {
    let home = tempfile::tempdir().unwrap();
    let (code, _, stderr) = run_cli(home.path(), &["suggest", "--intensity", "11"]);
    assert_ne!(code, 0);
    assert!(stderr.contains("intensity"));
}

#[test]
fn test_prefs_set_then_show() {
    let home = tempfile::tempdir().unwrap();
    let (code, _, stderr) = run_cli(home.path(), &["prefs", "set", "default_rest_time", "120"]);
    assert_eq!(code, 0, "prefs set failed: {stderr}");

    let (code, stdout, _) = run_cli(home.path(), &["prefs", "show"]);
    assert_eq!(code, 0);
    let parsed: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(parsed["default_rest_time"], 120);
    assert_eq!(parsed["auto_start"], true);
}

#[test]
fn test_prefs_unknown_key() {
    let home = tempfile::tempdir().unwrap();
    let (code, _, _) = run_cli(home.path(), &["prefs", "set", "theme", "dark"]);
    assert_ne!(code, 0);
}

#[test]
fn test_config_get_set() {
    let home = tempfile::tempdir().unwrap();
    let key = "timer.low_time_threshold_secs";
    let (code, _, _) = run_cli(home.path(), &["config", "set", key, "5"]);
    assert_eq!(code, 0);
    let (code, stdout, _) = run_cli(home.path(), &["config", "get", key]);
    assert_eq!(code, 0);
    assert_eq!(stdout.trim(), "5");

    let (code, _, _) = run_cli(home.path(), &["config", "get", "nope"]);
    assert_ne!(code, 0);
}

#[test]
fn test_run_records_history() {
    let home = tempfile::tempdir().unwrap();
    let (code, _, _) = run_cli(home.path(), &["config", "set", "timer.tick_period_ms", "10"]);
    assert_eq!(code, 0);
    let (code, _, _) = run_cli(home.path(), &["config", "set", "haptics.enabled", "false"]);
    assert_eq!(code, 0);

    let (code, stdout, stderr) = run_cli(
        home.path(),
        &["run", "--exercise", "Squat", "--seconds", "3", "--workout", "w1", "--rating", "8"],
    );
    assert_eq!(code, 0, "run failed: {stderr}");
    let lines: Vec<serde_json::Value> = stdout
        .lines()
        .map(|l| serde_json::from_str(l).unwrap())
        .collect();
    assert!(lines[0].get("suggestions").is_some());
    let last = lines.last().unwrap();
    assert_eq!(last["type"], "completed");

    let (code, stdout, _) = run_cli(home.path(), &["history", "list", "--exercise", "squat"]);
    assert_eq!(code, 0);
    let records: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    let records = records.as_array().unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0]["workout_id"], "w1");
    assert_eq!(records[0]["was_skipped"], false);
    assert_eq!(records[0]["performance_rating"], 8);
}

#[test]
fn test_run_skip_after() {
    let home = tempfile::tempdir().unwrap();
    let (code, _, _) = run_cli(home.path(), &["config", "set", "haptics.enabled", "false"]);
    assert_eq!(code, 0);
    let (code, stdout, stderr) = run_cli(
        home.path(),
        &["run", "--seconds", "60", "--skip-after", "1", "--workout", "w2"],
    );
    assert_eq!(code, 0, "run failed: {stderr}");
    let last: serde_json::Value = serde_json::from_str(stdout.lines().last().unwrap()).unwrap();
    assert_eq!(last["type"], "skipped");
    assert_eq!(last["actual_time"], 1);
}
