//! Basic CLI E2E tests.
//!
//! Tests invoke the built binary against a throwaway data directory and
//! verify its JSON output.

use std::path::Path;
use std::process::Command;

use serde_json::Value;

/// Run a CLI command and return (exit code, stdout, stderr).
fn run_cli(data_dir: &Path, args: &[&str]) -> (i32, String, String) {
    let output = Command::new(env!("CARGO_BIN_EXE_fitstreak"))
        .args(args)
        .env("FITSTREAK_DATA_DIR", data_dir)
        .env("RUST_LOG", "off")
        .output()
        .expect("Failed to execute CLI command");

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    let code = output.status.code().unwrap_or(-1);

    (code, stdout, stderr)
}

fn run_json(data_dir: &Path, args: &[&str]) -> Value {
    let (code, stdout, stderr) = run_cli(data_dir, args);
    assert_eq!(code, 0, "{args:?} failed: {stderr}");
    serde_json::from_str(&stdout).expect("Failed to parse JSON output")
}

/// Drive the pending session until every set is logged.
fn complete_session(data_dir: &Path) {
    run_json(data_dir, &["session", "start"]);
    for _ in 0..100 {
        let out = run_json(data_dir, &["session", "status"]);
        let snapshot = &out["snapshot"];
        if snapshot["status"] == "complete" {
            return;
        }
        if snapshot["timer_mode"] == "resting" {
            run_json(data_dir, &["session", "skip-rest"]);
        } else {
            run_json(data_dir, &["session", "log", "--reps", "10"]);
        }
    }
    panic!("session did not complete");
}

#[test]
fn test_plan_resolve_without_generator_uses_fallback() {
    let dir = tempfile::tempdir().unwrap();
    let (code, stdout, stderr) = run_cli(dir.path(), &["plan", "resolve", "--level", "advanced"]);
    assert_eq!(code, 0);
    let resolved: Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(resolved["source"]["kind"], "fallback");
    assert_eq!(resolved["plan"]["main"][0]["target_sets"], 4);
    assert!(!stderr.is_empty());

    let shown = run_json(dir.path(), &["plan", "show"]);
    assert_eq!(shown, resolved);
}

#[test]
fn test_plan_resolve_with_plan_file() {
    let dir = tempfile::tempdir().unwrap();
    let plan_path = dir.path().join("plan.json");
    std::fs::write(
        &plan_path,
        r#"{
            "title": "Legs",
            "estimated_duration_min": 20,
            "main": [
                {"name": "Squat", "target_sets": 2, "target_reps": 12, "rest_seconds": 30}
            ]
        }"#,
    )
    .unwrap();

    let resolved = run_json(
        dir.path(),
        &["plan", "resolve", "--plan-file", plan_path.to_str().unwrap()],
    );
    assert_eq!(resolved["source"]["kind"], "generated");
    assert_eq!(resolved["plan"]["title"], "Legs");
}

#[test]
fn test_session_without_start_fails() {
    let dir = tempfile::tempdir().unwrap();
    let (code, _, stderr) = run_cli(dir.path(), &["session", "log", "--reps", "10"]);
    assert_ne!(code, 0);
    assert!(stderr.contains("no active session"));
}

#[test]
fn test_main_phase_set_requires_reps() {
    let dir = tempfile::tempdir().unwrap();
    let plan_path = dir.path().join("plan.json");
    std::fs::write(
        &plan_path,
        r#"{"estimated_duration_min": 10, "main": [
            {"name": "Row", "target_sets": 1, "target_reps": 10, "rest_seconds": 30}
        ]}"#,
    )
    .unwrap();
    run_json(dir.path(), &["plan", "resolve", "--plan-file", plan_path.to_str().unwrap()]);
    run_json(dir.path(), &["session", "start"]);

    let (code, _, stderr) = run_cli(dir.path(), &["session", "log", "--weight", "10"]);
    assert_ne!(code, 0);
    assert!(stderr.contains("Reps are required"));

    let out = run_json(dir.path(), &["session", "log", "--reps", "10", "--weight", "10"]);
    assert_eq!(out["snapshot"]["status"], "complete");
}

#[test]
fn test_second_start_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    run_json(dir.path(), &["plan", "resolve"]);
    run_json(dir.path(), &["session", "start"]);
    let (code, _, _) = run_cli(dir.path(), &["session", "start"]);
    assert_ne!(code, 0);

    // Another user is unaffected.
    run_json(dir.path(), &["--user", "sam", "plan", "resolve"]);
    run_json(dir.path(), &["--user", "sam", "session", "start"]);
}

#[test]
fn test_full_session_and_idempotent_finish() {
    let dir = tempfile::tempdir().unwrap();
    run_json(dir.path(), &["plan", "resolve"]);
    complete_session(dir.path());

    let finish_args = [
        "session", "finish", "--difficulty", "3", "--enjoyment", "4", "--energy", "3",
        "--date", "2024-03-01",
    ];
    let first = run_json(dir.path(), &finish_args);
    assert_eq!(first["summary"]["completion_percentage"], 100);
    assert_eq!(first["reward_result"]["xp_gain"], 75);
    assert_eq!(first["profile"]["streak"], 1);

    let second = run_json(dir.path(), &finish_args);
    assert_eq!(first, second);

    let profile = run_json(dir.path(), &["profile", "show"]);
    assert_eq!(profile["xp"], 75);
    assert_eq!(profile["total_workouts"], 1);
    assert_eq!(profile["xp_to_next_level"], 425);

    let badges = run_json(dir.path(), &["badges", "list", "--unlocked"]);
    let ids: Vec<&str> = badges
        .as_array()
        .unwrap()
        .iter()
        .map(|b| b["id"].as_str().unwrap())
        .collect();
    assert_eq!(ids, vec!["first_workout"]);
}

#[test]
fn test_finish_rejects_out_of_range_rating() {
    let dir = tempfile::tempdir().unwrap();
    run_json(dir.path(), &["plan", "resolve"]);
    complete_session(dir.path());

    let (code, _, stderr) = run_cli(
        dir.path(),
        &["session", "finish", "--difficulty", "6", "--enjoyment", "3", "--energy", "3"],
    );
    assert_ne!(code, 0);
    assert!(stderr.contains("between 1 and 5"));

    let profile = run_json(dir.path(), &["profile", "show"]);
    assert_eq!(profile["total_workouts"], 0);
}

#[test]
fn test_abort_keeps_log_on_request() {
    let dir = tempfile::tempdir().unwrap();
    run_json(dir.path(), &["plan", "resolve"]);
    run_json(dir.path(), &["session", "start"]);
    run_json(dir.path(), &["session", "log", "--reps", "20"]);

    let aborted = run_json(dir.path(), &["session", "abort", "--keep-log"]);
    assert_eq!(aborted["partial_summary"]["completed_sets"], 1);

    let profile = run_json(dir.path(), &["profile", "show"]);
    assert_eq!(profile["aborted_sessions_kept"], 1);
    assert_eq!(profile["total_workouts"], 0);

    // The slot is free again.
    run_json(dir.path(), &["session", "start"]);
}

#[test]
fn test_config_get_set() {
    let dir = tempfile::tempdir().unwrap();
    let (code, stdout, _) = run_cli(dir.path(), &["config", "get", "rewards.base_xp"]);
    assert_eq!(code, 0);
    assert_eq!(stdout.trim(), "50");

    let (code, _, _) = run_cli(dir.path(), &["config", "set", "rewards.base_xp", "60"]);
    assert_eq!(code, 0);
    let (_, stdout, _) = run_cli(dir.path(), &["config", "get", "rewards.base_xp"]);
    assert_eq!(stdout.trim(), "60");

    let (code, _, _) = run_cli(dir.path(), &["config", "set", "rewards.nope", "1"]);
    assert_ne!(code, 0);

    let (code, _, _) = run_cli(dir.path(), &["config", "reset"]);
    assert_eq!(code, 0);
    let (_, stdout, _) = run_cli(dir.path(), &["config", "list"]);
    assert!(stdout.contains("rewards.base_xp = 50"));
}
