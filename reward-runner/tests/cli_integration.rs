//! CLI integration tests for the reward-runner binary.
//!
//! Runs the binary through `std::process::Command` inside a temporary
//! directory so no stray `config/reward.toml` is picked up.

use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use tempfile::TempDir;

// =============================================================================
// Helper Functions
// =============================================================================

fn runner_bin() -> PathBuf {
    PathBuf::from(env!("CARGO_BIN_EXE_reward-runner"))
}

fn run_in(dir: &Path, args: &[&str]) -> Output {
    Command::new(runner_bin())
        .current_dir(dir)
        .args(args)
        .output()
        .expect("Failed to execute reward-runner binary")
}

fn assert_success(output: &Output) {
    assert!(
        output.status.success(),
        "Expected exit code 0, got {:?}\nstderr: {}",
        output.status.code(),
        String::from_utf8_lossy(&output.stderr)
    );
}

fn assert_failure(output: &Output) {
    assert_eq!(
        output.status.code(),
        Some(1),
        "Expected exit code 1, got {:?}\nstdout: {}\nstderr: {}",
        output.status.code(),
        String::from_utf8_lossy(&output.stdout),
        String::from_utf8_lossy(&output.stderr)
    );
}

fn stdout_str(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).to_string()
}

fn stderr_str(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).to_string()
}

fn load_json_file(path: &Path) -> serde_json::Value {
    let content = std::fs::read_to_string(path)
        .unwrap_or_else(|e| panic!("Failed to read {:?}: {}", path, e));
    serde_json::from_str(&content)
        .unwrap_or_else(|e| panic!("Failed to parse JSON {:?}: {}", path, e))
}

/// A response of exactly `length` chars boxing `answer`.
fn response(answer: &str, length: usize) -> String {
    let mut text = format!("<think>work</think> \\boxed{{{}}}", answer);
    while text.chars().count() < length {
        text.push(' ');
    }
    text
}

fn write_batch(dir: &TempDir) -> PathBuf {
    let batch = serde_json::json!([
        {"prompt": "q1", "response": response("12", 100), "ground_truth": "12"},
        {"prompt": "q2", "response": response("12", 200), "ground_truth": "12"},
        {"prompt": "q3", "response": response("9", 2048), "ground_truth": "12"},
    ]);
    let path = dir.path().join("batch.json");
    std::fs::write(&path, batch.to_string()).unwrap();
    path
}

// =============================================================================
// Score
// =============================================================================

#[test]
fn score_writes_records_and_summary() {
    let dir = TempDir::new().unwrap();
    let input = write_batch(&dir);

    let output = run_in(
        dir.path(),
        &[
            "score",
            "--input",
            input.to_str().unwrap(),
            "--output",
            "out/records.json",
            "--summary",
            "out/summary.json",
        ],
    );
    assert_success(&output);
    assert!(stdout_str(&output).contains("Reward Scoring Results"));

    let records = load_json_file(&dir.path().join("out/records.json"));
    let records = records.as_array().unwrap();
    assert_eq!(records.len(), 3);
    assert_eq!(records[0]["L_mean"], 150.0);
    assert_eq!(records[0]["overall"], 1.0);
    assert_eq!(records[2]["R_length"], -1.0);
    assert_eq!(records[2]["overall"], -1.0);

    let summary = load_json_file(&dir.path().join("out/summary.json"));
    assert_eq!(summary["mode"], "safe_zone");
    assert_eq!(summary["batch_size"], 3);
}

#[test]
fn score_mode_flag_overrides_config() {
    let dir = TempDir::new().unwrap();
    let input = write_batch(&dir);

    let output = run_in(
        dir.path(),
        &[
            "score",
            "--input",
            input.to_str().unwrap(),
            "--mode",
            "tolerance_zone",
            "--tolerance-factor",
            "0.5",
            "--output",
            "records.json",
        ],
    );
    assert_success(&output);

    let records = load_json_file(&dir.path().join("records.json"));
    assert_eq!(records[0]["threshold"], 225.0);
}

#[test]
fn score_accuracy_mode_has_no_length_fields() {
    let dir = TempDir::new().unwrap();
    let input = write_batch(&dir);

    let output = run_in(
        dir.path(),
        &["score", "-i", input.to_str().unwrap(), "-m", "accuracy", "-o", "records.json"],
    );
    assert_success(&output);

    let records = load_json_file(&dir.path().join("records.json"));
    assert_eq!(records[2]["overall"], 0.0);
    assert!(records[0].get("R_length").is_none());
}

#[test]
fn score_reads_jsonl() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("batch.jsonl");
    std::fs::write(
        &path,
        "{\"response\": \"\\\\boxed{1}\", \"ground_truth\": \"1\"}\n{\"response\": \"\\\\boxed{2}\", \"ground_truth\": \"1\"}\n",
    )
    .unwrap();

    let output = run_in(dir.path(), &["score", "-i", path.to_str().unwrap(), "-o", "r.json"]);
    assert_success(&output);
    let records = load_json_file(&dir.path().join("r.json"));
    assert_eq!(records[0]["accuracy"], 1.0);
    assert_eq!(records[1]["accuracy"], 0.0);
}

// =============================================================================
// Errors
// =============================================================================

#[test]
fn single_object_input_exits_1() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("single.json");
    std::fs::write(&path, "{\"response\": \"\\\\boxed{1}\", \"ground_truth\": \"1\"}").unwrap();

    let output = run_in(dir.path(), &["score", "-i", path.to_str().unwrap(), "-o", "r.json"]);
    assert_failure(&output);
    assert!(stderr_str(&output).contains("reward_type=batch"));
    assert!(!dir.path().join("r.json").exists());
}

#[test]
fn missing_input_exits_1() {
    let dir = TempDir::new().unwrap();
    let output = run_in(dir.path(), &["score", "-i", "nope.json"]);
    assert_failure(&output);
    assert!(stderr_str(&output).contains("Error:"));
}

#[test]
fn unknown_mode_exits_1() {
    let dir = TempDir::new().unwrap();
    let input = write_batch(&dir);
    let output = run_in(dir.path(), &["score", "-i", input.to_str().unwrap(), "-m", "longest"]);
    assert_failure(&output);
}

#[test]
fn invalid_hard_limit_exits_1() {
    let dir = TempDir::new().unwrap();
    let input = write_batch(&dir);
    let output = run_in(
        dir.path(),
        &["score", "-i", input.to_str().unwrap(), "--hard-limit", "0"],
    );
    assert_failure(&output);
}

// =============================================================================
// Config
// =============================================================================

#[test]
fn init_config_then_score_with_it() {
    let dir = TempDir::new().unwrap();
    let output = run_in(dir.path(), &["init-config", "--output", "conf/reward.toml"]);
    assert_success(&output);

    let config_path = dir.path().join("conf/reward.toml");
    let content = std::fs::read_to_string(&config_path).unwrap();
    assert!(content.contains("[reward]"));
    assert!(content.contains("safe_zone"));

    let input = write_batch(&dir);
    let output = run_in(
        dir.path(),
        &[
            "--config",
            config_path.to_str().unwrap(),
            "score",
            "-i",
            input.to_str().unwrap(),
        ],
    );
    assert_success(&output);
}

#[test]
fn bad_config_file_exits_1() {
    let dir = TempDir::new().unwrap();
    let config_path = dir.path().join("bad.toml");
    std::fs::write(&config_path, "[reward]\nhard_limit = \"many\"\n").unwrap();
    let input = write_batch(&dir);

    let output = run_in(
        dir.path(),
        &["-c", config_path.to_str().unwrap(), "score", "-i", input.to_str().unwrap()],
    );
    assert_failure(&output);
    assert!(stderr_str(&output).contains("Parse error"));
}

// =============================================================================
// Logging
// =============================================================================

#[test]
fn verbose_shows_batch_threshold() {
    let dir = TempDir::new().unwrap();
    let input = write_batch(&dir);

    let output = run_in(dir.path(), &["--verbose", "score", "-i", input.to_str().unwrap()]);
    assert_success(&output);
    assert!(stderr_str(&output).contains("length threshold for batch"));

    let output = run_in(dir.path(), &["score", "-i", input.to_str().unwrap()]);
    assert_success(&output);
    assert!(!stderr_str(&output).contains("length threshold for batch"));
}
