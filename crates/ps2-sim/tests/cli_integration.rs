//! Integration tests for the ps2-sim CLI.

use ps2_core as _;
use ps2_sim as _;
use serde_json as _;
use std::fs;
use std::path::PathBuf;
use std::process::{Command, Output};
use thiserror as _;
use tracing as _;
use tracing_subscriber as _;

fn binary_path() -> PathBuf {
    let mut path = std::env::current_exe().unwrap();
    path.pop();
    path.pop();
    path.join("ps2-sim")
}

fn create_temp_file(dir: &std::path::Path, name: &str, content: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, content).unwrap();
    path
}

fn run_sim(args: &[&str]) -> Output {
    Command::new(binary_path())
        .args(args)
        .output()
        .expect("failed to run ps2-sim")
}

const TYPING_SCRIPT: &str = "\
# press and release A
send 0x1C
read
expect 0x1C
send 0xF0
send 0x1C
read
expect 0xF0
read
expect 0x1C
clear
idle 6000
";

#[test]
fn script_with_matching_expectations_succeeds() {
    let temp_dir = tempfile::tempdir().unwrap();
    let script = create_temp_file(temp_dir.path(), "typing.ps2", TYPING_SCRIPT);

    let output = run_sim(&["run", script.to_str().unwrap()]);
    let stdout = String::from_utf8_lossy(&output.stdout);

    assert!(output.status.success(), "stdout:\n{stdout}");
    assert!(stdout.contains("frame accepted 0x1c"));
    assert!(stdout.contains("host read 0xf0"));
    assert!(stdout.contains("interrupt cleared"));
    assert!(stdout.contains("line 4: expect 0x1c ok"));
    assert!(stdout.contains("debug rx 0x07"));
    assert!(stdout.contains("expect_failures=0"));
}

#[test]
fn failed_expectation_exits_non_zero() {
    let temp_dir = tempfile::tempdir().unwrap();
    let script = create_temp_file(
        temp_dir.path(),
        "bad.ps2",
        "send 0x41 bad-parity\nread\nexpect 0x41\n",
    );

    let output = run_sim(&["run", script.to_str().unwrap()]);
    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);

    assert!(!output.status.success());
    assert!(stdout.contains("frame discarded: odd parity check failed"));
    assert!(stdout.contains("read of empty queue"));
    assert!(stdout.contains("FAILED, read returned nothing"));
    assert!(stderr.contains("1 expectation(s) failed"));
}

#[test]
fn overflow_drops_fifth_byte() {
    let temp_dir = tempfile::tempdir().unwrap();
    let script = create_temp_file(
        temp_dir.path(),
        "flood.ps2",
        "send 1\nsend 2\nsend 3\nsend 4\nsend 5\nread\nexpect 1\nread\nread\nread\nexpect 4\nread\n",
    );

    let output = run_sim(&["run", script.to_str().unwrap()]);
    let stdout = String::from_utf8_lossy(&output.stdout);

    assert!(output.status.success(), "stdout:\n{stdout}");
    assert!(stdout.contains("queue full, dropped 0x05"));
    assert!(stdout.contains("read of empty queue"));
    assert!(stdout.contains("overflows=1"));
}

#[test]
fn config_file_changes_core_timing() {
    let temp_dir = tempfile::tempdir().unwrap();
    let config = create_temp_file(
        temp_dir.path(),
        "quiet.json",
        r#"{"telemetry_enabled": false}"#,
    );
    let script = create_temp_file(temp_dir.path(), "one.ps2", "send 0x29\nidle 6000\n");

    let output = run_sim(&[
        "run",
        script.to_str().unwrap(),
        "--config",
        config.to_str().unwrap(),
    ]);
    let stdout = String::from_utf8_lossy(&output.stdout);

    assert!(output.status.success());
    assert!(stdout.contains("frame accepted 0x29"));
    assert!(!stdout.contains("debug rx"));
}

#[test]
fn invalid_config_is_reported() {
    let temp_dir = tempfile::tempdir().unwrap();
    let config = create_temp_file(temp_dir.path(), "zero.json", r#"{"uart_divisor": 0}"#);
    let script = create_temp_file(temp_dir.path(), "one.ps2", "idle 1\n");

    let output = run_sim(&[
        "run",
        script.to_str().unwrap(),
        "-c",
        config.to_str().unwrap(),
    ]);
    let stderr = String::from_utf8_lossy(&output.stderr);

    assert!(!output.status.success());
    assert!(stderr.contains("uart divisor must be non-zero"));
}

#[test]
fn script_error_names_file_and_line() {
    let temp_dir = tempfile::tempdir().unwrap();
    let script = create_temp_file(temp_dir.path(), "typo.ps2", "idle 10\nsned 0x41\n");

    let output = run_sim(&["run", script.to_str().unwrap()]);
    let stderr = String::from_utf8_lossy(&output.stderr);

    assert!(!output.status.success());
    assert!(stderr.contains("typo.ps2:line 2: unknown command `sned`"));
}

#[test]
fn missing_script_is_reported() {
    let output = run_sim(&["run", "/nonexistent/path/script.ps2"]);
    let stderr = String::from_utf8_lossy(&output.stderr);

    assert!(!output.status.success());
    assert!(stderr.contains("failed to read"));
}

#[test]
fn help_flag_prints_usage() {
    let output = run_sim(&["--help"]);
    let stdout = String::from_utf8_lossy(&output.stdout);

    assert!(output.status.success());
    assert!(stdout.contains("Usage: ps2-sim"));
}

#[test]
fn unknown_command_fails() {
    let output = run_sim(&["replay"]);
    let stderr = String::from_utf8_lossy(&output.stderr);

    assert!(!output.status.success());
    assert!(stderr.contains("unknown command: replay"));
}
