//! End-to-end tests running the `did` binary against a temporary log.

use std::path::Path;
use std::process::{Command, Output};

use tempfile::TempDir;

fn did_binary() -> String {
    env!("CARGO_BIN_EXE_did").to_string()
}

fn did(home: &Path, log_file: &Path, args: &[&str]) -> Output {
    Command::new(did_binary())
        .env("HOME", home)
        .env("XDG_CONFIG_HOME", home.join(".config"))
        .env_remove("DID_LOG_FILE")
        .env_remove("RUST_LOG")
        .arg("--log-file")
        .arg(log_file)
        .args(args)
        .output()
        .expect("failed to run did")
}

fn stdout(output: &Output) -> String {
    assert!(
        output.status.success(),
        "did should succeed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    String::from_utf8(output.stdout.clone()).unwrap()
}

const LOG: &str = "\
# sample work log
2019-02-20 09:00: arrive
2019-02-20 10:00: coding
2019-02-20 10:05: .tea
2019-02-20 17:00: coding
2019-02-20 17:30: .lunch
";

#[test]
fn test_summary_of_existing_log() {
    let temp = TempDir::new().unwrap();
    let log_file = temp.path().join("joblog");
    std::fs::write(&log_file, LOG).unwrap();

    let output = stdout(&did(temp.path(), &log_file, &["summary"]));
    assert_eq!(
        output,
        "2019-02-20 Wed: worked 8h 20m, slacked 10m, overtime +20m, total +20m\n"
    );
}

#[test]
fn test_summary_json() {
    let temp = TempDir::new().unwrap();
    let log_file = temp.path().join("joblog");
    std::fs::write(&log_file, LOG).unwrap();

    let output = stdout(&did(temp.path(), &log_file, &["summary", "--json"]));
    let sessions: serde_json::Value = serde_json::from_str(&output).unwrap();
    assert_eq!(sessions[0]["worked_seconds"], 30_000);
    assert_eq!(sessions[0]["intervals"].as_array().unwrap().len(), 4);
}

#[test]
fn test_check_reports_sessions() {
    let temp = TempDir::new().unwrap();
    let log_file = temp.path().join("joblog");
    std::fs::write(&log_file, LOG).unwrap();

    let output = stdout(&did(temp.path(), &log_file, &["check"]));
    assert!(output.ends_with(": 1 sessions, 4 activities, OK\n"), "{output}");
}

#[test]
fn test_check_fails_on_broken_log() {
    let temp = TempDir::new().unwrap();
    let log_file = temp.path().join("joblog");
    std::fs::write(&log_file, "2019-02-20 09:00: coding\n").unwrap();

    let output = did(temp.path(), &log_file, &["check"]);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("line 1"), "{stderr}");
    assert!(stderr.contains("first log event is not an \"arrive\""), "{stderr}");
}

#[test]
fn test_log_creates_file_and_appends() {
    let temp = TempDir::new().unwrap();
    let log_file = temp.path().join("nested").join("joblog");

    let output = stdout(&did(temp.path(), &log_file, &["log", "arrive"]));
    assert!(output.ends_with(" arrive\n"), "{output}");

    let output = stdout(&did(temp.path(), &log_file, &["log", "reading", "mail"]));
    assert!(output.contains(" reading mail ("), "{output}");

    let content = std::fs::read_to_string(&log_file).unwrap();
    let lines: Vec<_> = content.lines().collect();
    assert_eq!(lines.len(), 2);
    assert!(lines[0].ends_with(": arrive"));
    assert!(lines[1].ends_with(": reading mail"));

    let output = stdout(&did(temp.path(), &log_file, &["check"]));
    assert!(output.ends_with(": 1 sessions, 1 activities, OK\n"), "{output}");
}

#[test]
fn test_log_rejects_first_event_without_arrive() {
    let temp = TempDir::new().unwrap();
    let log_file = temp.path().join("joblog");

    let output = did(temp.path(), &log_file, &["log", "coding"]);
    assert!(!output.status.success());
    assert!(!log_file.exists());
}

#[test]
fn test_no_command_prints_help() {
    let temp = TempDir::new().unwrap();
    let output = stdout(&did(temp.path(), &temp.path().join("joblog"), &[]));
    assert!(output.contains("Usage:"), "{output}");
}
