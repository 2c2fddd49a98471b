//! Binary start-up tests.
//!
//! Runs the `semi_hal` executable: a broken configuration file must be
//! reported in the log before the non-zero exit, and a short match must
//! run to completion.

use std::fs;
use std::path::Path;
use std::process::{Command, Output};
use tempfile::TempDir;

fn semi_hal(config: &Path, extra: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_semi_hal"))
        .arg("--config")
        .arg(config)
        .args(extra)
        .env_remove("RUST_LOG")
        .output()
        .unwrap()
}

fn combined(output: &Output) -> String {
    format!(
        "{}{}",
        String::from_utf8_lossy(&output.stdout),
        String::from_utf8_lossy(&output.stderr)
    )
}

#[test]
fn test_malformed_config_is_logged() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("bad.toml");
    fs::write(&path, "invalid toml {{{{").unwrap();

    let output = semi_hal(&path, &[]);
    assert_eq!(output.status.code(), Some(1));
    let log = combined(&output);
    assert!(log.contains("Robot startup failed"), "log was: {log}");
    assert!(log.contains("Failed to parse configuration"), "log was: {log}");
}

#[test]
fn test_invalid_ports_are_logged() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("robot.toml");
    fs::write(&path, "[limits]\npwm = 2\n").unwrap();

    let output = semi_hal(&path, &[]);
    assert_eq!(output.status.code(), Some(1));
    assert!(combined(&output).contains("Configuration validation failed"));
}

#[test]
fn test_short_match_runs_to_completion() {
    let dir = TempDir::new().unwrap();
    let output = semi_hal(
        &dir.path().join("absent.toml"),
        &["--cycles", "3", "--period-ms", "1", "--alliance", "left", "--dump-ports"],
    );
    let log = combined(&output);
    assert!(output.status.success(), "log was: {log}");
    assert!(log.contains("Match complete: plates LRL"), "log was: {log}");
    assert!(log.contains("Port report:"), "log was: {log}");
    assert!(log.contains("Semi HAL shutdown complete"), "log was: {log}");
}
