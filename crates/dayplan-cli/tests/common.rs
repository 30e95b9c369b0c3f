//! Common utilities for CLI E2E tests.

#![allow(dead_code)]

use std::path::Path;
use std::process::Command;

/// Invoke the CLI with `DAYPLAN_HOME` pointed at `home` and return the output.
pub fn run_cli(home: &Path, args: &[&str]) -> (String, String, i32) {
    let output = Command::new(env!("CARGO_BIN_EXE_dayplan"))
        .args(args)
        .env("DAYPLAN_HOME", home)
        .env_remove("RUST_LOG")
        .output()
        .expect("Failed to execute CLI command");

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    let code = output.status.code().unwrap_or(-1);

    (stdout, stderr, code)
}

/// Invoke a CLI command and expect success.
pub fn run_cli_success(home: &Path, args: &[&str]) -> String {
    let (stdout, stderr, code) = run_cli(home, args);
    if code != 0 && !stderr.is_empty() {
        eprintln!("CLI error output: {}", stderr);
    }
    assert_eq!(code, 0, "CLI command failed with code {}: {:?}", code, args);
    stdout
}

/// Invoke a CLI command and expect failure.
pub fn run_cli_failure(home: &Path, args: &[&str]) -> (String, String, i32) {
    let (stdout, stderr, code) = run_cli(home, args);
    assert!(code != 0, "CLI command unexpectedly succeeded: {:?}", args);
    (stdout, stderr, code)
}

/// Parse JSON output from CLI.
pub fn parse_json<T: for<'de> serde::Deserialize<'de>>(json: &str) -> T {
    serde_json::from_str(json).expect("Failed to parse JSON output")
}
