//! Binary surface: help, version and argument errors.

#![allow(clippy::expect_used)]

use assert_cmd::Command;
use predicates::prelude::*;

fn spotcraft() -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("spotcraft"));
    cmd.env("NO_COLOR", "1");
    cmd
}

#[test]
fn test_cli_no_args_shows_help_and_exits_two() {
    spotcraft().assert().code(2).stderr(predicate::str::contains(
        "Chat-driven controller for an on-demand game server",
    ));
}

#[test]
fn test_cli_help_lists_every_command() {
    let output = spotcraft().arg("--help").output().expect("run");
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    for command in ["serve", "status", "start", "stop", "start-fleet", "stop-fleet", "exec"] {
        assert!(stdout.contains(command), "missing {command}:\n{stdout}");
    }
}

#[test]
fn test_cli_version_flag_shows_version() {
    spotcraft()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("spotcraft"));
}

#[test]
fn test_exec_requires_a_command() {
    spotcraft()
        .arg("exec")
        .assert()
        .code(2)
        .stderr(predicate::str::contains("<COMMAND>"));
}

#[test]
fn test_conventional_no_color_values_are_accepted() {
    for value in ["1", "yes", "true", "0"] {
        let output = spotcraft()
            .env("NO_COLOR", value)
            .arg("exec")
            .output()
            .expect("run");
        let stderr = String::from_utf8_lossy(&output.stderr);
        assert_eq!(output.status.code(), Some(2), "NO_COLOR={value}: {stderr}");
        assert!(stderr.contains("<COMMAND>"), "NO_COLOR={value}: {stderr}");
        assert!(!stderr.contains("invalid value"), "NO_COLOR={value}: {stderr}");
    }
}

#[test]
fn test_status_json_flag_is_accepted_in_help() {
    spotcraft()
        .args(["status", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("--json"));
}

#[cfg(feature = "aws")]
#[test]
fn test_invalid_configuration_exits_one_before_any_provider_call() {
    spotcraft()
        .env("SPOTCRAFT_POLL_MAX_ATTEMPTS", "0")
        .arg("status")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("poll_max_attempts"));
}
