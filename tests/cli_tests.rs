//! Integration tests for the rgup command line surface.
//!
//! These drive the compiled binary and cover the paths that terminate
//! before any pull or build is attempted: help, argument validation, and
//! the navigation failure for a missing checkout directory.

use assert_cmd::Command;
use predicates::prelude::*;

fn rgup() -> Command {
    Command::cargo_bin("rgup").expect("binary builds")
}

#[test]
fn help_exits_zero_and_lists_flags() {
    rgup()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("--force"))
        .stdout(predicate::str::contains("--dir"))
        .stdout(predicate::str::contains("--upstream"))
        .stdout(predicate::str::contains("--no-strip"))
        .stdout(predicate::str::contains("--verbosity"));
}

#[test]
fn invalid_verbosity_prints_usage_and_exits_one() {
    rgup()
        .args(["-v", "12"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Usage"))
        .stderr(predicate::str::contains("single digit"));
}

#[test]
fn non_numeric_verbosity_exits_one() {
    rgup().args(["-v", "x"]).assert().code(1);
}

#[test]
fn malformed_upstream_spec_exits_one() {
    rgup()
        .args(["-u", "/master"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("remote/branch"));
}

#[test]
fn separator_less_upstream_spec_rejected_up_front() {
    // A bare branch name must fail argument validation with the usage
    // diagnostic, not surface later inside the pull step.
    rgup()
        .args(["-u", "master"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Usage"))
        .stderr(predicate::str::contains("remote/branch"));
}

#[test]
fn missing_checkout_directory_is_fatal_before_any_build() {
    // Whether the failure is the missing directory or an earlier missing
    // tool, the exit code is 1 and a fatal diagnostic is printed; no pull
    // or build is ever attempted.
    rgup()
        .args(["-v", "2", "-d", "/nonexistent/rgup-integration-test"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Fatal error"));
}
