//! Runs the compiled `metasyntactic` binary.

use assert_cmd::Command;
use predicates::prelude::*;

fn metasyntactic() -> Command {
    #[expect(
        deprecated,
        clippy::expect_used,
        reason = "cargo_bin is the standard assert_cmd API and test panics are acceptable"
    )]
    let mut cmd = Command::cargo_bin("metasyntactic").expect("binary should exist");
    cmd.env("RUST_BACKTRACE", "0").env_remove("RUST_LOG");
    cmd
}

#[test]
fn prints_report_for_valid_input() {
    metasyntactic()
        .args(["4", "--foo-b", "qux", "--extra"])
        .assert()
        .success()
        .stdout(predicate::str::contains("foo.a = 4"))
        .stdout(predicate::str::contains("foo.b = qux"))
        .stdout(predicate::str::contains("extra = true"));
}

#[test]
fn negative_bar_fails_without_output() {
    metasyntactic()
        .args(["4", "--bar", "-1"])
        .assert()
        .failure()
        .stdout(predicate::str::is_empty())
        .stderr(predicate::str::contains("must not be negative"));
}

#[test]
fn help_describes_prefixed_options() {
    metasyntactic()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("--foo-b"))
        .stdout(predicate::str::contains("How many bars."));
}
