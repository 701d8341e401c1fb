use assert_cmd::prelude::*;
#[allow(unused_imports)]
use predicates::prelude::*;

use std::process::Command;

#[test]
fn no_subcommand_fails() {
    let mut cmd = Command::cargo_bin("elevsim").expect("calling binary failed");
    cmd.assert().failure();
}

#[test]
fn version_flag_reports_the_crate_version() {
    let mut cmd = Command::cargo_bin("elevsim").expect("calling binary failed");
    cmd.arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::starts_with("elevsim"));
}

#[test]
fn config_subcommand_prints_the_loaded_constants() {
    let mut cmd = Command::cargo_bin("elevsim").expect("calling binary failed");
    cmd.arg("config")
        .assert()
        .success()
        .stdout(predicate::str::contains("floors"));
}

#[test]
fn run_subcommand_completes_a_bounded_demo_run() {
    let mut cmd = Command::cargo_bin("elevsim").expect("calling binary failed");
    cmd.args(["run", "--requests", "20", "--until", "300"])
        .assert()
        .success()
        .stdout(predicate::str::contains("completed"));
}
