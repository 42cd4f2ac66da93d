//! CLI binary smoke tests using assert_cmd.
//!
//! These run the compiled `edgesim` binary end-to-end on a small
//! configuration so argument parsing, config loading and report output are
//! covered together.

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;

fn cmd() -> Command {
    Command::cargo_bin("edgesim").unwrap()
}

const SMALL_CONFIG: &str = r#"{
    "train_rows": 200,
    "test_rows": 200,
    "quantile": 0.8,
    "duplicates": 2,
    "rfe": { "sizes": [1, 2], "n_folds": 3, "n_repeats": 1 }
}"#;

#[test]
fn help_flag() {
    cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("--seed"))
        .stdout(predicate::str::contains("--config"))
        .stdout(predicate::str::contains("--output"));
}

#[test]
fn version_flag() {
    cmd()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("edgesim"));
}

#[test]
fn nonexistent_config_errors() {
    cmd()
        .args(["--config", "/nonexistent/config.json"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to read config"));
}

#[test]
fn malformed_config_errors() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("bad.json");
    fs::write(&path, "{ not json").unwrap();
    cmd()
        .arg("--config")
        .arg(&path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to parse config"));
}

#[test]
fn invalid_seed_errors() {
    cmd().args(["--seed", "minus-one"]).assert().failure();
}

#[test]
fn small_run_prints_aucs_and_writes_report() {
    let dir = tempfile::tempdir().unwrap();
    let config = dir.path().join("config.json");
    let report = dir.path().join("report.html");
    fs::write(&config, SMALL_CONFIG).unwrap();

    cmd()
        .arg("--config")
        .arg(&config)
        .args(["--seed", "7"])
        .arg("--output")
        .arg(&report)
        .assert()
        .success()
        .stdout(predicate::str::contains("seed: 7"))
        .stdout(predicate::str::contains("GBDT AUC"))
        .stdout(predicate::str::contains("Elastic net AUC"))
        .stdout(predicate::str::contains("RFE selected"));

    let html = fs::read_to_string(&report).unwrap();
    assert!(html.contains("Model comparison"));
    assert!(html.contains("Recursive feature elimination"));
}
