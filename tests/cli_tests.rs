use std::fs;
use std::path::PathBuf;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

const VALID: &str = r#"
[network]
name = "testnet"
node_url = "http://127.0.0.1:9"

[gateway]
connect_timeout_ms = 200
timeout_ms = 500

[wallet]
default_provider = "petra"

[[wallet.providers]]
id = "petra"
bridge_url = "http://127.0.0.1:9"
dialect = "wallet_standard"

[logging]
level = "error"
"#;

fn write_config(dir: &TempDir, contents: &str) -> PathBuf {
    let path = dir.path().join("config.toml");
    fs::write(&path, contents).expect("write temp config");
    path
}

fn hyperfill() -> Command {
    Command::cargo_bin("hyperfill").expect("binary built")
}

#[test]
fn help_lists_commands() {
    hyperfill()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("deposit"))
        .stdout(predicate::str::contains("order"))
        .stdout(predicate::str::contains("snapshot"));
}

#[test]
fn config_validate_accepts_valid_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_config(&dir, VALID);

    hyperfill()
        .args(["config", "validate", "--config"])
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains("Config file is valid"));
}

#[test]
fn config_validate_json_reports_valid() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_config(&dir, VALID);

    hyperfill()
        .args(["--json", "config", "validate", "--config"])
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains(r#""valid":true"#));
}

#[test]
fn config_validate_rejects_zero_poll_interval() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_config(
        &dir,
        &VALID.replace("timeout_ms = 500", "timeout_ms = 500\npoll_interval_ms = 0"),
    );

    hyperfill()
        .args(["config", "validate", "--config"])
        .arg(&path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("poll_interval_ms"));
}

#[test]
fn missing_config_file_fails() {
    let dir = tempfile::tempdir().unwrap();

    hyperfill()
        .args(["config", "show", "--config"])
        .arg(dir.path().join("absent.toml"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("failed to read config file"));
}

#[test]
fn unknown_provider_fails_before_network() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_config(&dir, VALID);

    hyperfill()
        .args(["deposit", "50", "--provider", "phantom", "--config"])
        .arg(&path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("no compatible wallet"));
}

#[test]
fn config_show_marks_selected_provider() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_config(&dir, VALID);

    hyperfill()
        .args(["--json", "config", "show", "--config"])
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains(r#""selected_provider":"petra""#));
}

#[test]
fn unknown_order_side_is_a_usage_error() {
    hyperfill()
        .args(["order", "place", "--side", "up", "--price", "1", "--size", "1"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown side"));
}
