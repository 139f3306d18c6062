//! Smoke tests -- verify the binary runs and configuration is checked up front.

use assert_cmd::Command;
use std::path::Path;

fn queuebump() -> Command {
    let mut cmd = Command::cargo_bin("queuebump").unwrap();
    cmd.env_remove("QUEUEBUMP_CONFIG")
        .env_remove("QUEUEBUMP_PAT")
        .env_remove("RUST_LOG");
    cmd
}

fn write_config(dir: &Path, body: &str) -> std::path::PathBuf {
    let path = dir.join("queuebump.toml");
    std::fs::write(&path, body).unwrap();
    path
}

const VALID: &str = r#"
[organization]
name = "contoso"
pat = "secret"

[schedule]
cron_expression = "*/5 * * * *"
time_zone = "utc"

[pools]
names = ["Linux"]
"#;

#[test]
fn test_cli_help() {
    queuebump()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicates::str::contains("scheduled builds"));
}

#[test]
fn test_cli_version() {
    queuebump()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicates::str::contains("queuebump"));
}

#[test]
fn test_subcommands_exist() {
    for sub in ["run", "once", "plan", "next-runs", "check-config"] {
        queuebump().args([sub, "--help"]).assert().success();
    }
}

#[test]
fn test_missing_config_file_fails() {
    let dir = tempfile::tempdir().unwrap();
    queuebump()
        .arg("--config")
        .arg(dir.path().join("nope.toml"))
        .arg("check-config")
        .assert()
        .failure()
        .stderr(predicates::str::contains("failed to read config file"));
}

#[test]
fn test_missing_settings_fail_fast() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_config(dir.path(), "[organization]\nname = \"contoso\"\n");
    queuebump()
        .arg("--config")
        .arg(&path)
        .arg("check-config")
        .assert()
        .failure()
        .stderr(predicates::str::contains("missing arguments"))
        .stderr(predicates::str::contains("pool names"));
}

#[test]
fn test_pat_from_environment() {
    let dir = tempfile::tempdir().unwrap();
    let body = VALID.replace("pat = \"secret\"\n", "");
    let path = write_config(dir.path(), &body);

    queuebump()
        .arg("--config")
        .arg(&path)
        .arg("check-config")
        .assert()
        .failure();

    queuebump()
        .env("QUEUEBUMP_PAT", "from-env")
        .arg("--config")
        .arg(&path)
        .arg("check-config")
        .assert()
        .success()
        .stdout(predicates::str::contains("Configuration OK"));
}

#[test]
fn test_next_runs_prints_requested_count() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_config(dir.path(), VALID);
    let output = queuebump()
        .arg("--config")
        .arg(&path)
        .args(["next-runs", "--count", "3"])
        .output()
        .unwrap();

    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout).unwrap();
    // header plus three timestamps
    assert_eq!(stdout.lines().count(), 4);
    assert!(stdout.contains("*/5 * * * *"));
}

#[test]
fn test_config_load_is_logged() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_config(dir.path(), VALID);
    queuebump()
        .arg("--config")
        .arg(&path)
        .arg("check-config")
        .assert()
        .success()
        .stderr(predicates::str::contains("Loaded worker configuration"));
}
