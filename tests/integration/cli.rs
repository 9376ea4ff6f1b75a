//! CLI surface tests: parsing, help output, configuration errors.

use super::common;
use assert_cmd::Command;
use predicates::prelude::*;

fn pmsup() -> Command {
    let mut cmd = Command::cargo_bin("pmsup").unwrap();
    cmd.env("NO_COLOR", "1").env("PMSUP_NO_PROGRESS", "1");
    cmd
}

#[test]
fn help_lists_subcommands() {
    pmsup()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("run"))
        .stdout(predicate::str::contains("check"))
        .stdout(predicate::str::contains("status"));
}

#[test]
fn version_flag_works() {
    pmsup()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn missing_config_file_fails_with_path() {
    pmsup()
        .args(["--config", "/nonexistent/pmsup.toml", "check"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Configuration file not found"))
        .stderr(predicate::str::contains("/nonexistent/pmsup.toml"));
}

#[test]
fn config_env_var_is_honored() {
    pmsup()
        .env("PMSUP_CONFIG", "/also/nonexistent/pmsup.toml")
        .arg("check")
        .assert()
        .failure()
        .stderr(predicate::str::contains("/also/nonexistent/pmsup.toml"));
}

#[test]
fn invalid_config_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(
        &path,
        r#"
[server]
token = ""
host_url = "http://127.0.0.1:32400"
download_url = "https://plex.tv/api/downloads/5.json"
distro = "debian"
build = "linux-x86_64"
download_dir = "/tmp/dl"
archive_dir = "/tmp/ar"
"#,
    )
    .unwrap();

    pmsup()
        .args(["--config", path.to_str().unwrap(), "check"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("server.token"));
}

#[test]
fn verbose_and_quiet_are_mutually_exclusive() {
    pmsup().args(["--verbose", "--quiet", "check"]).assert().failure();
}

#[test]
fn unreachable_server_is_fatal() {
    let dir = tempfile::tempdir().unwrap();
    // Port 1 refuses connections immediately.
    let path = common::ConfigBuilder::new(
        "http://127.0.0.1:1/identity",
        "http://127.0.0.1:1/downloads",
    )
    .write(dir.path());

    pmsup()
        .args(["--config", path.to_str().unwrap(), "check"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Cannot read server state"));
}
