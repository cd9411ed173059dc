//! CLI integration tests
//!
//! Tests the wst-gateway binary using assert_cmd.

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

/// Gateway command isolated from the user's config directory and environment
fn wst_gateway(home: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("wst-gateway")
        .expect("Failed to locate wst-gateway binary - ensure it's built before running tests");
    cmd.env("HOME", home.path())
        .env("XDG_CONFIG_HOME", home.path())
        .env_remove("WST_PASSWORD")
        .env_remove("RUST_LOG");
    cmd
}

#[test]
fn test_cli_help() {
    let home = TempDir::new().unwrap();
    wst_gateway(&home)
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("wst-gateway"))
        .stdout(predicate::str::contains("--ip-address"))
        .stdout(predicate::str::contains("--password"));
}

#[test]
fn test_cli_version() {
    let home = TempDir::new().unwrap();
    wst_gateway(&home)
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("wst-gateway"));
}

#[test]
fn test_no_arguments_reports_port_first() {
    let home = TempDir::new().unwrap();
    wst_gateway(&home)
        .assert()
        .failure()
        .stderr(predicate::str::contains("port is mandatory"));
}

#[test]
fn test_missing_host_reported() {
    let home = TempDir::new().unwrap();
    wst_gateway(&home)
        .args(["--port", "8080", "--username", "ops", "--password", "secret"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("host is mandatory"));
}

#[test]
fn test_missing_password_reported() {
    let home = TempDir::new().unwrap();
    wst_gateway(&home)
        .args(["--port", "8080", "--ip-address", "10.0.0.5", "--username", "ops"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("password is mandatory"));
}

#[test]
fn test_config_file_fills_missing_arguments() {
    let home = TempDir::new().unwrap();
    let config_path = home.path().join("tunnel.toml");
    std::fs::write(
        &config_path,
        r#"
[gateway]
port = 8080

[remote]
host = "10.0.0.5"
password = "secret"
"#,
    )
    .unwrap();

    // Everything but the username comes from the file
    wst_gateway(&home)
        .arg("--config")
        .arg(&config_path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("username is mandatory"));
}

#[test]
fn test_missing_config_file_reported() {
    let home = TempDir::new().unwrap();
    wst_gateway(&home)
        .args(["--config", "/nonexistent/tunnel.toml"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to load config"));
}

#[test]
fn test_occupied_port_reported() {
    let home = TempDir::new().unwrap();
    let occupied = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let port = occupied.local_addr().unwrap().port().to_string();

    wst_gateway(&home)
        .args([
            "--port",
            port.as_str(),
            "--bind",
            "127.0.0.1",
            "--ip-address",
            "10.0.0.5",
            "--username",
            "ops",
            "--password",
            "secret",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to bind"));
}
