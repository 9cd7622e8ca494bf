//! Integration tests for the `pmsgate` CLI binary.
//!
//! Argument parsing, help output, completions and offline commands run
//! without a gateway. The gateway-backed tests point a temporary config
//! file at a local mock server.
#![allow(clippy::unwrap_used)]

use std::path::Path;

use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use serde_json::{Value, json};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

// ── Helpers ─────────────────────────────────────────────────────────

const ENV_VARS: &[&str] = &[
    "PMSGATE_PROFILE",
    "PMSGATE_GATEWAY",
    "PMSGATE_HOTEL",
    "PMSGATE_CATALOG",
    "PMSGATE_LANGUAGE",
    "PMSGATE_OUTPUT",
    "PMSGATE_CONNECT_TIMEOUT",
    "PMSGATE_TIMEOUT",
    "PMSGATE_CLIENT_SECRET",
    "RUST_LOG",
];

/// Build a [`Command`] for the `pmsgate` binary with env isolation.
///
/// Clears all `PMSGATE_*` env vars and points config directories at a
/// nonexistent path so tests never touch the user's real configuration.
fn pmsgate_cmd() -> assert_cmd::Command {
    pmsgate_cmd_in(Path::new("/tmp/pmsgate-cli-test-nonexistent"))
}

/// Same as [`pmsgate_cmd`] with config directories rooted at `home`.
fn pmsgate_cmd_in(home: &Path) -> assert_cmd::Command {
    let mut cmd = cargo_bin_cmd!("pmsgate");
    cmd.env("HOME", home).env("XDG_CONFIG_HOME", home);
    for var in ENV_VARS {
        cmd.env_remove(var);
    }
    cmd
}

/// Concatenate stdout + stderr from a command output for flexible matching.
fn combined_output(output: &std::process::Output) -> String {
    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);
    format!("{stdout}{stderr}")
}

/// Write a single-profile config pointing at `gateway`.
fn write_config(home: &Path, gateway: &str) {
    let dir = home.join("pmsgate");
    std::fs::create_dir_all(&dir).unwrap();
    std::fs::write(
        dir.join("config.toml"),
        format!(
            r#"
default_profile = "resort"

[profiles.resort]
gateway_url = "{gateway}"
enterprise_id = "ENT1"
hotel_id = "HOTEL1"
client_id = "client-id"
client_secret_env = "RESORT_SECRET"
app_key = "app-key-1"
scope = "pms-scope"
"#
        ),
    )
    .unwrap();
}

async fn mock_token(server: &MockServer, status: u16) {
    let body = if status == 200 {
        json!({ "access_token": "tok-1", "token_type": "Bearer", "expires_in": 3600 })
    } else {
        json!({ "error": "invalid_client" })
    };
    Mock::given(method("POST"))
        .and(path("/oauth/v1/tokens"))
        .respond_with(ResponseTemplate::new(status).set_body_json(body))
        .mount(server)
        .await;
}

/// Run a blocking command off the async runtime the mock server lives on.
async fn run(mut cmd: assert_cmd::Command) -> std::process::Output {
    tokio::task::spawn_blocking(move || cmd.output().unwrap())
        .await
        .unwrap()
}

// ── Basic invocation ────────────────────────────────────────────────

#[test]
fn test_no_args_shows_help() {
    let output = pmsgate_cmd().output().unwrap();
    assert_eq!(output.status.code(), Some(2), "Expected exit code 2");
    let text = combined_output(&output);
    assert!(text.contains("Usage"), "Expected 'Usage' in output:\n{text}");
}

#[test]
fn test_help_flag() {
    pmsgate_cmd().arg("--help").assert().success().stdout(
        predicate::str::contains("availability")
            .and(predicate::str::contains("reserve"))
            .and(predicate::str::contains("lookup"))
            .and(predicate::str::contains("catalog")),
    );
}

#[test]
fn test_version_flag() {
    pmsgate_cmd()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("pmsgate"));
}

#[test]
fn test_invalid_subcommand() {
    pmsgate_cmd()
        .arg("checkout")
        .assert()
        .code(2)
        .stderr(predicate::str::contains("unrecognized subcommand"));
}

// ── Shell completions ───────────────────────────────────────────────

#[test]
fn test_completions_bash() {
    pmsgate_cmd()
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::is_empty().not());
}

#[test]
fn test_completions_zsh() {
    pmsgate_cmd()
        .args(["completions", "zsh"])
        .assert()
        .success()
        .stdout(predicate::str::contains("#compdef"));
}

// ── Offline commands ────────────────────────────────────────────────

#[test]
fn test_catalog_rooms_plain_uses_builtin_catalog() {
    pmsgate_cmd()
        .args(["catalog", "rooms", "-o", "plain"])
        .assert()
        .success()
        .stdout(predicate::str::contains("1BBFG").and(predicate::str::contains("2BMS")));
}

#[test]
fn test_catalog_rate_plans_json() {
    let output = pmsgate_cmd()
        .args(["catalog", "rate-plans", "-o", "json"])
        .output()
        .unwrap();
    assert!(output.status.success());
    let plans: Value = serde_json::from_slice(&output.stdout).unwrap();
    let codes: Vec<&str> = plans
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["code"].as_str().unwrap())
        .collect();
    assert!(codes.contains(&"AIF-2025"));
    assert_eq!(codes.len(), 6);
}

#[test]
fn test_catalog_rooms_spanish_labels() {
    pmsgate_cmd()
        .args(["catalog", "rooms", "--language", "es", "--color", "never"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Vista al Mar"));
}

#[test]
fn test_catalog_file_with_bad_reference_is_config_error() {
    let dir = tempfile::tempdir().unwrap();
    let catalog = dir.path().join("catalog.toml");
    std::fs::write(
        &catalog,
        r#"
[room_types.PH]
name = { en = "Penthouse", es = "Penthouse" }
bedrooms = 3
max_adults = 6
max_children = 2
view = "pool"
sort_order = 1

[rate_plans]
[package_types]
"#,
    )
    .unwrap();

    let output = pmsgate_cmd()
        .args(["catalog", "check", "--catalog"])
        .arg(&catalog)
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(9));
    assert!(combined_output(&output).contains("has no label"));
}

#[test]
fn test_config_path() {
    pmsgate_cmd()
        .args(["config", "path"])
        .assert()
        .success()
        .stdout(predicate::str::contains("config.toml"));
}

#[test]
fn test_config_show_redacts_secret() {
    let home = tempfile::tempdir().unwrap();
    write_config(home.path(), "http://127.0.0.1:9");
    let config = home.path().join("pmsgate").join("config.toml");
    let raw = std::fs::read_to_string(&config).unwrap();
    std::fs::write(&config, format!("{raw}client_secret = \"hunter2\"\n")).unwrap();

    pmsgate_cmd_in(home.path())
        .args(["config", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("****").and(predicate::str::contains("hunter2").not()));
}

// ── Configuration errors ────────────────────────────────────────────

#[test]
fn test_availability_without_config() {
    let output = pmsgate_cmd()
        .args(["availability", "--check-in", "2099-06-01", "--check-out", "2099-06-05"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(9));
    assert!(combined_output(&output).contains("No configuration found"));
}

#[test]
fn test_unknown_profile() {
    let output = pmsgate_cmd()
        .args(["token", "--profile", "staging"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(9));
    assert!(combined_output(&output).contains("staging"));
}

#[test]
fn test_incomplete_profile_lists_missing_fields() {
    let output = pmsgate_cmd()
        .args(["token", "--gateway", "http://127.0.0.1:9", "--hotel", "HOTEL1"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(9));
    let text = combined_output(&output);
    assert!(text.contains("enterprise_id"), "{text}");
    assert!(text.contains("client_secret"), "{text}");
}

// ── Gateway-backed ──────────────────────────────────────────────────

#[tokio::test(flavor = "multi_thread")]
async fn test_availability_json_against_mock_gateway() {
    let server = MockServer::start().await;
    mock_token(&server, 200).await;
    Mock::given(method("GET"))
        .and(path("/par/v1/hotels/HOTEL1/availability"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "hotelAvailability": [{
                "roomStays": [{
                    "roomRates": [
                        {
                            "roomType": "1BBFG",
                            "ratePlanCode": "AIF-2025",
                            "total": { "amountBeforeTax": 500, "currencyCode": "USD" },
                            "start": "2099-06-01",
                            "end": "2099-06-05"
                        },
                        {
                            "roomType": "VILLA",
                            "ratePlanCode": "AIF-2025",
                            "total": { "amountBeforeTax": 900, "currencyCode": "USD" },
                            "start": "2099-06-01",
                            "end": "2099-06-05"
                        }
                    ]
                }]
            }]
        })))
        .mount(&server)
        .await;

    let home = tempfile::tempdir().unwrap();
    write_config(home.path(), &server.uri());
    let mut cmd = pmsgate_cmd_in(home.path());
    cmd.env("RESORT_SECRET", "s3cr3t").args([
        "availability",
        "--check-in",
        "2099-06-01",
        "--check-out",
        "2099-06-05",
        "-o",
        "json",
    ]);

    let output = run(cmd).await;
    assert!(output.status.success(), "{}", combined_output(&output));

    let outcome: Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(outcome["nights"], 4);
    assert_eq!(outcome["rooms"][0]["roomTypeCode"], "1BBFG");
    assert_eq!(outcome["rooms"][0]["rates"][0]["amountAfterTax"], 500.0);
    assert_eq!(outcome["diagnostics"][0]["mismatch"], "room_type_unmapped");

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("VILLA"), "{stderr}");
}

#[tokio::test(flavor = "multi_thread")]
async fn test_rejected_credentials_exit_with_auth_code() {
    let server = MockServer::start().await;
    mock_token(&server, 401).await;

    let home = tempfile::tempdir().unwrap();
    write_config(home.path(), &server.uri());
    let mut cmd = pmsgate_cmd_in(home.path());
    cmd.env("RESORT_SECRET", "wrong").arg("token");

    let output = run(cmd).await;
    assert_eq!(output.status.code(), Some(3), "{}", combined_output(&output));
    assert!(combined_output(&output).contains("Authentication failed"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_lookup_missing_reservation_exits_not_found() {
    let server = MockServer::start().await;
    mock_token(&server, 200).await;
    Mock::given(method("GET"))
        .and(path("/rsv/v1/hotels/HOTEL1/reservations/404404"))
        .respond_with(ResponseTemplate::new(404).set_body_string("no such reservation"))
        .mount(&server)
        .await;

    let home = tempfile::tempdir().unwrap();
    write_config(home.path(), &server.uri());
    let mut cmd = pmsgate_cmd_in(home.path());
    cmd.env("RESORT_SECRET", "s3cr3t").args(["lookup", "404404"]);

    let output = run(cmd).await;
    assert_eq!(output.status.code(), Some(4), "{}", combined_output(&output));
    assert!(combined_output(&output).contains("Reservation '404404' not found"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_invalid_dates_never_reach_the_gateway() {
    let server = MockServer::start().await;
    mock_token(&server, 200).await;

    let home = tempfile::tempdir().unwrap();
    write_config(home.path(), &server.uri());
    let mut cmd = pmsgate_cmd_in(home.path());
    cmd.env("RESORT_SECRET", "s3cr3t").args([
        "availability",
        "--check-in",
        "2099-06-05",
        "--check-out",
        "2099-06-01",
    ]);

    let output = run(cmd).await;
    assert_eq!(output.status.code(), Some(2), "{}", combined_output(&output));
    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test(flavor = "multi_thread")]
async fn test_failed_reservation_prints_idempotency_key() {
    let server = MockServer::start().await;
    mock_token(&server, 200).await;
    Mock::given(method("POST"))
        .and(path("/rsv/v1/hotels/HOTEL1/reservations"))
        .respond_with(ResponseTemplate::new(502).set_body_string("bad gateway"))
        .expect(1)
        .mount(&server)
        .await;

    let home = tempfile::tempdir().unwrap();
    write_config(home.path(), &server.uri());
    let mut cmd = pmsgate_cmd_in(home.path());
    cmd.env("RESORT_SECRET", "s3cr3t").args([
        "reserve",
        "--check-in",
        "2099-06-01",
        "--check-out",
        "2099-06-05",
        "--room-type",
        "1BBFG",
        "--first-name",
        "Ana",
        "--last-name",
        "Lopez",
        "--email",
        "ana@example.com",
        "--amount",
        "500",
    ]);

    let output = run(cmd).await;
    let text = combined_output(&output);
    assert_eq!(output.status.code(), Some(5), "{text}");

    let requests = server.received_requests().await.unwrap();
    let key = requests
        .iter()
        .find(|r| r.url.path() == "/rsv/v1/hotels/HOTEL1/reservations")
        .and_then(|r| r.headers.get("idempotency-key"))
        .unwrap()
        .to_str()
        .unwrap()
        .to_owned();
    assert!(text.contains(&format!("--idempotency-key {key}")), "{text}");
}
