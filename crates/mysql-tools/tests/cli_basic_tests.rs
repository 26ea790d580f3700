use std::fs;
use std::path::{Path, PathBuf};

use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::{Value, json};
use tempfile::TempDir;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Helper to create a test command
fn mysql_tools() -> Command {
    let mut cmd = Command::cargo_bin("mysql-tools").unwrap();
    cmd.env_remove("MYSQL_TOOLS_PROFILE")
        .env_remove("MYSQL_TOOLS_CONFIG_FILE")
        .env_remove("MYSQL_TOOLS_MIGRATION_APP")
        .env_remove("RUST_LOG");
    cmd
}

fn write_config(dir: &TempDir, content: &str) -> PathBuf {
    let path = dir.path().join("config.toml");
    fs::write(&path, content).unwrap();
    path
}

fn with_config(config: &Path) -> Command {
    let mut cmd = mysql_tools();
    cmd.arg("--config-file").arg(config);
    cmd
}

// ============================================================================
// Help and parsing
// ============================================================================

#[test]
fn test_help_flag() {
    mysql_tools()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("service bindings"))
        .stdout(predicate::str::contains("EXAMPLES:"));
}

#[test]
fn test_version_flag() {
    mysql_tools()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("mysql-tools"))
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn test_version_command() {
    mysql_tools()
        .arg("version")
        .assert()
        .success()
        .stdout(predicate::str::starts_with(env!("CARGO_PKG_VERSION")))
        .stdout(predicate::str::contains("("));
}

#[test]
fn test_version_command_json() {
    let output = mysql_tools()
        .args(["version", "-o", "json"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let value: Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(value["name"], "mysql-tools");
    assert_eq!(value["version"], env!("CARGO_PKG_VERSION"));
}

#[test]
fn test_no_args_shows_usage() {
    mysql_tools()
        .assert()
        .failure()
        .code(2)
        .stderr(predicate::str::contains("Usage:"));
}

#[test]
fn test_invalid_subcommand() {
    mysql_tools()
        .arg("invalid-command")
        .assert()
        .failure()
        .stderr(predicate::str::contains("unrecognized subcommand"));
}

#[test]
fn test_migrate_requires_source_and_plan() {
    mysql_tools()
        .args(["migrate", "my-db"])
        .assert()
        .failure()
        .code(2)
        .stderr(predicate::str::contains("<PLAN_TYPE>"));
}

#[test]
fn test_migrate_help_mentions_no_cleanup() {
    mysql_tools()
        .args(["migrate", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("--no-cleanup"))
        .stdout(predicate::str::contains("<source>-new"));
}

#[test]
fn test_invalid_output_format() {
    mysql_tools()
        .args(["version", "-o", "xml"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid value"));
}

// ============================================================================
// Profiles
// ============================================================================

#[test]
fn test_profile_set_list_show_remove() {
    let dir = TempDir::new().unwrap();
    let config = dir.path().join("config.toml");

    with_config(&config)
        .args([
            "profile",
            "set",
            "lab",
            "--api-url",
            "https://api.lab.example.com",
            "--access-token",
            "secret-token",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("Profile 'lab' saved."))
        .stdout(predicate::str::contains("Set as default profile."));

    let saved = fs::read_to_string(&config).unwrap();
    assert!(saved.contains("default_profile = \"lab\""));

    with_config(&config)
        .args(["profile", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("lab*"))
        .stdout(predicate::str::contains("https://api.lab.example.com"));

    let output = with_config(&config)
        .args(["profile", "show", "lab", "-o", "json"])
        .output()
        .unwrap();
    assert!(output.status.success());
    let shown: Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(shown["access_token_configured"], true);
    assert_eq!(shown["recipient_product_name"], "p.mysql");
    assert!(!String::from_utf8_lossy(&output.stdout).contains("secret-token"));

    with_config(&config)
        .args(["profile", "remove", "lab", "--yes"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Default profile cleared."));

    with_config(&config)
        .args(["profile", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No profiles configured."));
}

#[test]
fn test_profile_remove_can_be_cancelled() {
    let dir = TempDir::new().unwrap();
    let config = write_config(
        &dir,
        r#"
[profiles.lab]
api_url = "https://api.lab.example.com"
"#,
    );

    with_config(&config)
        .args(["profile", "remove", "lab"])
        .write_stdin("n\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("cancelled"));

    assert!(fs::read_to_string(&config).unwrap().contains("[profiles.lab]"));
}

#[test]
fn test_profile_show_unknown_profile() {
    let dir = TempDir::new().unwrap();
    let config = write_config(&dir, "");

    with_config(&config)
        .args(["profile", "show", "missing"])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("Profile 'missing' not found"))
        .stderr(predicate::str::contains("mysql-tools profile list"));
}

#[test]
fn test_profile_default_requires_existing_profile() {
    let dir = TempDir::new().unwrap();
    let config = write_config(
        &dir,
        r#"
[profiles.lab]
api_url = "https://api.lab.example.com"

[profiles.prod]
api_url = "https://api.prod.example.com"
"#,
    );

    with_config(&config)
        .args(["profile", "default", "staging"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Profile 'staging' not found"));

    with_config(&config)
        .args(["profile", "default", "prod"])
        .assert()
        .success();
    assert!(
        fs::read_to_string(&config)
            .unwrap()
            .contains("default_profile = \"prod\"")
    );
}

#[test]
fn test_corrupt_config_file_is_reported() {
    let dir = TempDir::new().unwrap();
    let config = write_config(&dir, "[profiles.lab\n");

    with_config(&config)
        .args(["profile", "list"])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("Failed to parse config"));
}

// ============================================================================
// find-bindings
// ============================================================================

#[test]
fn test_find_bindings_without_profile() {
    let dir = TempDir::new().unwrap();
    let config = write_config(&dir, "");

    with_config(&config)
        .args(["find-bindings", "p.mysql"])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("No profile configured"));
}

fn resource(guid: &str, entity: Value) -> Value {
    json!({ "metadata": { "guid": guid }, "entity": entity })
}

async fn mock_list(server: &MockServer, endpoint: &str, q: &str, resources: Vec<Value>) {
    Mock::given(method("GET"))
        .and(path(endpoint))
        .and(query_param("q", q))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "next_url": null, "resources": resources })),
        )
        .mount(server)
        .await;
}

async fn mock_get(server: &MockServer, endpoint: &str, guid: &str, entity: Value) {
    Mock::given(method("GET"))
        .and(path(endpoint))
        .respond_with(ResponseTemplate::new(200).set_body_json(resource(guid, entity)))
        .mount(server)
        .await;
}

async fn single_binding_catalog() -> MockServer {
    let server = MockServer::start().await;
    mock_list(
        &server,
        "/v2/services",
        "label:p.mysql",
        vec![resource("service-guid", json!({ "label": "p.mysql" }))],
    )
    .await;
    mock_list(
        &server,
        "/v2/service_plans",
        "service_guid:service-guid",
        vec![resource("small-guid", json!({ "name": "small" }))],
    )
    .await;
    mock_list(
        &server,
        "/v2/service_instances",
        "service_plan_guid:small-guid",
        vec![resource(
            "instance1-guid",
            json!({ "name": "instance1", "space_guid": "space1-guid" }),
        )],
    )
    .await;
    mock_list(
        &server,
        "/v2/service_bindings",
        "service_instance_guid:instance1-guid",
        vec![resource("binding1-guid", json!({ "app_guid": "app1-guid" }))],
    )
    .await;
    mock_list(
        &server,
        "/v2/service_keys",
        "service_instance_guid:instance1-guid",
        vec![resource("key1-guid", json!({ "name": "key1" }))],
    )
    .await;
    mock_get(
        &server,
        "/v2/apps/app1-guid",
        "app1-guid",
        json!({ "name": "app1", "space_guid": "space1-guid" }),
    )
    .await;
    mock_get(
        &server,
        "/v2/spaces/space1-guid",
        "space1-guid",
        json!({ "name": "app1-space", "organization_guid": "org1-guid" }),
    )
    .await;
    mock_get(
        &server,
        "/v2/organizations/org1-guid",
        "org1-guid",
        json!({ "name": "app1-org" }),
    )
    .await;
    server
}

#[tokio::test(flavor = "multi_thread")]
async fn test_find_bindings_json_output() {
    let server = single_binding_catalog().await;
    let dir = TempDir::new().unwrap();
    let config = write_config(
        &dir,
        &format!(
            "[profiles.mock]\napi_url = \"{}\"\naccess_token = \"bearer token\"\n",
            server.uri()
        ),
    );

    let output = with_config(&config)
        .args(["find-bindings", "p.mysql", "-o", "json"])
        .output()
        .unwrap();
    assert!(
        output.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );

    let records: Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(
        records,
        json!([
            {
                "name": "app1",
                "serviceInstanceName": "instance1",
                "serviceInstanceGuid": "instance1-guid",
                "orgName": "app1-org",
                "spaceName": "app1-space",
                "type": "AppBinding"
            },
            {
                "name": "key1",
                "serviceInstanceName": "instance1",
                "serviceInstanceGuid": "instance1-guid",
                "orgName": "app1-org",
                "spaceName": "app1-space",
                "type": "ServiceKeyBinding"
            }
        ])
    );
}

#[tokio::test(flavor = "multi_thread")]
async fn test_find_bindings_table_output() {
    let server = single_binding_catalog().await;
    let dir = TempDir::new().unwrap();
    let config = write_config(
        &dir,
        &format!("[profiles.mock]\napi_url = \"{}\"\n", server.uri()),
    );

    with_config(&config)
        .args(["find-bindings", "p.mysql"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Service Instance"))
        .stdout(predicate::str::contains("app1-org"))
        .stdout(predicate::str::contains("ServiceKeyBinding"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_find_bindings_rejected_token() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(401).set_body_string("Invalid Auth Token"))
        .mount(&server)
        .await;
    let dir = TempDir::new().unwrap();
    let config = write_config(
        &dir,
        &format!("[profiles.mock]\napi_url = \"{}\"\n", server.uri()),
    );

    with_config(&config)
        .args(["find-bindings", "p.mysql"])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("Authentication failed"))
        .stderr(predicate::str::contains("cf oauth-token"));
}

// ============================================================================
// migrate
// ============================================================================

#[test]
fn test_migrate_without_migration_app() {
    let dir = TempDir::new().unwrap();
    let config = write_config(
        &dir,
        r#"
[profiles.lab]
api_url = "https://api.lab.example.com"
"#,
    );

    with_config(&config)
        .args(["migrate", "my-db", "db-small"])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains(
            "No migration app configured for profile 'lab'",
        ))
        .stderr(predicate::str::contains("--migration-app"));
}

#[cfg(unix)]
#[test]
fn test_migrate_missing_source_instance() {
    use std::os::unix::fs::PermissionsExt;

    let dir = TempDir::new().unwrap();
    let config = write_config(&dir, "");

    // A cf stand-in that knows no service instances
    let cf = dir.path().join("cf");
    fs::write(&cf, "#!/bin/sh\necho \"Service instance $2 not found\" >&2\nexit 1\n").unwrap();
    fs::set_permissions(&cf, fs::Permissions::from_mode(0o755)).unwrap();

    with_config(&config)
        .args(["migrate", "my-db", "db-small", "--migration-app"])
        .arg(dir.path().join("migrate-app.tgz"))
        .arg("--cf-binary")
        .arg(&cf)
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("Service instance my-db not found"))
        .stderr(predicate::str::contains("cf services"));
}
