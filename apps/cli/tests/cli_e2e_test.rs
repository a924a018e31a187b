//! Integration tests for the `stratus` binary.

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

const CUSTOM_SCHEMA: &str = "gs://google-cloud-platform/schema/trainingjob/definition/custom_task_1.0.0.yaml";

/// A command isolated from the caller's environment and working directory.
fn stratus(dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("stratus").unwrap();
    cmd.current_dir(dir.path())
        .env_remove("STRATUS_PROJECT")
        .env_remove("STRATUS_LOCATION")
        .env_remove("STRATUS_API_ENDPOINT")
        .env_remove("STRATUS_ACCESS_TOKEN")
        .env("NO_COLOR", "1");
    cmd
}

#[test]
fn test_version() {
    let dir = TempDir::new().unwrap();
    stratus(&dir).arg("--version").assert().success().stdout(predicate::str::contains("stratus 0.1.0"));
}

#[test]
fn test_help() {
    let dir = TempDir::new().unwrap();
    stratus(&dir)
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("dataset"))
        .stdout(predicate::str::contains("tensorboard"));
}

#[test]
fn test_config_from_file_and_env() {
    let dir = TempDir::new().unwrap();
    std::fs::write(
        dir.path().join("stratus.toml"),
        "project = \"file-project\"\nlocation = \"europe-west4\"\nrequest_timeout_secs = 30\n",
    )
    .unwrap();

    let assert = stratus(&dir)
        .env("STRATUS_PROJECT", "env-project")
        .args(["config", "--json"])
        .assert()
        .success();

    let stdout = String::from_utf8_lossy(&assert.get_output().stdout).to_string();
    let json: serde_json::Value = serde_json::from_str(&stdout).expect("config JSON");
    assert_eq!(json["project"], "env-project");
    assert_eq!(json["location"], "europe-west4");
    assert_eq!(json["request_timeout_secs"], 30);
    assert!(json.get("access_token").is_none());
}

#[test]
fn test_cli_flags_override_env() {
    let dir = TempDir::new().unwrap();
    stratus(&dir)
        .env("STRATUS_PROJECT", "env-project")
        .args(["config", "--project", "flag-project", "--location", "asia-east1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("flag-project"))
        .stdout(predicate::str::contains("https://asia-east1-aiplatform.googleapis.com/v1"));
}

#[test]
fn test_missing_config_file_fails() {
    let dir = TempDir::new().unwrap();
    stratus(&dir)
        .args(["--config", "nope.toml", "config"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("configuration file not found"));
}

#[test]
fn test_remote_command_requires_project() {
    let dir = TempDir::new().unwrap();
    stratus(&dir)
        .args(["job", "get", "projects/p/locations/us-central1/trainingPipelines/1"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("project is required"));
}

#[test]
fn test_job_get_resolves_wrapper_type() {
    let dir = TempDir::new().unwrap();
    let mut server = mockito::Server::new();
    let mock = server
        .mock("GET", "/v1/projects/p/locations/us-central1/trainingPipelines/7")
        .match_header("authorization", "Bearer secret")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(format!(
            r#"{{
                "name": "projects/p/locations/us-central1/trainingPipelines/7",
                "displayName": "nightly",
                "trainingTaskDefinition": "{CUSTOM_SCHEMA}",
                "state": "PIPELINE_STATE_RUNNING"
            }}"#
        ))
        .create();

    let assert = stratus(&dir)
        .env("STRATUS_PROJECT", "p")
        .env("STRATUS_API_ENDPOINT", server.url())
        .env("STRATUS_ACCESS_TOKEN", "secret")
        .args(["job", "get", "projects/p/locations/us-central1/trainingPipelines/7", "--json"])
        .assert()
        .success();

    let stdout = String::from_utf8_lossy(&assert.get_output().stdout).to_string();
    let json: serde_json::Value = serde_json::from_str(&stdout).expect("job JSON");
    assert_eq!(json["type"], "CustomTrainingJob");
    assert_eq!(json["state"], "PIPELINE_STATE_RUNNING");
    assert!(json["model"].is_null());
    mock.assert();
}

#[test]
fn test_job_get_reports_service_errors() {
    let dir = TempDir::new().unwrap();
    let mut server = mockito::Server::new();
    server
        .mock("GET", "/v1/projects/p/locations/us-central1/trainingPipelines/9")
        .with_status(404)
        .with_body(r#"{"error": {"code": 404, "message": "pipeline 9 not found", "status": "NOT_FOUND"}}"#)
        .create();

    stratus(&dir)
        .env("STRATUS_PROJECT", "p")
        .env("STRATUS_API_ENDPOINT", server.url())
        .args(["job", "get", "projects/p/locations/us-central1/trainingPipelines/9"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("pipeline 9 not found"));
}

#[test]
fn test_tensorboard_location() {
    let dir = TempDir::new().unwrap();
    let mut server = mockito::Server::new();
    server
        .mock("GET", "/v1/projects/p/locations/us-central1/tensorboards/3")
        .with_status(200)
        .with_body(
            r#"{"name": "projects/p/locations/us-central1/tensorboards/3", "blobStoragePathPrefix": "tb-bucket/tb-3"}"#,
        )
        .create();

    stratus(&dir)
        .env("STRATUS_PROJECT", "p")
        .env("STRATUS_API_ENDPOINT", server.url())
        .args(["tensorboard", "location", "projects/p/locations/us-central1/tensorboards/3"])
        .assert()
        .success()
        .stdout(predicate::str::contains("gs://tb-bucket/tb-3/"));
}

#[test]
fn test_dataset_import_requires_uris() {
    let dir = TempDir::new().unwrap();
    stratus(&dir)
        .args(["dataset", "import", "projects/p/locations/l/datasets/1", "--format", "text-sentiment"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("<URIS>"));
}
