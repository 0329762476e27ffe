//! End-to-end tests for the `batch` binary
//!
//! A wiremock server stands in for the batch API; each test checks the
//! request the CLI sends and what it prints.

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;
use wiremock::{
    matchers::{body_json, body_string_contains, method, path},
    Mock, MockServer, ResponseTemplate,
};

fn batch(server: &MockServer) -> Command {
    let mut cmd = Command::cargo_bin("batch").unwrap();
    cmd.arg("--api").arg(server.uri());
    cmd
}

fn job_status_json(state: &str) -> serde_json::Value {
    serde_json::json!({
        "job_id": "a1b2c3d4",
        "model_id": "m1",
        "state": state,
        "totals": { "rows": 3, "ok": 3, "errors": 2 },
        "timings": { "waiting_ms": 0, "processing_ms": 12 },
        "updated_at": "2026-01-18T10:00:00Z",
        "started_at": "2026-01-18T09:59:59Z"
    })
}

#[tokio::test]
async fn test_model_list() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/models"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
            { "id": "m1", "name": "orders", "schema": {} }
        ])))
        .mount(&server)
        .await;

    batch(&server)
        .args(["model", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains(r#""name": "orders""#));
}

#[tokio::test]
async fn test_model_create_sends_name_and_schema() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/models"))
        .and(body_json(serde_json::json!({
            "name": "orders",
            "schema": { "fields": ["id", "amount"] }
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(serde_json::json!({
            "id": "x9y8z7w6", "name": "orders", "schema": { "fields": ["id", "amount"] }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let schema = dir.path().join("schema.json");
    fs::write(&schema, r#"{"fields": ["id", "amount"]}"#).unwrap();

    batch(&server)
        .args(["model", "create", "orders"])
        .arg(&schema)
        .assert()
        .success()
        .stdout(predicate::str::contains(r#""id": "x9y8z7w6""#));
}

#[tokio::test]
async fn test_model_update_sends_schema_only() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path("/models/m1"))
        .and(body_json(serde_json::json!({ "schema": { "version": 2 } })))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "id": "m1", "name": "orders", "schema": { "version": 2 }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let schema = dir.path().join("schema.json");
    fs::write(&schema, r#"{"version": 2}"#).unwrap();

    batch(&server)
        .args(["model", "update", "m1"])
        .arg(&schema)
        .assert()
        .success();
}

#[tokio::test]
async fn test_model_delete_prints_nothing() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path("/models/m1"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    batch(&server)
        .args(["model", "delete", "m1"])
        .assert()
        .success()
        .stdout(predicate::str::is_empty());
}

#[tokio::test]
async fn test_job_create_uploads_file() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/jobs"))
        .and(body_string_contains("name=\"model_id\""))
        .and(body_string_contains("filename=\"orders.csv\""))
        .respond_with(
            ResponseTemplate::new(202).set_body_json(serde_json::json!({ "job_id": "a1b2c3d4" })),
        )
        .expect(1)
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let file = dir.path().join("orders.csv");
    fs::write(&file, "1,a\n2,b\n").unwrap();

    batch(&server)
        .args(["job", "create", "m1"])
        .arg(&file)
        .assert()
        .success()
        .stdout(predicate::str::contains(r#""job_id": "a1b2c3d4""#));
}

#[tokio::test]
async fn test_job_create_with_missing_file() {
    let server = MockServer::start().await;

    batch(&server)
        .args(["job", "create", "m1", "/no/such/file.csv"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("File not found"));
}

#[tokio::test]
async fn test_job_status() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/jobs/a1b2c3d4"))
        .respond_with(ResponseTemplate::new(200).set_body_json(job_status_json("PARTIAL_SUCCESS")))
        .mount(&server)
        .await;

    batch(&server)
        .args(["job", "status", "a1b2c3d4"])
        .assert()
        .success()
        .stdout(predicate::str::contains(r#""state": "PARTIAL_SUCCESS""#))
        .stdout(predicate::str::contains(r#""errors": 2"#));
}

#[tokio::test]
async fn test_job_cancel() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path("/jobs/a1b2c3d4"))
        .respond_with(ResponseTemplate::new(202).set_body_json(job_status_json("CANCELLED")))
        .expect(1)
        .mount(&server)
        .await;

    batch(&server)
        .args(["job", "cancel", "a1b2c3d4"])
        .assert()
        .success()
        .stdout(predicate::str::contains(r#""state": "CANCELLED""#));
}

#[tokio::test]
async fn test_job_rejected() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/jobs/a1b2c3d4/rejected"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
            {
                "job_id": "a1b2c3d4",
                "row_number": 2,
                "raw_data": "2,b,extra",
                "error": "found record with 3 fields, but the previous record has 2 fields",
                "timestamp": "2026-01-18T10:00:00Z"
            }
        ])))
        .mount(&server)
        .await;

    batch(&server)
        .args(["job", "rejected", "a1b2c3d4"])
        .assert()
        .success()
        .stdout(predicate::str::contains(r#""row_number": 2"#))
        .stdout(predicate::str::contains(r#""raw_data": "2,b,extra""#));
}

#[tokio::test]
async fn test_error_body_is_printed_and_exit_code_is_nonzero() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/jobs/nope"))
        .respond_with(ResponseTemplate::new(404).set_body_json(serde_json::json!({
            "success": false,
            "error": { "code": "JOB_NOT_FOUND", "message": "job not found" }
        })))
        .mount(&server)
        .await;

    batch(&server)
        .args(["job", "status", "nope"])
        .assert()
        .failure()
        .stdout(predicate::str::contains("JOB_NOT_FOUND"))
        .stderr(predicate::str::contains("Server returned 404"));
}

#[tokio::test]
async fn test_api_url_from_environment() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/jobs"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([])))
        .expect(1)
        .mount(&server)
        .await;

    Command::cargo_bin("batch")
        .unwrap()
        .env("BATCH_API_URL", server.uri())
        .args(["job", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("[]"));
}
