//! Shared helpers for batch server integration tests
//!
//! Every test gets its own router over a fresh [`MemoryBroker`], so no
//! Kafka instance is needed and tests never share registries.

#![allow(dead_code)]

use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use batch_server::{
    api::create_router,
    config::Config,
    features::FeatureState,
    ingest::MemoryBroker,
};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;
use tower::ServiceExt;

const BOUNDARY: &str = "batch-test-boundary";

pub struct TestApp {
    pub router: Router,
    pub broker: MemoryBroker,
    pub state: FeatureState,
}

impl TestApp {
    pub fn new() -> Self {
        Self::with_config(test_config())
    }

    pub fn with_config(config: Config) -> Self {
        let broker = MemoryBroker::new();
        let state = FeatureState::new(Arc::new(broker.clone()), &config);
        let router = create_router(state.clone(), &config);
        Self {
            router,
            broker,
            state,
        }
    }

    pub async fn request(&self, request: Request<Body>) -> (StatusCode, Value) {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, body)
    }

    pub async fn get(&self, uri: &str) -> (StatusCode, Value) {
        self.request(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
    }

    pub async fn delete(&self, uri: &str) -> (StatusCode, Value) {
        self.request(
            Request::builder()
                .method(Method::DELETE)
                .uri(uri)
                .body(Body::empty())
                .unwrap(),
        )
        .await
    }

    pub async fn send_json(&self, method: Method, uri: &str, body: Value) -> (StatusCode, Value) {
        self.request(
            Request::builder()
                .method(method)
                .uri(uri)
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
    }

    /// Register a model with a fixed id.
    pub async fn create_model(&self, id: &str) {
        let (status, _) = self
            .send_json(
                Method::POST,
                "/models",
                json!({ "id": id, "name": format!("{id} model"), "schema": {} }),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED);
    }

    pub async fn upload(
        &self,
        model_id: Option<&str>,
        file: Option<(&str, &[u8])>,
    ) -> (StatusCode, Value) {
        self.request(
            Request::builder()
                .method(Method::POST)
                .uri("/jobs")
                .header(
                    header::CONTENT_TYPE,
                    format!("multipart/form-data; boundary={BOUNDARY}"),
                )
                .body(Body::from(multipart_body(model_id, file)))
                .unwrap(),
        )
        .await
    }

    /// Upload and return the new job id, panicking on anything but 202.
    pub async fn start_job(&self, model_id: &str, file_name: &str, bytes: &[u8]) -> String {
        let (status, body) = self.upload(Some(model_id), Some((file_name, bytes))).await;
        assert_eq!(status, StatusCode::ACCEPTED, "upload rejected: {body}");
        body["job_id"].as_str().unwrap().to_string()
    }

    /// Poll the status endpoint until the job leaves PENDING/RUNNING.
    pub async fn wait_for_terminal(&self, job_id: &str) -> Value {
        for _ in 0..400 {
            let (status, body) = self.get(&format!("/jobs/{job_id}")).await;
            assert_eq!(status, StatusCode::OK);
            if body["state"] != "PENDING" && body["state"] != "RUNNING" {
                return body;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        panic!("job {job_id} did not finish");
    }
}

/// Defaults with the in-memory broker and a short dead-letter deadline.
pub fn test_config() -> Config {
    let mut config = Config::default();
    config.dead_letter.deadline_ms = 300;
    config.dead_letter.idle_timeout_ms = Some(100);
    config
}

pub fn multipart_body(model_id: Option<&str>, file: Option<(&str, &[u8])>) -> Vec<u8> {
    let mut body = Vec::new();
    if let Some(model_id) = model_id {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"model_id\"\r\n\r\n{model_id}\r\n"
            )
            .as_bytes(),
        );
    }
    if let Some((file_name, bytes)) = file {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"{file_name}\"\r\nContent-Type: application/octet-stream\r\n\r\n"
            )
            .as_bytes(),
        );
        body.extend_from_slice(bytes);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
    body
}
