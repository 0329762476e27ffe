//! HTTP API client for the batch server
//!
//! Responses are returned raw: the CLI prints whatever the server sends,
//! error envelopes included.

use crate::api::endpoints;
use crate::error::{CliError, Result};
use reqwest::{multipart, Body, Client, RequestBuilder};
use std::path::Path;
use std::time::Duration;

// ============================================================================
// API Client Constants
// ============================================================================

/// Default timeout for API requests in seconds.
/// Can be overridden via BATCH_API_TIMEOUT_SECS environment variable.
/// Large uploads need the generous default.
pub const DEFAULT_API_TIMEOUT_SECS: u64 = 300;

/// Default server URL when neither `--api` nor `BATCH_API_URL` is given.
pub const DEFAULT_API_URL: &str = "http://localhost:8000";

/// Status and body of one API call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiResponse {
    pub status: u16,
    pub body: String,
}

impl ApiResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// API client for the batch server
pub struct ApiClient {
    client: Client,
    base_url: String,
}

impl ApiClient {
    /// Create a new API client
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        let timeout_secs = std::env::var("BATCH_API_TIMEOUT_SECS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(DEFAULT_API_TIMEOUT_SECS);

        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.into(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    // ------------------------------------------------------------------------
    // Models
    // ------------------------------------------------------------------------

    pub async fn list_models(&self) -> Result<ApiResponse> {
        self.send(self.client.get(endpoints::models_url(&self.base_url)))
            .await
    }

    pub async fn get_model(&self, model_id: &str) -> Result<ApiResponse> {
        self.send(self.client.get(endpoints::model_url(&self.base_url, model_id)))
            .await
    }

    pub async fn create_model(&self, name: &str, schema: serde_json::Value) -> Result<ApiResponse> {
        let body = serde_json::json!({ "name": name, "schema": schema });
        self.send(self.client.post(endpoints::models_url(&self.base_url)).json(&body))
            .await
    }

    /// Replace the schema, keeping the model's name.
    pub async fn update_model(&self, model_id: &str, schema: serde_json::Value) -> Result<ApiResponse> {
        let body = serde_json::json!({ "schema": schema });
        self.send(
            self.client
                .put(endpoints::model_url(&self.base_url, model_id))
                .json(&body),
        )
        .await
    }

    pub async fn delete_model(&self, model_id: &str) -> Result<ApiResponse> {
        self.send(self.client.delete(endpoints::model_url(&self.base_url, model_id)))
            .await
    }

    // ------------------------------------------------------------------------
    // Jobs
    // ------------------------------------------------------------------------

    pub async fn list_jobs(&self) -> Result<ApiResponse> {
        self.send(self.client.get(endpoints::jobs_url(&self.base_url)))
            .await
    }

    /// Upload `path` as a new job. The file is streamed, not buffered.
    pub async fn create_job(&self, model_id: &str, path: &Path) -> Result<ApiResponse> {
        let file = tokio::fs::File::open(path).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                CliError::file_not_found(path.display().to_string())
            } else {
                CliError::Io(e)
            }
        })?;
        let length = file.metadata().await?.len();
        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| "upload".to_string());

        tracing::debug!(model_id, file = %path.display(), bytes = length, "Uploading file");

        let part = multipart::Part::stream_with_length(Body::from(file), length)
            .file_name(file_name)
            .mime_str("application/octet-stream")?;
        let form = multipart::Form::new()
            .text("model_id", model_id.to_string())
            .part("file", part);

        self.send(
            self.client
                .post(endpoints::jobs_url(&self.base_url))
                .multipart(form),
        )
        .await
    }

    pub async fn get_job(&self, job_id: &str) -> Result<ApiResponse> {
        self.send(self.client.get(endpoints::job_url(&self.base_url, job_id)))
            .await
    }

    pub async fn cancel_job(&self, job_id: &str) -> Result<ApiResponse> {
        self.send(self.client.delete(endpoints::job_url(&self.base_url, job_id)))
            .await
    }

    pub async fn rejected_rows(&self, job_id: &str) -> Result<ApiResponse> {
        self.send(
            self.client
                .get(endpoints::rejected_rows_url(&self.base_url, job_id)),
        )
        .await
    }

    async fn send(&self, request: RequestBuilder) -> Result<ApiResponse> {
        let response = request.send().await?;
        let status = response.status().as_u16();
        let body = response.text().await?;

        tracing::debug!(status, bytes = body.len(), "API response received");
        Ok(ApiResponse { status, body })
    }
}
