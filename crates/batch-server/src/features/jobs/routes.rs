//! Job routes
//!
//! - `POST /jobs` - Upload a file (multipart: `model_id`, `file`)
//! - `GET /jobs` - List jobs
//! - `GET /jobs/:id` - Job status
//! - `DELETE /jobs/:id` - Cancel a job
//! - `GET /jobs/:id/rejected` - Rows routed to the dead-letter topic

use axum::{
    extract::{
        multipart::{Field, MultipartError, MultipartRejection},
        DefaultBodyLimit, Multipart, Path, State,
    },
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};

use super::commands::{CancelJobCommand, CreateJobCommand};
use super::queries::{GetJobQuery, ListJobsQuery, ListRejectedRowsQuery};
use crate::error::{AppError, AppResult};
use crate::features::FeatureState;
use crate::ingest::upload::SpoolError;
use crate::ingest::{SpooledUpload, UploadSpool};

/// Room left for the `model_id` part and multipart framing on top of the
/// file size ceiling.
const MULTIPART_OVERHEAD_BYTES: u64 = 1 << 20;

/// Create job routes
pub fn jobs_routes(max_upload_bytes: u64) -> Router<FeatureState> {
    let body_limit = usize::try_from(max_upload_bytes.saturating_add(MULTIPART_OVERHEAD_BYTES))
        .unwrap_or(usize::MAX);

    Router::new()
        .route(
            "/",
            get(list_jobs)
                .post(create_job)
                .layer(DefaultBodyLimit::max(body_limit)),
        )
        .route("/:id", get(get_job).delete(cancel_job))
        .route("/:id/rejected", get(list_rejected_rows))
}

/// Upload a file and start a job
///
/// - `202 Accepted` - `{"job_id": "..."}`
/// - `400 Bad Request` - Missing field, unknown model, unsupported file
/// - `413 Payload Too Large` - File exceeds the upload ceiling
#[tracing::instrument(skip(state, multipart))]
async fn create_job(
    State(state): State<FeatureState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> AppResult<Response> {
    let mut multipart =
        multipart.map_err(|e| AppError::invalid("INVALID_MULTIPART", e.body_text()))?;
    let mut command = CreateJobCommand::default();

    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        let name = field.name().map(str::to_string);
        match name.as_deref() {
            Some("model_id") => {
                command.model_id = Some(field.text().await.map_err(multipart_error)?);
            },
            Some("file") => {
                command.upload = Some(spool_field(field, state.max_upload_bytes).await?);
            },
            other => tracing::debug!(field = ?other, "Ignoring multipart field"),
        }
    }

    let response = super::commands::create::handle(state, command).await?;

    Ok((StatusCode::ACCEPTED, Json(response)).into_response())
}

async fn spool_field(mut field: Field<'_>, limit: u64) -> AppResult<SpooledUpload> {
    let file_name = field.file_name().map(str::to_string);
    let mut spool = UploadSpool::create(file_name, limit)?;

    while let Some(chunk) = field.chunk().await.map_err(multipart_error)? {
        spool.write(&chunk).await?;
    }

    Ok(spool.finish().await?)
}

fn multipart_error(err: MultipartError) -> AppError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::ResourceTooLarge(err.body_text())
    } else {
        AppError::invalid("INVALID_MULTIPART", err.body_text())
    }
}

impl From<SpoolError> for AppError {
    fn from(err: SpoolError) -> Self {
        match err {
            SpoolError::TooLarge { .. } => AppError::ResourceTooLarge(err.to_string()),
            SpoolError::Io(e) => AppError::Io(e),
        }
    }
}

/// Cancel a job
///
/// - `202 Accepted` - The record as of the cancel
/// - `404 Not Found` - Unknown job
#[tracing::instrument(skip(state), fields(job_id = %job_id))]
async fn cancel_job(
    State(state): State<FeatureState>,
    Path(job_id): Path<String>,
) -> AppResult<Response> {
    let status = super::commands::cancel::handle(state.jobs, CancelJobCommand { job_id }).await?;

    Ok((StatusCode::ACCEPTED, Json(status)).into_response())
}

/// List all jobs
async fn list_jobs(State(state): State<FeatureState>) -> AppResult<Response> {
    let jobs = super::queries::list_jobs::handle(state.jobs, ListJobsQuery::default()).await?;

    Ok((StatusCode::OK, Json(jobs)).into_response())
}

/// Get a specific job by ID
async fn get_job(
    State(state): State<FeatureState>,
    Path(job_id): Path<String>,
) -> AppResult<Response> {
    let status = super::queries::get_job::handle(state.jobs, GetJobQuery { job_id }).await?;

    Ok((StatusCode::OK, Json(status)).into_response())
}

/// Rows rejected so far
///
/// Waits up to the configured dead-letter deadline. An empty list is a
/// normal answer.
#[tracing::instrument(skip(state), fields(job_id = %job_id))]
async fn list_rejected_rows(
    State(state): State<FeatureState>,
    Path(job_id): Path<String>,
) -> AppResult<Response> {
    let rows = super::queries::list_rejected::handle(
        state.jobs,
        state.dead_letters,
        ListRejectedRowsQuery { job_id },
    )
    .await?;

    tracing::debug!(count = rows.len(), "Rejected rows listed via API");
    Ok((StatusCode::OK, Json(rows)).into_response())
}
