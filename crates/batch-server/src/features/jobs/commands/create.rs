//! Create job command
//!
//! Accepts a spooled upload, checks the model reference, classifies the
//! file and hands it to the background runner. The response carries only
//! the new job id; progress is observed through the status query.
//!
//! Validation order: `model_id` present, `file` present, model exists,
//! file classifiable. A failure at any step leaves no job behind and
//! provisions nothing.

use batch_common::{ids::short_id, types::CreateJobResponse};
use mediator::Request;
use std::sync::Arc;

use crate::error::AppError;
use crate::features::FeatureState;
use crate::ingest::{
    sniff::{sniff, SniffError},
    JobRecord, SpooledUpload,
};

#[derive(Debug, Default)]
pub struct CreateJobCommand {
    pub model_id: Option<String>,
    pub upload: Option<SpooledUpload>,
}

#[derive(Debug, thiserror::Error)]
pub enum CreateJobError {
    #[error("model_id is required")]
    MissingModelId,

    #[error("file is required")]
    MissingFile,

    #[error("model '{0}' not found")]
    ModelNotFound(String),

    #[error(transparent)]
    Sniff(#[from] SniffError),
}

impl Request<Result<CreateJobResponse, CreateJobError>> for CreateJobCommand {}

#[tracing::instrument(
    skip(state, command),
    fields(model_id = ?command.model_id, size = ?command.upload.as_ref().map(|u| u.size))
)]
pub async fn handle(
    state: FeatureState,
    command: CreateJobCommand,
) -> Result<CreateJobResponse, CreateJobError> {
    let model_id = command
        .model_id
        .filter(|id| !id.is_empty())
        .ok_or(CreateJobError::MissingModelId)?;
    let mut upload = command.upload.ok_or(CreateJobError::MissingFile)?;

    if !state.models.contains(&model_id).await {
        return Err(CreateJobError::ModelNotFound(model_id));
    }

    let file_name = upload.file_name.clone();
    let format = sniff(&mut upload.file, file_name.as_deref()).await?;

    let record = loop {
        let candidate = Arc::new(JobRecord::new(short_id(), model_id.clone()));
        if state
            .jobs
            .insert_new(candidate.job_id().to_string(), candidate.clone())
            .await
        {
            break candidate;
        }
    };
    let job_id = record.job_id().to_string();

    // Detached: the handle is dropped and the task runs on its own.
    state.runner.spawn(record, upload, format);

    tracing::info!(job_id = %job_id, format = %format, "Job accepted");
    Ok(CreateJobResponse { job_id })
}

impl From<CreateJobError> for AppError {
    fn from(err: CreateJobError) -> Self {
        match err {
            CreateJobError::MissingModelId => AppError::invalid("MISSING_MODEL_ID", err.to_string()),
            CreateJobError::MissingFile => AppError::invalid("MISSING_FILE", err.to_string()),
            CreateJobError::ModelNotFound(_) => AppError::UnknownReference {
                code: "MODEL_NOT_FOUND",
                message: "model not found".to_string(),
            },
            CreateJobError::Sniff(SniffError::TooShort) => {
                AppError::invalid("READ_ERROR", err.to_string())
            },
            CreateJobError::Sniff(SniffError::Unsupported) => {
                AppError::invalid("UNSUPPORTED_FILE_TYPE", err.to_string())
            },
            CreateJobError::Sniff(SniffError::Io(e)) => AppError::Io(e),
        }
    }
}
