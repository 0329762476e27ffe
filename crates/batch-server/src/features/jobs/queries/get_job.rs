//! Get job query
//!
//! Query to get a single job's status record.

use batch_common::types::JobStatus;
use mediator::Request;
use serde::{Deserialize, Serialize};

use crate::error::AppError;
use crate::features::JobStore;

/// Query to get a job by ID
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GetJobQuery {
    pub job_id: String,
}

/// Error type for get job query
#[derive(Debug, thiserror::Error)]
pub enum GetJobError {
    #[error("Job not found")]
    NotFound,
}

impl Request<Result<JobStatus, GetJobError>> for GetJobQuery {}

pub async fn handle(jobs: JobStore, query: GetJobQuery) -> Result<JobStatus, GetJobError> {
    let record = jobs.get(&query.job_id).await.ok_or(GetJobError::NotFound)?;
    Ok(record.snapshot().await)
}

impl From<GetJobError> for AppError {
    fn from(err: GetJobError) -> Self {
        match err {
            GetJobError::NotFound => AppError::job_not_found(),
        }
    }
}
