//! Rejected rows query
//!
//! Reads the job's dead-letter topic. The job must be known; the broker is
//! not contacted for unknown ids.

use batch_common::types::RejectedRow;
use mediator::Request;
use serde::{Deserialize, Serialize};

use crate::error::AppError;
use crate::features::JobStore;
use crate::ingest::DeadLetterReader;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListRejectedRowsQuery {
    pub job_id: String,
}

#[derive(Debug, thiserror::Error)]
pub enum ListRejectedRowsError {
    #[error("Job '{0}' not found")]
    NotFound(String),
}

impl Request<Result<Vec<RejectedRow>, ListRejectedRowsError>> for ListRejectedRowsQuery {}

#[tracing::instrument(skip(jobs, reader), fields(job_id = %query.job_id))]
pub async fn handle(
    jobs: JobStore,
    reader: DeadLetterReader,
    query: ListRejectedRowsQuery,
) -> Result<Vec<RejectedRow>, ListRejectedRowsError> {
    if !jobs.contains(&query.job_id).await {
        return Err(ListRejectedRowsError::NotFound(query.job_id));
    }

    Ok(reader.read(&query.job_id).await)
}

impl From<ListRejectedRowsError> for AppError {
    fn from(err: ListRejectedRowsError) -> Self {
        match err {
            ListRejectedRowsError::NotFound(_) => AppError::job_not_found(),
        }
    }
}
