//! Cancel job command
//!
//! Sets the job to CANCELLED right away and signals its background task.
//! The returned record is the state at the moment of the request.

use batch_common::types::JobStatus;
use mediator::Request;
use serde::{Deserialize, Serialize};

use crate::error::AppError;
use crate::features::JobStore;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CancelJobCommand {
    pub job_id: String,
}

#[derive(Debug, thiserror::Error)]
pub enum CancelJobError {
    #[error("Job '{0}' not found")]
    NotFound(String),
}

impl Request<Result<JobStatus, CancelJobError>> for CancelJobCommand {}

#[tracing::instrument(skip(jobs), fields(job_id = %command.job_id))]
pub async fn handle(jobs: JobStore, command: CancelJobCommand) -> Result<JobStatus, CancelJobError> {
    let record = jobs
        .get(&command.job_id)
        .await
        .ok_or(CancelJobError::NotFound(command.job_id))?;

    let status = record.cancel().await;
    tracing::info!("Job cancelled");
    Ok(status)
}

impl From<CancelJobError> for AppError {
    fn from(err: CancelJobError) -> Self {
        match err {
            CancelJobError::NotFound(_) => AppError::job_not_found(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ingest::JobRecord;
    use crate::store::MemoryStore;
    use batch_common::types::JobState;
    use std::sync::Arc;

    #[tokio::test]
    async fn test_cancel_overwrites_terminal_state() {
        let jobs: JobStore = Arc::new(MemoryStore::new());
        let record = Arc::new(JobRecord::new("j1", "m1"));
        record.update(|s| s.state = JobState::Success).await;
        jobs.put("j1".into(), record.clone()).await;

        let status = handle(jobs, CancelJobCommand { job_id: "j1".into() }).await.unwrap();

        assert_eq!(status.state, JobState::Cancelled);
        assert!(record.cancellation().is_cancelled());
    }

    #[tokio::test]
    async fn test_cancel_unknown_job() {
        let jobs: JobStore = Arc::new(MemoryStore::new());
        let result = handle(jobs, CancelJobCommand { job_id: "nope".into() }).await;
        assert!(matches!(result, Err(CancelJobError::NotFound(_))));
    }
}
