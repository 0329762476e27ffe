//! List jobs query

use batch_common::types::JobStatus;
use mediator::Request;
use serde::{Deserialize, Serialize};

use crate::error::AppError;
use crate::features::JobStore;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ListJobsQuery {}

#[derive(Debug, thiserror::Error)]
pub enum ListJobsError {}

impl Request<Result<Vec<JobStatus>, ListJobsError>> for ListJobsQuery {}

/// Snapshot of every job, ordered by id.
pub async fn handle(jobs: JobStore, _query: ListJobsQuery) -> Result<Vec<JobStatus>, ListJobsError> {
    let records = jobs.list().await;
    let mut statuses = Vec::with_capacity(records.len());
    for record in records {
        statuses.push(record.snapshot().await);
    }
    Ok(statuses)
}

impl From<ListJobsError> for AppError {
    fn from(err: ListJobsError) -> Self {
        match err {}
    }
}
