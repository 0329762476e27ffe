//! Shared per-job status cell

use batch_common::types::{JobState, JobStatus, JobTotals};
use tokio::sync::RwLock;
use tokio_util::sync::CancellationToken;

use crate::config::CancelMode;

/// Terminal state for a finished stream.
pub fn resolve_terminal(totals: &JobTotals) -> JobState {
    match (totals.errors, totals.ok) {
        (0, _) => JobState::Success,
        (_, 0) => JobState::Failed,
        _ => JobState::PartialSuccess,
    }
}

/// One job's status plus its cancellation signal
///
/// The background task is the only writer of counters and timings.
/// Request handlers may write `state` through [`JobRecord::cancel`] at any
/// time.
#[derive(Debug)]
pub struct JobRecord {
    job_id: String,
    status: RwLock<JobStatus>,
    cancel: CancellationToken,
}

impl JobRecord {
    pub fn new(job_id: impl Into<String>, model_id: impl Into<String>) -> Self {
        let job_id = job_id.into();
        Self {
            status: RwLock::new(JobStatus::new(job_id.clone(), model_id)),
            job_id,
            cancel: CancellationToken::new(),
        }
    }

    pub fn job_id(&self) -> &str {
        &self.job_id
    }

    pub async fn snapshot(&self) -> JobStatus {
        self.status.read().await.clone()
    }

    pub fn cancellation(&self) -> &CancellationToken {
        &self.cancel
    }

    /// Apply `f` under the write lock and refresh `updated_at`.
    pub async fn update<F>(&self, f: F)
    where
        F: FnOnce(&mut JobStatus),
    {
        let mut status = self.status.write().await;
        f(&mut status);
        status.touch();
    }

    /// PENDING -> RUNNING. Returns false when the job was cancelled first
    /// and `mode` honors that.
    pub async fn start(&self, mode: CancelMode) -> bool {
        let mut status = self.status.write().await;
        if mode == CancelMode::Cooperative && status.cancelled {
            return false;
        }
        status.state = JobState::Running;
        status.started_at = Some(chrono::Utc::now());
        status.touch();
        true
    }

    /// Record the streaming time and resolve the terminal state.
    ///
    /// In advisory mode the resolved state overwrites whatever is there,
    /// including CANCELLED. In cooperative mode a cancelled job stays
    /// CANCELLED.
    pub async fn finish(&self, processing_ms: u64, mode: CancelMode) -> JobState {
        let mut status = self.status.write().await;
        status.timings.processing_ms = processing_ms;
        if !(mode == CancelMode::Cooperative && status.cancelled) {
            status.state = resolve_terminal(&status.totals);
        }
        status.touch();
        status.state
    }

    /// Mark the job FAILED without processing rows.
    pub async fn fail(&self, mode: CancelMode) -> JobState {
        let mut status = self.status.write().await;
        if !(mode == CancelMode::Cooperative && status.cancelled) {
            status.state = JobState::Failed;
        }
        status.touch();
        status.state
    }

    /// Mark the job CANCELLED and signal the background task. Returns the
    /// record as of this instant.
    pub async fn cancel(&self) -> JobStatus {
        let snapshot = {
            let mut status = self.status.write().await;
            status.state = JobState::Cancelled;
            status.cancelled = true;
            status.touch();
            status.clone()
        };
        self.cancel.cancel();
        snapshot
    }
}
