//! Wire types shared by the server and the CLI
//!
//! Field names here are part of the public HTTP contract and must not be
//! renamed.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::BatchError;

// ============================================================================
// Job Types
// ============================================================================

/// Lifecycle state of an ingestion job.
///
/// `Pending` and `Running` are transient. `Success`, `PartialSuccess` and
/// `Failed` are written by the background task when it finishes.
/// `Cancelled` is written by an external request and may land on top of
/// any other state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum JobState {
    #[default]
    Pending,
    Running,
    Success,
    PartialSuccess,
    Failed,
    Cancelled,
}

impl JobState {
    pub fn as_str(&self) -> &'static str {
        match self {
            JobState::Pending => "PENDING",
            JobState::Running => "RUNNING",
            JobState::Success => "SUCCESS",
            JobState::PartialSuccess => "PARTIAL_SUCCESS",
            JobState::Failed => "FAILED",
            JobState::Cancelled => "CANCELLED",
        }
    }

    /// Whether the job may still change on its own.
    pub fn is_transient(&self) -> bool {
        matches!(self, JobState::Pending | JobState::Running)
    }

    /// Whether the state is final for display purposes.
    pub fn is_terminal(&self) -> bool {
        !self.is_transient()
    }
}

impl std::fmt::Display for JobState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for JobState {
    type Err = BatchError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "PENDING" => Ok(JobState::Pending),
            "RUNNING" => Ok(JobState::Running),
            "SUCCESS" => Ok(JobState::Success),
            "PARTIAL_SUCCESS" => Ok(JobState::PartialSuccess),
            "FAILED" => Ok(JobState::Failed),
            "CANCELLED" => Ok(JobState::Cancelled),
            other => Err(BatchError::InvalidState(other.to_string())),
        }
    }
}

/// Per-job row counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct JobTotals {
    /// Input records that parsed successfully.
    pub rows: u64,
    /// Records confirmed published to the primary log.
    pub ok: u64,
    /// Records routed to the dead-letter log.
    pub errors: u64,
}

/// Per-job timings in milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct JobTimings {
    /// Always zero; kept for wire compatibility.
    pub waiting_ms: u64,
    /// Wall time of the row-streaming phase.
    pub processing_ms: u64,
}

/// Status record for one ingestion job, as returned by the status query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobStatus {
    pub job_id: String,
    pub model_id: String,
    pub state: JobState,
    pub totals: JobTotals,
    pub timings: JobTimings,
    pub updated_at: DateTime<Utc>,
    /// Set when the background task picks the job up.
    pub started_at: Option<DateTime<Utc>>,
    /// Advisory cancel flag. Not part of the wire format.
    #[serde(skip)]
    pub cancelled: bool,
}

impl JobStatus {
    /// Create a fresh `PENDING` record.
    pub fn new(job_id: impl Into<String>, model_id: impl Into<String>) -> Self {
        Self {
            job_id: job_id.into(),
            model_id: model_id.into(),
            state: JobState::Pending,
            totals: JobTotals::default(),
            timings: JobTimings::default(),
            updated_at: Utc::now(),
            started_at: None,
            cancelled: false,
        }
    }

    /// Refresh `updated_at`. Called after every mutation.
    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

/// Response body of a successful upload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateJobResponse {
    pub job_id: String,
}

// ============================================================================
// Dead-Letter Types
// ============================================================================

/// One record that could not be parsed, encoded, or published.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RejectedRow {
    pub job_id: String,
    /// 1-based position in the uploaded stream, unparsable rows included.
    pub row_number: u64,
    /// Best-effort reconstruction of the offending record.
    pub raw_data: String,
    pub error: String,
    pub timestamp: DateTime<Utc>,
}

// ============================================================================
// Model Types
// ============================================================================

/// A registered model. The schema document is opaque to the service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Model {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub schema: serde_json::Value,
}
