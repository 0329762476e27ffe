//! Background job execution
//!
//! [`JobRunner::spawn`] detaches one task per accepted upload. The task
//! moves the job to RUNNING, provisions its topics, streams the file and
//! resolves the terminal state. The caller gets the job id back before any
//! of this happens.

use batch_common::types::JobState;
use std::sync::Arc;
use std::time::Instant;
use tokio::task::JoinHandle;
use tokio_util::compat::TokioAsyncReadCompatExt;
use tracing::{debug, error, info, info_span, warn, Instrument};

use super::broker::LogBroker;
use super::job::JobRecord;
use super::sniff::FileFormat;
use super::source::{ColumnarSource, DelimitedSource, RecordSource};
use super::streamer::{RowStreamer, StreamEnd};
use super::topics::{provision, JobTopics, ProvisionError};
use super::upload::SpooledUpload;
use crate::config::{CancelMode, IngestConfig};

/// Spawns and drives ingestion jobs
#[derive(Clone)]
pub struct JobRunner {
    broker: Arc<dyn LogBroker>,
    retention_ms: u64,
    cancel_mode: CancelMode,
}

impl JobRunner {
    pub fn new(broker: Arc<dyn LogBroker>, config: &IngestConfig) -> Self {
        Self {
            broker,
            retention_ms: config.topic_retention_ms,
            cancel_mode: config.cancel_mode,
        }
    }

    /// Run the job in a detached task. Resolves to the state the task
    /// left behind.
    pub fn spawn(
        &self,
        record: Arc<JobRecord>,
        upload: SpooledUpload,
        format: FileFormat,
    ) -> JoinHandle<JobState> {
        let runner = self.clone();
        let span = info_span!("job", job_id = %record.job_id(), format = %format);
        tokio::spawn(async move { runner.run(record, upload, format).await }.instrument(span))
    }

    pub async fn run(
        &self,
        record: Arc<JobRecord>,
        upload: SpooledUpload,
        format: FileFormat,
    ) -> JobState {
        if !record.start(self.cancel_mode).await {
            info!("Job cancelled before start");
            return record.snapshot().await.state;
        }

        let topics = JobTopics::for_job(record.job_id());
        if let Err(ProvisionError::Unreachable(reason)) =
            provision(self.broker.as_ref(), &topics, self.retention_ms).await
        {
            error!(broker = self.broker.name(), reason = %reason, "Failed to connect to broker");
            return record.fail(self.cancel_mode).await;
        }

        let mut source: Box<dyn RecordSource> = match format {
            FileFormat::Csv => Box::new(DelimitedSource::new(upload.file.compat())),
            FileFormat::Parquet => Box::new(ColumnarSource::new()),
        };

        debug!(source = %source.format(), topic = %topics.primary, "Streaming rows");
        let started = Instant::now();
        let end = RowStreamer::new(self.broker.as_ref(), &record, &topics, self.cancel_mode)
            .stream(source.as_mut())
            .await;
        let processing_ms = started.elapsed().as_millis() as u64;

        if end == StreamEnd::SourceFailed {
            warn!("Upload could not be read to the end");
        }

        let state = record.finish(processing_ms, self.cancel_mode).await;
        let totals = record.snapshot().await.totals;
        info!(
            state = %state,
            rows = totals.rows,
            ok = totals.ok,
            errors = totals.errors,
            processing_ms,
            "Job completed"
        );
        state
    }
}
