//! Row-by-row publishing with dead-letter routing
//!
//! One publish is in flight at a time, so rows reach the primary topic in
//! input order. A row that cannot be parsed, encoded, or published goes to
//! the dead-letter topic instead and the stream moves on.

use batch_common::types::RejectedRow;
use chrono::Utc;
use tracing::{debug, warn};

use super::broker::LogBroker;
use super::job::JobRecord;
use super::source::{RecordSource, SourceItem};
use super::topics::JobTopics;
use crate::config::CancelMode;

/// How a stream ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamEnd {
    Exhausted,
    Cancelled,
    /// The source failed and no further rows could be read.
    SourceFailed,
}

pub struct RowStreamer<'a> {
    broker: &'a dyn LogBroker,
    record: &'a JobRecord,
    topics: &'a JobTopics,
    cancel_mode: CancelMode,
}

impl<'a> RowStreamer<'a> {
    pub fn new(
        broker: &'a dyn LogBroker,
        record: &'a JobRecord,
        topics: &'a JobTopics,
        cancel_mode: CancelMode,
    ) -> Self {
        Self {
            broker,
            record,
            topics,
            cancel_mode,
        }
    }

    fn cancelled(&self) -> bool {
        self.cancel_mode == CancelMode::Cooperative && self.record.cancellation().is_cancelled()
    }

    /// Drain `source`, updating the job's counters after every row.
    pub async fn stream(&self, source: &mut dyn RecordSource) -> StreamEnd {
        let mut row_number: u64 = 0;

        loop {
            if self.cancelled() {
                debug!(job_id = %self.record.job_id(), row_number, "Stopping on cancel");
                return StreamEnd::Cancelled;
            }

            row_number += 1;

            let item = match source.next_item().await {
                Ok(Some(item)) => item,
                Ok(None) => return StreamEnd::Exhausted,
                Err(e) => {
                    warn!(job_id = %self.record.job_id(), row_number, error = %e, "Upload read failed");
                    self.record.update(|s| s.totals.errors += 1).await;
                    self.reject(row_number, String::new(), e.to_string()).await;
                    return StreamEnd::SourceFailed;
                },
            };

            match item {
                SourceItem::Malformed { raw, error } => {
                    self.record.update(|s| s.totals.errors += 1).await;
                    self.reject(row_number, raw, error).await;
                },
                SourceItem::Record(fields) => {
                    self.record.update(|s| s.totals.rows += 1).await;
                    self.publish_row(row_number, fields).await;
                },
            }
        }
    }

    async fn publish_row(&self, row_number: u64, fields: Vec<String>) {
        let payload = match serde_json::to_vec(&fields) {
            Ok(payload) => payload,
            Err(e) => {
                self.record.update(|s| s.totals.errors += 1).await;
                self.reject(row_number, fields.join(","), format!("JSON marshal error: {e}"))
                    .await;
                return;
            },
        };

        match self
            .broker
            .publish(&self.topics.primary, self.record.job_id(), &payload)
            .await
        {
            Ok(()) => self.record.update(|s| s.totals.ok += 1).await,
            Err(e) => {
                self.record.update(|s| s.totals.errors += 1).await;
                self.reject(row_number, fields.join(","), format!("publish error: {e}")).await;
            },
        }
    }

    /// Send a rejected row to the dead-letter topic. Failures here are
    /// logged only; the row is already counted as an error.
    async fn reject(&self, row_number: u64, raw_data: String, error: String) {
        let rejected = RejectedRow {
            job_id: self.record.job_id().to_string(),
            row_number,
            raw_data,
            error,
            timestamp: Utc::now(),
        };

        let payload = match serde_json::to_vec(&rejected) {
            Ok(payload) => payload,
            Err(e) => {
                warn!(job_id = %rejected.job_id, row_number, error = %e, "Failed to encode rejected row");
                return;
            },
        };

        if let Err(e) = self
            .broker
            .publish(&self.topics.dead_letter, &rejected.job_id, &payload)
            .await
        {
            warn!(job_id = %rejected.job_id, row_number, error = %e, "Failed to write to dead-letter topic");
        }
    }
}
