//! On-demand dead-letter reads
//!
//! Each query opens a fresh consumer group at the earliest offset and
//! collects whatever arrives before the deadline. The result is the current
//! best-effort contents of the topic, not a guaranteed-complete drain.

use batch_common::ids::short_id;
use batch_common::types::RejectedRow;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, instrument, warn};

use super::broker::LogBroker;
use super::topics::dead_letter_topic;
use crate::config::DeadLetterConfig;

/// Group id prefix for dead-letter cursors.
pub const READER_GROUP_PREFIX: &str = "rejected-rows-reader-";

#[derive(Clone)]
pub struct DeadLetterReader {
    broker: Arc<dyn LogBroker>,
    deadline: Duration,
    idle_timeout: Option<Duration>,
}

impl DeadLetterReader {
    pub fn new(broker: Arc<dyn LogBroker>, config: &DeadLetterConfig) -> Self {
        Self {
            broker,
            deadline: config.deadline(),
            idle_timeout: config.idle_timeout(),
        }
    }

    /// Read the rejected rows of `job_id`.
    ///
    /// Never fails: broker errors end the read and whatever was collected
    /// so far is returned.
    #[instrument(skip(self), fields(deadline_ms = self.deadline.as_millis() as u64))]
    pub async fn read(&self, job_id: &str) -> Vec<RejectedRow> {
        let deadline = Instant::now() + self.deadline;
        let topic = dead_letter_topic(job_id);
        let group = format!("{READER_GROUP_PREFIX}{job_id}-{}", short_id());
        let mut rows = Vec::new();

        let mut cursor = match self.broker.open_cursor(&topic, &group).await {
            Ok(cursor) => cursor,
            Err(e) => {
                warn!(topic = %topic, error = %e, "Failed to open dead-letter cursor");
                return rows;
            },
        };

        loop {
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                break;
            }
            let wait = self.idle_timeout.map_or(remaining, |idle| idle.min(remaining));

            let message = match cursor.next(wait).await {
                Ok(Some(message)) => message,
                Ok(None) => break,
                Err(e) => {
                    debug!(topic = %topic, error = %e, "Dead-letter fetch ended");
                    break;
                },
            };

            match serde_json::from_slice::<RejectedRow>(&message.payload) {
                Ok(row) => rows.push(row),
                Err(e) => {
                    warn!(topic = %topic, offset = message.offset, error = %e, "Failed to decode rejected row");
                },
            }

            if let Err(e) = cursor.commit(&message).await {
                warn!(topic = %topic, offset = message.offset, error = %e, "Failed to commit dead-letter offset");
            }
        }

        drop(cursor);
        self.broker.release_group(&group).await;

        debug!(topic = %topic, count = rows.len(), "Dead-letter read complete");
        rows
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ingest::memory::MemoryBroker;
    use chrono::Utc;

    fn reader(broker: &MemoryBroker, deadline_ms: u64, idle_ms: Option<u64>) -> DeadLetterReader {
        DeadLetterReader::new(
            Arc::new(broker.clone()),
            &DeadLetterConfig {
                deadline_ms,
                idle_timeout_ms: idle_ms,
            },
        )
    }

    async fn reject(broker: &MemoryBroker, job_id: &str, row_number: u64) {
        let row = RejectedRow {
            job_id: job_id.to_string(),
            row_number,
            raw_data: "x".to_string(),
            error: "bad".to_string(),
            timestamp: Utc::now(),
        };
        broker
            .publish(&dead_letter_topic(job_id), job_id, &serde_json::to_vec(&row).unwrap())
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_empty_topic_returns_empty_list() {
        let broker = MemoryBroker::new();
        let rows = reader(&broker, 50, None).read("j1").await;
        assert!(rows.is_empty());
    }

    #[tokio::test]
    async fn test_reads_in_order() {
        let broker = MemoryBroker::new();
        reject(&broker, "j1", 2).await;
        reject(&broker, "j1", 4).await;

        let rows = reader(&broker, 100, None).read("j1").await;
        assert_eq!(rows.iter().map(|r| r.row_number).collect::<Vec<_>>(), vec![2, 4]);
    }

    #[tokio::test]
    async fn test_undecodable_message_is_skipped() {
        let broker = MemoryBroker::new();
        reject(&broker, "j1", 1).await;
        broker.publish("batch_j1_dlq", "j1", b"not json").await.unwrap();
        reject(&broker, "j1", 3).await;

        let rows = reader(&broker, 100, None).read("j1").await;
        assert_eq!(rows.iter().map(|r| r.row_number).collect::<Vec<_>>(), vec![1, 3]);
    }

    #[tokio::test]
    async fn test_repeated_queries_see_everything() {
        let broker = MemoryBroker::new();
        reject(&broker, "j1", 1).await;

        let reader = reader(&broker, 50, None);
        assert_eq!(reader.read("j1").await.len(), 1);
        assert_eq!(reader.read("j1").await.len(), 1);
    }

    #[tokio::test]
    async fn test_reader_groups_are_released() {
        let broker = MemoryBroker::new();
        reject(&broker, "j1", 1).await;
        reject(&broker, "j1", 2).await;

        let reader = reader(&broker, 50, Some(10));
        for _ in 0..3 {
            assert_eq!(reader.read("j1").await.len(), 2);
        }
        assert_eq!(broker.group_count().await, 0);
    }

    #[tokio::test]
    async fn test_idle_timeout_returns_early() {
        let broker = MemoryBroker::new();
        reject(&broker, "j1", 1).await;

        let started = std::time::Instant::now();
        let rows = reader(&broker, 5_000, Some(20)).read("j1").await;

        assert_eq!(rows.len(), 1);
        assert!(started.elapsed() < Duration::from_secs(2));
    }

    #[tokio::test]
    async fn test_unreachable_broker_returns_empty() {
        let broker = MemoryBroker::new();
        broker.set_unreachable(true).await;
        assert!(reader(&broker, 50, None).read("j1").await.is_empty());
    }
}
