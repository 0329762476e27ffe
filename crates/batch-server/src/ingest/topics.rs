//! Per-job topic naming and provisioning
//!
//! Every job writes to `batch_<job_id>` and routes failures to
//! `batch_<job_id>_dlq`. Existing tooling depends on these names.

use thiserror::Error;
use tracing::{info, warn};

use super::broker::{BrokerError, LogBroker, TopicOutcome, TopicSpec};

pub const TOPIC_PREFIX: &str = "batch_";
pub const DEAD_LETTER_SUFFIX: &str = "_dlq";

const PARTITIONS: i32 = 1;
const REPLICATION: i32 = 1;

/// Names of the two logs owned by one job
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobTopics {
    pub primary: String,
    pub dead_letter: String,
}

impl JobTopics {
    pub fn for_job(job_id: &str) -> Self {
        Self {
            primary: primary_topic(job_id),
            dead_letter: dead_letter_topic(job_id),
        }
    }
}

pub fn primary_topic(job_id: &str) -> String {
    format!("{TOPIC_PREFIX}{job_id}")
}

pub fn dead_letter_topic(job_id: &str) -> String {
    format!("{TOPIC_PREFIX}{job_id}{DEAD_LETTER_SUFFIX}")
}

/// Create specs for both job topics.
pub fn job_topic_specs(topics: &JobTopics, retention_ms: u64) -> [TopicSpec; 2] {
    let spec = |name: &str| TopicSpec {
        name: name.to_string(),
        partitions: PARTITIONS,
        replication: REPLICATION,
        configs: vec![
            ("cleanup.policy".to_string(), "delete".to_string()),
            ("retention.ms".to_string(), retention_ms.to_string()),
        ],
    };
    [spec(&topics.primary), spec(&topics.dead_letter)]
}

#[derive(Debug, Error)]
pub enum ProvisionError {
    #[error("cannot reach broker: {0}")]
    Unreachable(String),
}

/// Ensure both job topics exist.
///
/// "Already exists" counts as success. Only an unreachable broker is an
/// error; any other failure is logged and streaming proceeds, relying on
/// the publish path to surface per-row problems.
pub async fn provision(
    broker: &dyn LogBroker,
    topics: &JobTopics,
    retention_ms: u64,
) -> Result<(), ProvisionError> {
    let specs = job_topic_specs(topics, retention_ms);

    match broker.create_topics(&specs).await {
        Ok(outcomes) => {
            for (name, outcome) in outcomes {
                match outcome {
                    TopicOutcome::Created => info!(topic = %name, "Topic created"),
                    TopicOutcome::AlreadyExists => info!(topic = %name, "Topic already exists"),
                    TopicOutcome::Rejected(reason) => {
                        warn!(topic = %name, reason = %reason, "Topic creation rejected")
                    },
                }
            }
            Ok(())
        },
        Err(BrokerError::Unreachable(reason)) => Err(ProvisionError::Unreachable(reason)),
        Err(e) => {
            warn!(error = %e, "Failed to create topics (may already exist)");
            Ok(())
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ingest::memory::MemoryBroker;

    #[test]
    fn test_topic_names() {
        let topics = JobTopics::for_job("a1b2c3d4");
        assert_eq!(topics.primary, "batch_a1b2c3d4");
        assert_eq!(topics.dead_letter, "batch_a1b2c3d4_dlq");
    }

    #[test]
    fn test_topic_specs() {
        let specs = job_topic_specs(&JobTopics::for_job("j1"), 604_800_000);
        for spec in &specs {
            assert_eq!(spec.partitions, 1);
            assert_eq!(spec.config("cleanup.policy"), Some("delete"));
            assert_eq!(spec.config("retention.ms"), Some("604800000"));
        }
        assert_eq!(specs[1].name, "batch_j1_dlq");
    }

    #[tokio::test]
    async fn test_provision_is_idempotent() {
        let broker = MemoryBroker::new();
        let topics = JobTopics::for_job("j1");

        provision(&broker, &topics, 1000).await.unwrap();
        provision(&broker, &topics, 1000).await.unwrap();

        assert_eq!(broker.topic_names().await, vec!["batch_j1", "batch_j1_dlq"]);
        assert_eq!(broker.create_requests().await, 2);
    }

    #[tokio::test]
    async fn test_provision_unreachable() {
        let broker = MemoryBroker::new();
        broker.set_unreachable(true).await;

        let result = provision(&broker, &JobTopics::for_job("j1"), 1000).await;
        assert!(matches!(result, Err(ProvisionError::Unreachable(_))));
    }
}
