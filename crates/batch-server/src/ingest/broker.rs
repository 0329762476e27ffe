//! Log broker abstraction
//!
//! The pipeline only needs four things from a broker: create topics,
//! publish one message, and open a cursor that can fetch and commit.
//! [`LogBroker`] captures exactly that so the Kafka adapter and the
//! in-process broker are interchangeable.

use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;

/// Settings for one topic to be created
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TopicSpec {
    pub name: String,
    pub partitions: i32,
    pub replication: i32,
    /// Topic-level configuration entries, e.g. `("retention.ms", "604800000")`.
    pub configs: Vec<(String, String)>,
}

impl TopicSpec {
    pub fn config(&self, key: &str) -> Option<&str> {
        self.configs
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }
}

/// Per-topic result of a create request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TopicOutcome {
    Created,
    AlreadyExists,
    /// The broker answered but refused the topic.
    Rejected(String),
}

impl TopicOutcome {
    /// Whether the topic can be used afterwards.
    pub fn is_usable(&self) -> bool {
        matches!(self, TopicOutcome::Created | TopicOutcome::AlreadyExists)
    }
}

/// One message fetched through a [`LogCursor`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogMessage {
    pub topic: String,
    pub partition: i32,
    pub offset: i64,
    pub key: Option<Vec<u8>>,
    pub payload: Vec<u8>,
}

/// Broker adapter errors
#[derive(Debug, Error)]
pub enum BrokerError {
    /// No broker could be contacted at all.
    #[error("broker unreachable: {0}")]
    Unreachable(String),

    #[error("admin request failed: {0}")]
    Admin(String),

    #[error("publish to '{topic}' failed: {reason}")]
    Publish { topic: String, reason: String },

    #[error("consume failed: {0}")]
    Consume(String),

    #[error("commit failed: {0}")]
    Commit(String),

    #[error("broker client configuration error: {0}")]
    Client(String),
}

/// Append-only log broker
#[async_trait]
pub trait LogBroker: Send + Sync {
    /// Short adapter name for logs.
    fn name(&self) -> &'static str;

    /// Create every topic in `specs`, returning one outcome per spec in the
    /// same order. Fails with [`BrokerError::Unreachable`] when the broker
    /// cannot be contacted.
    async fn create_topics(
        &self,
        specs: &[TopicSpec],
    ) -> Result<Vec<(String, TopicOutcome)>, BrokerError>;

    /// Publish one message and wait for the broker acknowledgment.
    async fn publish(&self, topic: &str, key: &str, payload: &[u8]) -> Result<(), BrokerError>;

    /// Open a read cursor on `topic` for consumer group `group`, starting
    /// at the earliest offset when the group has no committed position.
    async fn open_cursor(&self, topic: &str, group: &str)
        -> Result<Box<dyn LogCursor>, BrokerError>;

    /// Forget the committed offsets of a group that will not be reopened.
    ///
    /// Kafka expires idle groups itself, so the default does nothing.
    async fn release_group(&self, _group: &str) {}
}

/// Read handle over one topic
#[async_trait]
pub trait LogCursor: Send {
    /// Fetch the next message, waiting at most `wait`. `Ok(None)` means
    /// nothing arrived in time.
    async fn next(&mut self, wait: Duration) -> Result<Option<LogMessage>, BrokerError>;

    /// Mark `message` as consumed for this cursor's group.
    async fn commit(&mut self, message: &LogMessage) -> Result<(), BrokerError>;
}
