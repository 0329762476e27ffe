//! In-process log broker
//!
//! Topics are plain vectors, consumer groups keep a committed offset per
//! topic, and waiting cursors are woken through a [`Notify`]. Used with
//! `BATCH_BROKER=memory` and throughout the test suite.

use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Mutex, Notify};

use super::broker::{BrokerError, LogBroker, LogCursor, LogMessage, TopicOutcome, TopicSpec};

#[derive(Default)]
struct Topic {
    spec: Option<TopicSpec>,
    messages: Vec<LogMessage>,
}

#[derive(Default)]
struct State {
    topics: HashMap<String, Topic>,
    /// (group, topic) -> next offset to read
    committed: HashMap<(String, String), i64>,
    unreachable: bool,
    failing_topics: HashSet<String>,
    publish_delay: Option<Duration>,
    create_requests: usize,
}

/// Broker that keeps every log in memory
#[derive(Clone, Default)]
pub struct MemoryBroker {
    state: Arc<Mutex<State>>,
    appended: Arc<Notify>,
}

impl MemoryBroker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Simulate a broker that cannot be contacted.
    pub async fn set_unreachable(&self, unreachable: bool) {
        self.state.lock().await.unreachable = unreachable;
    }

    /// Make every publish to `topic` fail.
    pub async fn fail_publishes_to(&self, topic: impl Into<String>) {
        self.state.lock().await.failing_topics.insert(topic.into());
    }

    /// Hold every publish for `delay` before appending.
    pub async fn set_publish_delay(&self, delay: Duration) {
        self.state.lock().await.publish_delay = Some(delay);
    }

    /// Names of all provisioned topics, sorted.
    pub async fn topic_names(&self) -> Vec<String> {
        let state = self.state.lock().await;
        let mut names: Vec<String> = state
            .topics
            .iter()
            .filter(|(_, t)| t.spec.is_some())
            .map(|(name, _)| name.clone())
            .collect();
        names.sort();
        names
    }

    /// Spec a topic was created with.
    pub async fn topic_spec(&self, topic: &str) -> Option<TopicSpec> {
        self.state
            .lock()
            .await
            .topics
            .get(topic)
            .and_then(|t| t.spec.clone())
    }

    /// Everything published to `topic` so far.
    pub async fn messages(&self, topic: &str) -> Vec<LogMessage> {
        self.state
            .lock()
            .await
            .topics
            .get(topic)
            .map(|t| t.messages.clone())
            .unwrap_or_default()
    }

    /// Consumer groups holding committed offsets.
    pub async fn group_count(&self) -> usize {
        let state = self.state.lock().await;
        state
            .committed
            .keys()
            .map(|(group, _)| group.as_str())
            .collect::<HashSet<_>>()
            .len()
    }

    /// Number of `create_topics` calls that reached the broker.
    pub async fn create_requests(&self) -> usize {
        self.state.lock().await.create_requests
    }
}

#[async_trait]
impl LogBroker for MemoryBroker {
    fn name(&self) -> &'static str {
        "memory"
    }

    async fn create_topics(
        &self,
        specs: &[TopicSpec],
    ) -> Result<Vec<(String, TopicOutcome)>, BrokerError> {
        let mut state = self.state.lock().await;
        if state.unreachable {
            return Err(BrokerError::Unreachable("memory broker is offline".to_string()));
        }
        state.create_requests += 1;

        let outcomes = specs
            .iter()
            .map(|spec| {
                let outcome = if spec.partitions < 1 {
                    TopicOutcome::Rejected("partition count must be at least 1".to_string())
                } else {
                    let topic = state.topics.entry(spec.name.clone()).or_default();
                    if topic.spec.is_some() {
                        TopicOutcome::AlreadyExists
                    } else {
                        topic.spec = Some(spec.clone());
                        TopicOutcome::Created
                    }
                };
                (spec.name.clone(), outcome)
            })
            .collect();

        Ok(outcomes)
    }

    async fn publish(&self, topic: &str, key: &str, payload: &[u8]) -> Result<(), BrokerError> {
        let delay = self.state.lock().await.publish_delay;
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        {
            let mut state = self.state.lock().await;
            if state.unreachable {
                return Err(BrokerError::Unreachable("memory broker is offline".to_string()));
            }
            if state.failing_topics.contains(topic) {
                return Err(BrokerError::Publish {
                    topic: topic.to_string(),
                    reason: "injected failure".to_string(),
                });
            }

            let log = state.topics.entry(topic.to_string()).or_default();
            let offset = log.messages.len() as i64;
            log.messages.push(LogMessage {
                topic: topic.to_string(),
                partition: 0,
                offset,
                key: Some(key.as_bytes().to_vec()),
                payload: payload.to_vec(),
            });
        }

        self.appended.notify_waiters();
        Ok(())
    }

    async fn open_cursor(
        &self,
        topic: &str,
        group: &str,
    ) -> Result<Box<dyn LogCursor>, BrokerError> {
        let state = self.state.lock().await;
        if state.unreachable {
            return Err(BrokerError::Unreachable("memory broker is offline".to_string()));
        }
        let position = state
            .committed
            .get(&(group.to_string(), topic.to_string()))
            .copied()
            .unwrap_or(0);

        Ok(Box::new(MemoryCursor {
            broker: self.clone(),
            topic: topic.to_string(),
            group: group.to_string(),
            position,
        }))
    }

    async fn release_group(&self, group: &str) {
        self.state
            .lock()
            .await
            .committed
            .retain(|(owner, _), _| owner != group);
    }
}

struct MemoryCursor {
    broker: MemoryBroker,
    topic: String,
    group: String,
    position: i64,
}

#[async_trait]
impl LogCursor for MemoryCursor {
    async fn next(&mut self, wait: Duration) -> Result<Option<LogMessage>, BrokerError> {
        let deadline = tokio::time::Instant::now() + wait;

        loop {
            // Register before checking so an append between the check and
            // the wait is not missed.
            let appended = self.broker.appended.notified();

            {
                let state = self.broker.state.lock().await;
                if state.unreachable {
                    return Err(BrokerError::Consume("memory broker is offline".to_string()));
                }
                let next = state
                    .topics
                    .get(&self.topic)
                    .and_then(|t| t.messages.get(self.position as usize))
                    .cloned();
                if let Some(message) = next {
                    self.position += 1;
                    return Ok(Some(message));
                }
            }

            if tokio::time::timeout_at(deadline, appended).await.is_err() {
                return Ok(None);
            }
        }
    }

    async fn commit(&mut self, message: &LogMessage) -> Result<(), BrokerError> {
        let mut state = self.broker.state.lock().await;
        state
            .committed
            .insert((self.group.clone(), self.topic.clone()), message.offset + 1);
        Ok(())
    }
}
