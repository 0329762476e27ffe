//! Kafka adapter built on `rdkafka`

use async_trait::async_trait;
use rdkafka::{
    admin::{AdminClient, AdminOptions, NewTopic, TopicReplication},
    client::DefaultClientContext,
    config::ClientConfig,
    consumer::{CommitMode, Consumer, StreamConsumer},
    error::KafkaError,
    message::Message,
    producer::{FutureProducer, FutureRecord, Producer},
    types::RDKafkaErrorCode,
    util::Timeout,
    Offset, TopicPartitionList,
};
use std::time::Duration;
use tracing::{debug, instrument, warn};

use super::broker::{BrokerError, LogBroker, LogCursor, LogMessage, TopicOutcome, TopicSpec};
use crate::config::BrokerConfig;

/// Broker adapter for a Kafka-compatible cluster
pub struct KafkaBroker {
    bootstrap_servers: String,
    admin: AdminClient<DefaultClientContext>,
    producer: FutureProducer,
    request_timeout: Duration,
    publish_timeout: Duration,
}

impl KafkaBroker {
    pub fn new(config: &BrokerConfig, publish_timeout: Duration) -> Result<Self, BrokerError> {
        let bootstrap_servers = config.bootstrap_servers();
        let request_timeout = config.request_timeout();

        let admin = ClientConfig::new()
            .set("bootstrap.servers", &bootstrap_servers)
            .set("socket.timeout.ms", request_timeout.as_millis().to_string())
            .create()
            .map_err(|e| BrokerError::Client(e.to_string()))?;

        let producer = ClientConfig::new()
            .set("bootstrap.servers", &bootstrap_servers)
            .set("acks", "1")
            .set("message.timeout.ms", publish_timeout.as_millis().to_string())
            .create()
            .map_err(|e| BrokerError::Client(e.to_string()))?;

        Ok(Self {
            bootstrap_servers,
            admin,
            producer,
            request_timeout,
            publish_timeout,
        })
    }

    /// Metadata round trip used as a reachability check.
    async fn probe(&self) -> Result<(), BrokerError> {
        let producer = self.producer.clone();
        let timeout = self.request_timeout;

        tokio::task::spawn_blocking(move || {
            producer
                .client()
                .fetch_metadata(None, Timeout::After(timeout))
                .map(|_| ())
        })
        .await
        .map_err(|e| BrokerError::Unreachable(e.to_string()))?
        .map_err(|e| BrokerError::Unreachable(e.to_string()))
    }
}

#[async_trait]
impl LogBroker for KafkaBroker {
    fn name(&self) -> &'static str {
        "kafka"
    }

    #[instrument(skip(self, specs), fields(brokers = %self.bootstrap_servers))]
    async fn create_topics(
        &self,
        specs: &[TopicSpec],
    ) -> Result<Vec<(String, TopicOutcome)>, BrokerError> {
        self.probe().await?;

        let new_topics: Vec<NewTopic<'_>> = specs
            .iter()
            .map(|spec| {
                spec.configs.iter().fold(
                    NewTopic::new(
                        &spec.name,
                        spec.partitions,
                        TopicReplication::Fixed(spec.replication),
                    ),
                    |topic, (key, value)| topic.set(key, value),
                )
            })
            .collect();

        let options = AdminOptions::new().operation_timeout(Some(self.request_timeout));
        let results = self
            .admin
            .create_topics(new_topics.iter(), &options)
            .await
            .map_err(|e: KafkaError| BrokerError::Admin(e.to_string()))?;

        let outcomes = results
            .into_iter()
            .map(|result| match result {
                Ok(name) => (name, TopicOutcome::Created),
                Err((name, RDKafkaErrorCode::TopicAlreadyExists)) => {
                    (name, TopicOutcome::AlreadyExists)
                },
                Err((name, code)) => (name, TopicOutcome::Rejected(code.to_string())),
            })
            .collect();

        Ok(outcomes)
    }

    async fn publish(&self, topic: &str, key: &str, payload: &[u8]) -> Result<(), BrokerError> {
        let record = FutureRecord::to(topic).key(key).payload(payload);

        match self
            .producer
            .send(record, Timeout::After(self.publish_timeout))
            .await
        {
            Ok(_) => Ok(()),
            Err((e, _)) => Err(BrokerError::Publish {
                topic: topic.to_string(),
                reason: e.to_string(),
            }),
        }
    }

    async fn open_cursor(
        &self,
        topic: &str,
        group: &str,
    ) -> Result<Box<dyn LogCursor>, BrokerError> {
        let consumer: StreamConsumer = ClientConfig::new()
            .set("bootstrap.servers", &self.bootstrap_servers)
            .set("group.id", group)
            .set("enable.auto.commit", "false")
            .set("auto.offset.reset", "earliest")
            .set("session.timeout.ms", "6000")
            .create()
            .map_err(|e| BrokerError::Client(e.to_string()))?;

        consumer
            .subscribe(&[topic])
            .map_err(|e| BrokerError::Consume(e.to_string()))?;

        debug!(topic = %topic, group = %group, "Opened Kafka cursor");

        Ok(Box::new(KafkaCursor { consumer }))
    }
}

struct KafkaCursor {
    consumer: StreamConsumer,
}

#[async_trait]
impl LogCursor for KafkaCursor {
    async fn next(&mut self, wait: Duration) -> Result<Option<LogMessage>, BrokerError> {
        match tokio::time::timeout(wait, self.consumer.recv()).await {
            Err(_) => Ok(None),
            Ok(Err(e)) => Err(BrokerError::Consume(e.to_string())),
            Ok(Ok(message)) => Ok(Some(LogMessage {
                topic: message.topic().to_string(),
                partition: message.partition(),
                offset: message.offset(),
                key: message.key().map(|k| k.to_vec()),
                payload: message.payload().map(|p| p.to_vec()).unwrap_or_default(),
            })),
        }
    }

    async fn commit(&mut self, message: &LogMessage) -> Result<(), BrokerError> {
        let mut positions = TopicPartitionList::new();
        positions
            .add_partition_offset(&message.topic, message.partition, Offset::Offset(message.offset + 1))
            .map_err(|e| BrokerError::Commit(e.to_string()))?;

        if let Err(e) = self.consumer.commit(&positions, CommitMode::Async) {
            warn!(topic = %message.topic, offset = message.offset, error = %e, "Commit failed");
            return Err(BrokerError::Commit(e.to_string()));
        }
        Ok(())
    }
}
