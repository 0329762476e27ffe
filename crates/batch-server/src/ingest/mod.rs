//! Ingestion pipeline
//!
//! An accepted upload flows through these pieces in order:
//!
//! 1. [`upload`] spools the request body to a temporary file
//! 2. [`sniff`] classifies it as CSV or Parquet
//! 3. [`runner`] spawns the background task, which
//!    - provisions `batch_<job_id>` and `batch_<job_id>_dlq` ([`topics`])
//!    - streams records from a [`source`] through the [`streamer`]
//!    - resolves the terminal state on the shared [`job`] record
//!
//! [`dead_letter`] reads rejected rows back on demand. Brokers plug in
//! through the [`broker`] traits: [`memory`] always, `kafka` behind the
//! `kafka` cargo feature.

pub mod broker;
pub mod dead_letter;
pub mod job;
#[cfg(feature = "kafka")]
pub mod kafka;
pub mod memory;
pub mod runner;
pub mod sniff;
pub mod source;
pub mod streamer;
pub mod topics;
pub mod upload;

pub use broker::{BrokerError, LogBroker, LogCursor, LogMessage, TopicOutcome, TopicSpec};
pub use dead_letter::DeadLetterReader;
pub use job::JobRecord;
pub use memory::MemoryBroker;
pub use runner::JobRunner;
pub use sniff::FileFormat;
pub use upload::{SpooledUpload, UploadSpool};

use std::sync::Arc;

use crate::config::{BrokerKind, Config};

/// Build the broker adapter selected by configuration.
pub fn connect_broker(config: &Config) -> anyhow::Result<Arc<dyn LogBroker>> {
    match config.broker.kind {
        BrokerKind::Memory => {
            tracing::warn!("Using in-memory broker; published rows are lost on restart");
            Ok(Arc::new(MemoryBroker::new()))
        },
        #[cfg(feature = "kafka")]
        BrokerKind::Kafka => {
            let broker =
                kafka::KafkaBroker::new(&config.broker, config.ingest.publish_timeout())?;
            tracing::info!(brokers = %config.broker.bootstrap_servers(), "Kafka broker configured");
            Ok(Arc::new(broker))
        },
        #[cfg(not(feature = "kafka"))]
        BrokerKind::Kafka => {
            anyhow::bail!("BATCH_BROKER=kafka requires the 'kafka' feature; rebuild with it or set BATCH_BROKER=memory")
        },
    }
}
