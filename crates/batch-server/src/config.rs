//! Configuration management

use serde::{Deserialize, Serialize};
use std::time::Duration;

// ============================================================================
// Server Configuration Constants
// ============================================================================

/// Default server host binding.
pub const DEFAULT_SERVER_HOST: &str = "0.0.0.0";

/// Default server port.
pub const DEFAULT_SERVER_PORT: u16 = 8000;

/// Default shutdown timeout in seconds.
pub const DEFAULT_SHUTDOWN_TIMEOUT_SECS: u64 = 30;

/// Default CORS allowed origin.
pub const DEFAULT_CORS_ALLOWED_ORIGIN: &str = "*";

// ============================================================================
// Broker Configuration Constants
// ============================================================================

/// Default Kafka bootstrap address.
pub const DEFAULT_KAFKA_BROKERS: &str = "localhost:19092";

/// Default timeout for broker admin and metadata requests in seconds.
pub const DEFAULT_KAFKA_REQUEST_TIMEOUT_SECS: u64 = 5;

// ============================================================================
// Ingestion Configuration Constants
// ============================================================================

/// Upload size ceiling (1 GiB).
pub const DEFAULT_MAX_UPLOAD_BYTES: u64 = 1 << 30;

/// Per-publish acknowledgment timeout in seconds.
pub const DEFAULT_PUBLISH_TIMEOUT_SECS: u64 = 10;

/// Retention applied to every per-job topic (7 days).
pub const DEFAULT_TOPIC_RETENTION_MS: u64 = 604_800_000;

/// Wall-clock budget of one dead-letter query in milliseconds.
pub const DEFAULT_DLQ_DEADLINE_MS: u64 = 3_000;

/// Which broker adapter the server talks to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum BrokerKind {
    #[default]
    Kafka,
    /// In-process logs. Nothing survives a restart.
    Memory,
}

impl std::str::FromStr for BrokerKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "kafka" => Ok(BrokerKind::Kafka),
            "memory" | "in-memory" => Ok(BrokerKind::Memory),
            _ => Err(anyhow::anyhow!("Invalid BATCH_BROKER: {}. Must be 'kafka' or 'memory'", s)),
        }
    }
}

/// How a cancel request affects a running job
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum CancelMode {
    /// The row loop polls the job's cancellation token and stops.
    #[default]
    Cooperative,
    /// Cancel only flips the state; the row loop runs to completion and
    /// its final state write wins.
    Advisory,
}

impl std::str::FromStr for CancelMode {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "cooperative" => Ok(CancelMode::Cooperative),
            "advisory" => Ok(CancelMode::Advisory),
            _ => Err(anyhow::anyhow!(
                "Invalid BATCH_CANCEL_MODE: {}. Must be 'cooperative' or 'advisory'",
                s
            )),
        }
    }
}

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub broker: BrokerConfig,
    pub ingest: IngestConfig,
    pub dead_letter: DeadLetterConfig,
    pub cors: CorsConfig,
}

/// Server-specific configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub shutdown_timeout_secs: u64,
}

/// Broker connection configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BrokerConfig {
    pub kind: BrokerKind,
    pub brokers: Vec<String>,
    pub request_timeout_secs: u64,
}

impl BrokerConfig {
    /// Comma-joined bootstrap list as expected by librdkafka.
    pub fn bootstrap_servers(&self) -> String {
        self.brokers.join(",")
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

/// Upload and row-streaming configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IngestConfig {
    pub max_upload_bytes: u64,
    pub publish_timeout_secs: u64,
    pub topic_retention_ms: u64,
    pub cancel_mode: CancelMode,
}

impl IngestConfig {
    pub fn publish_timeout(&self) -> Duration {
        Duration::from_secs(self.publish_timeout_secs)
    }
}

/// Dead-letter query configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeadLetterConfig {
    /// Total wall-clock budget of one query.
    pub deadline_ms: u64,
    /// Stop early once no message arrived for this long. `None` waits for
    /// the full deadline.
    pub idle_timeout_ms: Option<u64>,
}

impl DeadLetterConfig {
    pub fn deadline(&self) -> Duration {
        Duration::from_millis(self.deadline_ms)
    }

    pub fn idle_timeout(&self) -> Option<Duration> {
        self.idle_timeout_ms.map(Duration::from_millis)
    }
}

/// CORS configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorsConfig {
    pub allowed_origins: Vec<String>,
    pub allow_credentials: bool,
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    std::env::var(key).ok().and_then(|s| s.parse().ok())
}

impl Config {
    /// Load configuration from environment and defaults
    pub fn load() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let broker_kind = match std::env::var("BATCH_BROKER") {
            Ok(value) => value.parse()?,
            Err(_) => BrokerKind::default(),
        };

        let cancel_mode = match std::env::var("BATCH_CANCEL_MODE") {
            Ok(value) => value.parse()?,
            Err(_) => CancelMode::default(),
        };

        let config = Config {
            server: ServerConfig {
                host: std::env::var("BATCH_HOST").unwrap_or_else(|_| DEFAULT_SERVER_HOST.to_string()),
                port: env_parse("BATCH_PORT")
                    .or_else(|| env_parse("PORT"))
                    .unwrap_or(DEFAULT_SERVER_PORT),
                shutdown_timeout_secs: env_parse("BATCH_SHUTDOWN_TIMEOUT")
                    .unwrap_or(DEFAULT_SHUTDOWN_TIMEOUT_SECS),
            },
            broker: BrokerConfig {
                kind: broker_kind,
                brokers: std::env::var("KAFKA_BROKERS")
                    .unwrap_or_else(|_| DEFAULT_KAFKA_BROKERS.to_string())
                    .split(',')
                    .map(|s| s.trim().to_string())
                    .filter(|s| !s.is_empty())
                    .collect(),
                request_timeout_secs: env_parse("KAFKA_REQUEST_TIMEOUT_SECS")
                    .unwrap_or(DEFAULT_KAFKA_REQUEST_TIMEOUT_SECS),
            },
            ingest: IngestConfig {
                max_upload_bytes: env_parse("BATCH_MAX_UPLOAD_BYTES")
                    .unwrap_or(DEFAULT_MAX_UPLOAD_BYTES),
                publish_timeout_secs: env_parse("BATCH_PUBLISH_TIMEOUT_SECS")
                    .unwrap_or(DEFAULT_PUBLISH_TIMEOUT_SECS),
                topic_retention_ms: env_parse("BATCH_TOPIC_RETENTION_MS")
                    .unwrap_or(DEFAULT_TOPIC_RETENTION_MS),
                cancel_mode,
            },
            dead_letter: DeadLetterConfig {
                deadline_ms: env_parse("BATCH_DLQ_DEADLINE_MS").unwrap_or(DEFAULT_DLQ_DEADLINE_MS),
                idle_timeout_ms: env_parse("BATCH_DLQ_IDLE_TIMEOUT_MS"),
            },
            cors: CorsConfig {
                allowed_origins: std::env::var("CORS_ALLOWED_ORIGINS")
                    .unwrap_or_else(|_| DEFAULT_CORS_ALLOWED_ORIGIN.to_string())
                    .split(',')
                    .map(|s| s.trim().to_string())
                    .collect(),
                allow_credentials: env_parse("CORS_ALLOW_CREDENTIALS").unwrap_or(false),
            },
        };

        config.validate()?;

        Ok(config)
    }

    /// Validate configuration
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.server.port == 0 {
            anyhow::bail!("Server port must be greater than 0");
        }

        if self.broker.kind == BrokerKind::Kafka && self.broker.brokers.is_empty() {
            anyhow::bail!("KAFKA_BROKERS must list at least one broker address");
        }

        if self.ingest.max_upload_bytes == 0 {
            anyhow::bail!("BATCH_MAX_UPLOAD_BYTES must be greater than 0");
        }

        if self.ingest.publish_timeout_secs == 0 {
            anyhow::bail!("BATCH_PUBLISH_TIMEOUT_SECS must be greater than 0");
        }

        if self.dead_letter.deadline_ms == 0 {
            anyhow::bail!("BATCH_DLQ_DEADLINE_MS must be greater than 0");
        }

        if self.cors.allow_credentials && self.cors.allowed_origins.iter().any(|o| o == "*") {
            anyhow::bail!("CORS credentials cannot be combined with a wildcard origin");
        }

        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                host: DEFAULT_SERVER_HOST.to_string(),
                port: DEFAULT_SERVER_PORT,
                shutdown_timeout_secs: DEFAULT_SHUTDOWN_TIMEOUT_SECS,
            },
            broker: BrokerConfig {
                kind: BrokerKind::Kafka,
                brokers: vec![DEFAULT_KAFKA_BROKERS.to_string()],
                request_timeout_secs: DEFAULT_KAFKA_REQUEST_TIMEOUT_SECS,
            },
            ingest: IngestConfig {
                max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
                publish_timeout_secs: DEFAULT_PUBLISH_TIMEOUT_SECS,
                topic_retention_ms: DEFAULT_TOPIC_RETENTION_MS,
                cancel_mode: CancelMode::Cooperative,
            },
            dead_letter: DeadLetterConfig {
                deadline_ms: DEFAULT_DLQ_DEADLINE_MS,
                idle_timeout_ms: None,
            },
            cors: CorsConfig {
                allowed_origins: vec![DEFAULT_CORS_ALLOWED_ORIGIN.to_string()],
                allow_credentials: false,
            },
        }
    }
}
