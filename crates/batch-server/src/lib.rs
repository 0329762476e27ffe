//! Batch ingestion server library
//!
//! HTTP service that accepts CSV or Parquet uploads, streams each row onto
//! a per-job log topic and routes rows that fail onto a companion
//! dead-letter topic.
//!
//! # Architecture
//!
//! The server follows a **CQRS (Command Query Responsibility Segregation)**
//! layout:
//!
//! - **Commands** (create model, upload file, cancel job) change registry
//!   state or start background work.
//! - **Queries** (job status, job list, rejected rows) read state and never
//!   block on a running job.
//!
//! Accepted uploads are handed to [`ingest::JobRunner`], which owns one
//! tokio task per job. The task provisions topics, streams rows and writes
//! the terminal state into the shared [`ingest::JobRecord`].
//!
//! ## Framework Stack
//!
//! - **Axum**: HTTP routing and multipart parsing
//! - **Tower**: Middleware and service abstractions
//! - **rdkafka**: Kafka adapter (default `kafka` feature)
//!
//! # Example
//!
//! ```no_run
//! use batch_server::{api, config::Config};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::load()?;
//!     api::serve(config).await?;
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod config;
pub mod error;
pub mod features;
pub mod ingest;
pub mod middleware;
pub mod store;

pub use error::{AppError, AppResult};
