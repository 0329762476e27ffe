//! Batch Common Library
#![deny(clippy::unwrap_used, clippy::expect_used)]
//!
//! Shared types, utilities, and error handling for the batch ingestion
//! service and its command-line client.
//!
//! # Overview
//!
//! - **Types**: the wire records exchanged over HTTP (jobs, models,
//!   rejected rows)
//! - **Error Handling**: common error and result types
//! - **Logging**: tracing subscriber setup shared by every binary
//!
//! # Example
//!
//! ```no_run
//! use batch_common::types::{JobState, JobStatus};
//!
//! let status = JobStatus::new("a1b2c3d4", "orders");
//! assert_eq!(status.state, JobState::Pending);
//! ```

pub mod error;
pub mod ids;
pub mod logging;
pub mod types;

// Re-export commonly used types
pub use error::{BatchError, Result};
