//! Job commands

pub mod cancel;
pub mod create;

pub use cancel::{CancelJobCommand, CancelJobError};
pub use create::{CreateJobCommand, CreateJobError};
