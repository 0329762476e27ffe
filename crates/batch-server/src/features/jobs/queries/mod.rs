//! Job queries

pub mod get_job;
pub mod list_jobs;
pub mod list_rejected;

pub use get_job::{GetJobError, GetJobQuery};
pub use list_jobs::{ListJobsError, ListJobsQuery};
pub use list_rejected::{ListRejectedRowsError, ListRejectedRowsQuery};
