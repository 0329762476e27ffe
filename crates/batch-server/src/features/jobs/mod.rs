//! Jobs feature module
//!
//! Upload, status, cancel and dead-letter queries. The work itself happens
//! in [`crate::ingest`]; this module only validates requests and reads the
//! shared job records.

pub mod commands;
pub mod queries;
pub mod routes;

pub use routes::jobs_routes;
