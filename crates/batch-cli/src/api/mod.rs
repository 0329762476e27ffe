//! API client module
//!
//! HTTP client for the batch ingestion server.

pub mod client;
pub mod endpoints;

pub use client::{ApiClient, ApiResponse};
