//! Feature modules implementing the batch API
//!
//! Each feature is a vertical slice following the CQRS (Command Query
//! Responsibility Segregation) pattern: `commands/` for writes, `queries/`
//! for reads and `routes.rs` for the HTTP surface.
//!
//! # Features
//!
//! - **models**: Registry of named schemas that uploads reference
//! - **jobs**: File upload, job status, cancellation and dead-letter reads
//!
//! Commands and queries implement the mediator pattern using the `mediator`
//! crate, so handlers can be exercised without HTTP.

pub mod jobs;
pub mod models;

use axum::Router;
use batch_common::types::Model;
use std::sync::Arc;

use crate::config::Config;
use crate::ingest::{DeadLetterReader, JobRecord, JobRunner, LogBroker};
use crate::store::{MemoryStore, Store};

/// Model registry handle
pub type ModelStore = Arc<dyn Store<Model>>;

/// Job registry handle. Records are shared with their running tasks.
pub type JobStore = Arc<dyn Store<Arc<JobRecord>>>;

/// Shared state for all feature routes
#[derive(Clone)]
pub struct FeatureState {
    pub models: ModelStore,
    pub jobs: JobStore,
    /// Spawns the background task for accepted uploads
    pub runner: JobRunner,
    pub dead_letters: DeadLetterReader,
    pub max_upload_bytes: u64,
}

impl FeatureState {
    /// Fresh registries wired to `broker`
    pub fn new(broker: Arc<dyn LogBroker>, config: &Config) -> Self {
        Self {
            models: MemoryStore::shared(),
            jobs: MemoryStore::shared(),
            runner: JobRunner::new(broker.clone(), &config.ingest),
            dead_letters: DeadLetterReader::new(broker, &config.dead_letter),
            max_upload_bytes: config.ingest.max_upload_bytes,
        }
    }
}

/// Creates the feature router
///
/// - `/models` - Model registry
/// - `/jobs` - Uploads and job tracking
pub fn router(state: FeatureState) -> Router<()> {
    Router::new()
        .nest("/models", models::models_routes().with_state(state.models.clone()))
        .nest("/jobs", jobs::jobs_routes(state.max_upload_bytes).with_state(state))
}
