//! List models query

use batch_common::types::Model;
use mediator::Request;
use serde::{Deserialize, Serialize};

use crate::error::AppError;
use crate::features::ModelStore;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ListModelsQuery {}

#[derive(Debug, thiserror::Error)]
pub enum ListModelsError {}

impl Request<Result<Vec<Model>, ListModelsError>> for ListModelsQuery {}

/// All models ordered by id.
pub async fn handle(models: ModelStore, _query: ListModelsQuery) -> Result<Vec<Model>, ListModelsError> {
    Ok(models.list().await)
}

impl From<ListModelsError> for AppError {
    fn from(err: ListModelsError) -> Self {
        match err {}
    }
}
