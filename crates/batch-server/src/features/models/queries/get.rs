//! Get model query

use batch_common::types::Model;
use mediator::Request;
use serde::{Deserialize, Serialize};

use crate::error::AppError;
use crate::features::ModelStore;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GetModelQuery {
    pub id: String,
}

#[derive(Debug, thiserror::Error)]
pub enum GetModelError {
    #[error("Model '{0}' not found")]
    NotFound(String),
}

impl Request<Result<Model, GetModelError>> for GetModelQuery {}

pub async fn handle(models: ModelStore, query: GetModelQuery) -> Result<Model, GetModelError> {
    models
        .get(&query.id)
        .await
        .ok_or(GetModelError::NotFound(query.id))
}

impl From<GetModelError> for AppError {
    fn from(err: GetModelError) -> Self {
        match err {
            GetModelError::NotFound(_) => AppError::model_not_found(),
        }
    }
}
