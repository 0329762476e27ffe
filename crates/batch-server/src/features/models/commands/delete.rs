//! Delete model command
//!
//! Jobs that reference the model are left untouched.

use mediator::Request;
use serde::{Deserialize, Serialize};

use crate::error::AppError;
use crate::features::ModelStore;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeleteModelCommand {
    pub id: String,
}

#[derive(Debug, thiserror::Error)]
pub enum DeleteModelError {
    #[error("Model '{0}' not found")]
    NotFound(String),
}

impl Request<Result<(), DeleteModelError>> for DeleteModelCommand {}

#[tracing::instrument(skip(models), fields(model_id = %command.id))]
pub async fn handle(models: ModelStore, command: DeleteModelCommand) -> Result<(), DeleteModelError> {
    models
        .delete(&command.id)
        .await
        .ok_or(DeleteModelError::NotFound(command.id))?;

    tracing::info!("Model deleted");
    Ok(())
}

impl From<DeleteModelError> for AppError {
    fn from(err: DeleteModelError) -> Self {
        match err {
            DeleteModelError::NotFound(_) => AppError::model_not_found(),
        }
    }
}
