//! Create model command
//!
//! Registers a model, generating an id when the request leaves it empty.
//! Creating with an existing id replaces that model.

use batch_common::{ids::short_id, types::Model};
use mediator::Request;
use serde::{Deserialize, Serialize};

use crate::error::AppError;
use crate::features::ModelStore;

/// Command to register a model
///
/// # Examples
///
/// ```rust,ignore
/// use batch_server::features::models::commands::CreateModelCommand;
///
/// let command = CreateModelCommand {
///     id: String::new(),
///     name: "orders".to_string(),
///     schema: serde_json::json!({"fields": ["id", "amount"]}),
/// };
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateModelCommand {
    /// Optional caller-chosen id
    #[serde(default)]
    pub id: String,

    #[serde(default)]
    pub name: String,

    /// Opaque schema document
    #[serde(default)]
    pub schema: serde_json::Value,
}

#[derive(Debug, thiserror::Error)]
pub enum CreateModelError {
    #[error("Model id must be at most 64 characters of letters, digits, '-' or '_'")]
    InvalidId,

    #[error("Model name is required")]
    NameRequired,
}

impl Request<Result<Model, CreateModelError>> for CreateModelCommand {}

/// Ids travel in URL paths.
fn valid_model_id(id: &str) -> bool {
    !id.is_empty()
        && id.len() <= 64
        && id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

impl CreateModelCommand {
    pub fn validate(&self) -> Result<(), CreateModelError> {
        if !self.id.is_empty() && !valid_model_id(&self.id) {
            return Err(CreateModelError::InvalidId);
        }
        if self.name.trim().is_empty() {
            return Err(CreateModelError::NameRequired);
        }
        Ok(())
    }
}

#[tracing::instrument(skip(models, command), fields(name = %command.name))]
pub async fn handle(models: ModelStore, command: CreateModelCommand) -> Result<Model, CreateModelError> {
    command.validate()?;

    let id = if command.id.is_empty() {
        short_id()
    } else {
        command.id
    };

    let model = Model {
        id: id.clone(),
        name: command.name,
        schema: command.schema,
    };

    if models.put(id.clone(), model.clone()).await.is_some() {
        tracing::info!(model_id = %id, "Model replaced");
    } else {
        tracing::info!(model_id = %id, "Model created");
    }

    Ok(model)
}

impl From<CreateModelError> for AppError {
    fn from(err: CreateModelError) -> Self {
        let code = match err {
            CreateModelError::InvalidId => "INVALID_MODEL_ID",
            CreateModelError::NameRequired => "MISSING_NAME",
        };
        AppError::invalid(code, err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use serde_json::json;
    use std::sync::Arc;

    fn command(id: &str, name: &str) -> CreateModelCommand {
        CreateModelCommand {
            id: id.to_string(),
            name: name.to_string(),
            schema: json!({"fields": []}),
        }
    }

    #[tokio::test]
    async fn test_generates_id_when_missing() {
        let models: ModelStore = Arc::new(MemoryStore::new());
        let model = handle(models.clone(), command("", "orders")).await.unwrap();

        assert_eq!(model.id.len(), 8);
        assert_eq!(models.get(&model.id).await.unwrap().name, "orders");
    }

    #[tokio::test]
    async fn test_existing_id_is_replaced() {
        let models: ModelStore = Arc::new(MemoryStore::new());
        handle(models.clone(), command("m1", "first")).await.unwrap();
        handle(models.clone(), command("m1", "second")).await.unwrap();

        assert_eq!(models.list().await.len(), 1);
        assert_eq!(models.get("m1").await.unwrap().name, "second");
    }

    #[test]
    fn test_validation() {
        assert!(command("", "orders").validate().is_ok());
        assert!(matches!(command("a/b", "x").validate(), Err(CreateModelError::InvalidId)));
        assert!(matches!(command("m1", "  ").validate(), Err(CreateModelError::NameRequired)));
    }
}
