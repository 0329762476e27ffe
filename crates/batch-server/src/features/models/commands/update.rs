//! Update model command

use batch_common::types::Model;
use mediator::Request;
use serde::{Deserialize, Serialize};

use crate::error::AppError;
use crate::features::ModelStore;

/// Replace a model's name and schema. The id comes from the path; any id
/// in the body is ignored. Omitted fields keep their current value.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateModelCommand {
    #[serde(skip)]
    pub id: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema: Option<serde_json::Value>,
}

#[derive(Debug, thiserror::Error)]
pub enum UpdateModelError {
    #[error("Model '{0}' not found")]
    NotFound(String),

    #[error("Model name cannot be empty")]
    NameEmpty,
}

impl Request<Result<Model, UpdateModelError>> for UpdateModelCommand {}

#[tracing::instrument(skip(models, command), fields(model_id = %command.id))]
pub async fn handle(models: ModelStore, command: UpdateModelCommand) -> Result<Model, UpdateModelError> {
    if command.name.as_deref().is_some_and(|n| n.trim().is_empty()) {
        return Err(UpdateModelError::NameEmpty);
    }

    let UpdateModelCommand { id, name, schema } = command;
    let updated = models
        .update(
            &id,
            Box::new(move |model: &mut Model| {
                if let Some(name) = name {
                    model.name = name;
                }
                if let Some(schema) = schema {
                    model.schema = schema;
                }
            }),
        )
        .await
        .ok_or_else(|| UpdateModelError::NotFound(id.clone()))?;

    tracing::info!("Model updated");
    Ok(updated)
}

impl From<UpdateModelError> for AppError {
    fn from(err: UpdateModelError) -> Self {
        match err {
            UpdateModelError::NotFound(_) => AppError::model_not_found(),
            UpdateModelError::NameEmpty => AppError::invalid("MISSING_NAME", err.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use serde_json::json;
    use std::sync::Arc;

    async fn seeded() -> ModelStore {
        let models: ModelStore = Arc::new(MemoryStore::new());
        models
            .put(
                "m1".into(),
                Model {
                    id: "m1".into(),
                    name: "orders".into(),
                    schema: json!({"v": 1}),
                },
            )
            .await;
        models
    }

    #[tokio::test]
    async fn test_replaces_schema_and_keeps_name() {
        let models = seeded().await;
        let updated = handle(
            models.clone(),
            UpdateModelCommand {
                id: "m1".into(),
                name: None,
                schema: Some(json!({"v": 2})),
            },
        )
        .await
        .unwrap();

        assert_eq!(updated.name, "orders");
        assert_eq!(models.get("m1").await.unwrap().schema, json!({"v": 2}));
    }

    #[tokio::test]
    async fn test_unknown_model() {
        let models = seeded().await;
        let result = handle(
            models,
            UpdateModelCommand {
                id: "nope".into(),
                name: Some("x".into()),
                schema: None,
            },
        )
        .await;
        assert!(matches!(result, Err(UpdateModelError::NotFound(id)) if id == "nope"));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_update_racing_delete_never_restores_model() {
        for _ in 0..50 {
            let models = seeded().await;

            let updater = tokio::spawn(handle(
                models.clone(),
                UpdateModelCommand {
                    id: "m1".into(),
                    name: Some("renamed".into()),
                    schema: None,
                },
            ));
            let deleted = models.delete("m1").await;
            let result = updater.await.unwrap();

            assert!(deleted.is_some());
            assert!(matches!(result, Ok(_) | Err(UpdateModelError::NotFound(_))));
            assert!(models.get("m1").await.is_none());
        }
    }

    #[test]
    fn test_body_id_is_ignored() {
        let command: UpdateModelCommand =
            serde_json::from_value(json!({"id": "other", "name": "n"})).unwrap();
        assert_eq!(command.id, "");
        assert_eq!(command.name.as_deref(), Some("n"));
    }
}
