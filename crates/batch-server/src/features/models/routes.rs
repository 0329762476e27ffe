//! Model API routes
//!
//! # Route Structure
//!
//! - `GET /models` - List models
//! - `POST /models` - Register a model (id optional)
//! - `GET /models/:id` - Get a model
//! - `PUT /models/:id` - Replace a model
//! - `DELETE /models/:id` - Delete a model

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};

use super::{
    commands::{CreateModelCommand, DeleteModelCommand, UpdateModelCommand},
    queries::{GetModelQuery, ListModelsQuery},
};
use crate::error::AppResult;
use crate::features::ModelStore;

/// Creates the models router
pub fn models_routes() -> Router<ModelStore> {
    Router::new()
        .route("/", get(list_models).post(create_model))
        .route("/:id", get(get_model).put(update_model).delete(delete_model))
}

// ============================================================================
// Command Handlers (Write Operations)
// ============================================================================

/// Register a model
///
/// - `201 Created` - Model stored
/// - `400 Bad Request` - Invalid JSON or validation error
#[tracing::instrument(skip(models, payload))]
async fn create_model(
    State(models): State<ModelStore>,
    payload: Result<Json<CreateModelCommand>, JsonRejection>,
) -> AppResult<Response> {
    let Json(command) = payload?;
    let model = super::commands::create::handle(models, command).await?;

    Ok((StatusCode::CREATED, Json(model)).into_response())
}

/// Replace a model
///
/// - `200 OK` - Model updated
/// - `400 Bad Request` - Invalid JSON
/// - `404 Not Found` - Unknown model
#[tracing::instrument(skip(models, payload), fields(model_id = %id))]
async fn update_model(
    State(models): State<ModelStore>,
    Path(id): Path<String>,
    payload: Result<Json<UpdateModelCommand>, JsonRejection>,
) -> AppResult<Response> {
    let Json(mut command) = payload?;
    command.id = id;

    let model = super::commands::update::handle(models, command).await?;

    Ok((StatusCode::OK, Json(model)).into_response())
}

/// Delete a model
///
/// - `204 No Content` - Model deleted
/// - `404 Not Found` - Unknown model
#[tracing::instrument(skip(models), fields(model_id = %id))]
async fn delete_model(
    State(models): State<ModelStore>,
    Path(id): Path<String>,
) -> AppResult<Response> {
    super::commands::delete::handle(models, DeleteModelCommand { id }).await?;

    Ok(StatusCode::NO_CONTENT.into_response())
}

// ============================================================================
// Query Handlers (Read Operations)
// ============================================================================

#[tracing::instrument(skip(models), fields(model_id = %id))]
async fn get_model(
    State(models): State<ModelStore>,
    Path(id): Path<String>,
) -> AppResult<Response> {
    let model = super::queries::get::handle(models, GetModelQuery { id }).await?;

    Ok((StatusCode::OK, Json(model)).into_response())
}

#[tracing::instrument(skip(models))]
async fn list_models(State(models): State<ModelStore>) -> AppResult<Response> {
    let items = super::queries::list::handle(models, ListModelsQuery::default()).await?;

    tracing::debug!(count = items.len(), "Models listed via API");
    Ok((StatusCode::OK, Json(items)).into_response())
}
