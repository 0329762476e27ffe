//! Server-specific error types

use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

use crate::api::response::ErrorResponse;

/// Result type alias for handler code
pub type AppResult<T> = std::result::Result<T, AppError>;

/// Application error types
///
/// Each variant carries the stable error code placed in the response
/// envelope along with a human-readable message.
#[derive(Error, Debug)]
pub enum AppError {
    /// Malformed body or a missing required field. Nothing was created.
    #[error("{message}")]
    InvalidRequest { code: &'static str, message: String },

    /// The upload exceeded the configured ceiling.
    #[error("{0}")]
    ResourceTooLarge(String),

    /// The request names an entity that does not exist (e.g. an unknown
    /// model on upload).
    #[error("{message}")]
    UnknownReference { code: &'static str, message: String },

    #[error("{message}")]
    NotFound { code: &'static str, message: String },

    #[error("Internal server error: {0}")]
    Internal(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl AppError {
    pub fn invalid(code: &'static str, message: impl Into<String>) -> Self {
        AppError::InvalidRequest {
            code,
            message: message.into(),
        }
    }

    pub fn job_not_found() -> Self {
        AppError::NotFound {
            code: "JOB_NOT_FOUND",
            message: "job not found".to_string(),
        }
    }

    pub fn model_not_found() -> Self {
        AppError::NotFound {
            code: "MODEL_NOT_FOUND",
            message: "model not found".to_string(),
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::InvalidRequest { .. } | AppError::UnknownReference { .. } => {
                StatusCode::BAD_REQUEST
            },
            AppError::ResourceTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            AppError::NotFound { .. } => StatusCode::NOT_FOUND,
            AppError::Internal(_) | AppError::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::invalid("INVALID_JSON", rejection.body_text())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let error = match self {
            AppError::InvalidRequest { code, message }
            | AppError::UnknownReference { code, message }
            | AppError::NotFound { code, message } => ErrorResponse::new(code, message),
            AppError::ResourceTooLarge(message) => ErrorResponse::new("FILE_TOO_LARGE", message),
            AppError::Internal(ref message) => {
                tracing::error!(error = %message, "Internal error");
                ErrorResponse::new("INTERNAL_ERROR", "An internal error occurred")
            },
            AppError::Io(ref e) => {
                tracing::error!(error = ?e, "IO error");
                ErrorResponse::new("INTERNAL_ERROR", "An internal error occurred")
            },
        };

        (status, Json(error)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::BodyExt;

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_not_found_envelope() {
        let response = AppError::job_not_found().into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let body = body_json(response).await;
        assert_eq!(body["success"], false);
        assert_eq!(body["error"]["code"], "JOB_NOT_FOUND");
        assert_eq!(body["error"]["message"], "job not found");
    }

    #[tokio::test]
    async fn test_internal_error_hides_cause() {
        let response = AppError::Internal("disk on fire".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let body = body_json(response).await;
        assert_eq!(body["error"]["code"], "INTERNAL_ERROR");
        assert!(!body["error"]["message"].as_str().unwrap().contains("disk"));
    }

    #[test]
    fn test_status_mapping() {
        assert_eq!(AppError::invalid("MISSING_FILE", "x").status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            AppError::ResourceTooLarge("x".into()).status(),
            StatusCode::PAYLOAD_TOO_LARGE
        );
        assert_eq!(
            AppError::UnknownReference {
                code: "MODEL_NOT_FOUND",
                message: "model not found".into()
            }
            .status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(AppError::model_not_found().status(), StatusCode::NOT_FOUND);
    }
}
