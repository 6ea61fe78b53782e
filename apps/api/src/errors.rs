use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
///
/// Per-document pipeline failures never reach this type; they degrade to
/// empty values inside their component. Only request validation and the
/// three batch-fatal analysis conditions become `AppError`s.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("No candidate documents could be retrieved for this application set")]
    NoRetrievableDocuments,

    #[error("None of the retrieved documents contained extractable text")]
    NoExtractableContent,

    #[error("No valid candidate data could be extracted from the documents")]
    NoValidData,

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone()),
            AppError::NoRetrievableDocuments => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "NO_RETRIEVABLE_DOCUMENTS",
                self.to_string(),
            ),
            AppError::NoExtractableContent => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "NO_EXTRACTABLE_CONTENT",
                self.to_string(),
            ),
            AppError::NoValidData => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "NO_VALID_DATA",
                self.to_string(),
            ),
            AppError::Internal(e) => {
                tracing::error!("Internal error: {e:?}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An internal server error occurred".to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": {
                "code": code,
                "message": message
            }
        }));

        (status, body).into_response()
    }
}
