use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use crate::model::InvalidRecipeId;
use crate::store::StoreError;
use crate::validation::FieldErrors;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Validation failed: {0}")]
    Validation(FieldErrors),

    #[error(transparent)]
    InvalidId(#[from] InvalidRecipeId),

    #[error("Malformed request body: {0}")]
    BadRequest(String),

    #[error("Recipe not found")]
    NotFound,

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("Template rendering error: {0}")]
    Template(#[from] tera::Error),
}

impl From<FieldErrors> for AppError {
    fn from(errors: FieldErrors) -> Self {
        AppError::Validation(errors)
    }
}

fn field_errors(errors: FieldErrors) -> Response {
    (StatusCode::BAD_REQUEST, Json(json!({ "errors": errors }))).into_response()
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match self {
            AppError::Validation(errors) => field_errors(errors),
            AppError::InvalidId(e) => field_errors(FieldErrors::single("id", e.to_string())),
            AppError::BadRequest(message) => field_errors(FieldErrors::single("body", message)),
            AppError::Store(StoreError::DuplicateTitle) => field_errors(FieldErrors::single(
                "title",
                StoreError::DuplicateTitle.to_string(),
            )),
            AppError::NotFound => (
                StatusCode::NOT_FOUND,
                Json(json!({ "error": "Recipe not found" })),
            )
                .into_response(),
            other => {
                tracing::error!(error = %other, "Request failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({ "error": other.to_string() })),
                )
                    .into_response()
            }
        }
    }
}
