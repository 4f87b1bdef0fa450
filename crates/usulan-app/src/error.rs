use axum::Json;
use axum::response::{IntoResponse, Response};
use http::StatusCode;
use serde_json::json;
use tracing::error;

use crate::usulan::validation::FieldErrors;

pub type ApiResult<T, E = ApiError> = std::result::Result<T, E>;

pub const NOT_FOUND_MESSAGE: &str = "Data Usulan Buku tidak ditemukan";

#[derive(thiserror::Error, Debug)]
pub enum ApiError {
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Record not found: {0}")]
    NotFound(String),

    #[error("Validation failed: {0:?}")]
    Validation(FieldErrors),

    #[error("Database error: {0}")]
    Database(#[from] usulan_dal::Error),

    #[error("Store error: {0}")]
    Store(#[from] usulan_store::error::StoreError),

    #[error("Multipart error: {0}")]
    Multipart(#[from] axum::extract::multipart::MultipartError),

    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::Validation(errors) => {
                (StatusCode::UNPROCESSABLE_ENTITY, Json(errors)).into_response()
            }
            ApiError::NotFound(message) => {
                (StatusCode::NOT_FOUND, Json(json!({ "error": message }))).into_response()
            }
            ApiError::Database(usulan_dal::Error::RecordNotFound(_)) => (
                StatusCode::NOT_FOUND,
                Json(json!({ "error": NOT_FOUND_MESSAGE })),
            )
                .into_response(),
            ApiError::Database(usulan_dal::Error::UniqueViolation(field)) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                Json(FieldErrors::taken(&field)),
            )
                .into_response(),
            ApiError::InvalidRequest(message) => {
                (StatusCode::BAD_REQUEST, message).into_response()
            }
            ApiError::Multipart(e) => (StatusCode::BAD_REQUEST, e.to_string()).into_response(),
            ApiError::Store(usulan_store::error::StoreError::NotFound(path)) => {
                (StatusCode::NOT_FOUND, format!("File not found: {path}")).into_response()
            }
            ApiError::Store(usulan_store::error::StoreError::InvalidPath) => {
                (StatusCode::BAD_REQUEST, "Invalid path").into_response()
            }
            other => {
                error!("Internal server error: {other}");
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error").into_response()
            }
        }
    }
}
