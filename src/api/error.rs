//! HTTP error mapping.
//!
//! Domain failures become `{"detail": ...}` JSON bodies, the shape the
//! frontend already consumes. Internal messages are logged, never sent.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use thiserror::Error;

use crate::core::engine::EngineError;
use crate::store::StoreError;

#[derive(Debug, Error)]
pub enum ApiError {
    /// Unknown corridor, no providers, or an empty dataset (404).
    #[error("not found: {0}")]
    NotFound(String),

    /// The request parsed but its values are unusable (422).
    #[error("validation error: {0}")]
    Validation(String),

    /// Storage or other unexpected failure (500).
    #[error("internal error: {0}")]
    Internal(String),
}

impl From<StoreError> for ApiError {
    fn from(e: StoreError) -> Self {
        ApiError::Internal(e.to_string())
    }
}

impl From<EngineError> for ApiError {
    fn from(e: EngineError) -> Self {
        match e {
            EngineError::NoProviderData => {
                ApiError::NotFound("No provider data available for this corridor.".to_string())
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, detail) = match self {
            ApiError::NotFound(detail) => (StatusCode::NOT_FOUND, detail),
            ApiError::Validation(detail) => (StatusCode::UNPROCESSABLE_ENTITY, detail),
            ApiError::Internal(detail) => {
                tracing::error!(error = %detail, "Request failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal server error".to_string(),
                )
            }
        };

        (status, Json(json!({ "detail": detail }))).into_response()
    }
}
