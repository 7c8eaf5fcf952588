use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::store::StoreError;

/// Message shown for every server-side generation failure. The cause is logged, not sent.
pub const GENERATION_FAILED_MESSAGE: &str =
    "Failed to generate interview preparation. Please try again.";

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Not found: {0}")]
    NotFound(String),

    /// Server misconfiguration, e.g. no upstream credential.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Network, timeout or non-2xx from the completion endpoint.
    #[error("Upstream error: {0}")]
    Upstream(String),

    /// The completion endpoint answered with empty or unparsable content.
    #[error("Upstream format error: {0}")]
    UpstreamFormat(String),

    #[error("Extraction error: {0}")]
    Extraction(String),

    #[error("Storage error: {0}")]
    Storage(#[from] StoreError),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    fn parts(&self) -> (StatusCode, &'static str, String) {
        match self {
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone()),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg.clone()),
            AppError::Configuration(msg) => {
                tracing::error!("Configuration error: {msg}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "CONFIGURATION_ERROR",
                    GENERATION_FAILED_MESSAGE.to_string(),
                )
            }
            AppError::Upstream(msg) => {
                tracing::error!("Upstream error: {msg}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "UPSTREAM_ERROR",
                    GENERATION_FAILED_MESSAGE.to_string(),
                )
            }
            AppError::UpstreamFormat(msg) => {
                tracing::error!("Upstream format error: {msg}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "UPSTREAM_FORMAT_ERROR",
                    GENERATION_FAILED_MESSAGE.to_string(),
                )
            }
            AppError::Extraction(msg) => {
                tracing::error!("Extraction error: {msg}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "EXTRACTION_ERROR",
                    "Failed to parse PDF".to_string(),
                )
            }
            AppError::Storage(e) => {
                tracing::error!("Storage error: {e}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "STORAGE_ERROR",
                    "Failed to save local data".to_string(),
                )
            }
            AppError::Internal(e) => {
                tracing::error!("Internal error: {e:?}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An internal server error occurred".to_string(),
                )
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = self.parts();

        let body = Json(json!({
            "error": message,
            "code": code
        }));

        (status, body).into_response()
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::Validation(rejection.body_text())
    }
}
