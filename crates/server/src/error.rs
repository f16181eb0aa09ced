//! Application error types.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use curata_engine::EngineError;
use serde_json::json;
use thiserror::Error;

/// Application errors.
#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Engine(#[from] EngineError),

    #[error("internal server error")]
    Internal(#[from] anyhow::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Domain errors are safe to echo; upstream and internal detail is
        // logged and replaced with a generic message.
        let (status, message) = match &self {
            AppError::Engine(EngineError::Validation(_)) => {
                (StatusCode::BAD_REQUEST, self.to_string())
            }
            AppError::Engine(EngineError::NotFound { .. }) => {
                (StatusCode::NOT_FOUND, self.to_string())
            }
            AppError::Engine(EngineError::Upstream(detail)) => {
                tracing::error!(error = %detail, "upstream error");
                (
                    StatusCode::BAD_GATEWAY,
                    "upstream service error".to_string(),
                )
            }
            AppError::Engine(EngineError::Network(e)) => {
                tracing::error!(error = %e, "upstream unreachable");
                (
                    StatusCode::GATEWAY_TIMEOUT,
                    "upstream service unreachable".to_string(),
                )
            }
            AppError::Internal(e) => {
                tracing::error!(error = %e, "internal server error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal server error".to_string(),
                )
            }
        };

        (status, Json(json!({ "error": message }))).into_response()
    }
}

/// Result type alias using AppError.
pub type AppResult<T> = Result<T, AppError>;
