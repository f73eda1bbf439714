use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use std::sync::Arc;
use thiserror::Error;
use tracing::error;

use crate::auth::TokenConfig;
use crate::stats::{StatsError, StatsService};

/// Shared application state containing all dependencies
#[derive(Clone)]
pub struct AppState {
    pub stats_service: Arc<StatsService>,
    pub token_config: TokenConfig,
}

impl AppState {
    pub fn new(stats_service: Arc<StatsService>, token_config: TokenConfig) -> Self {
        Self {
            stats_service,
            token_config,
        }
    }
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error("{0}")]
    Unauthenticated(String),

    #[error("{0}")]
    PermissionDenied(String),

    #[error("{0}")]
    BadRequest(String),

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl AppError {
    pub fn code(&self) -> &'static str {
        match self {
            AppError::Unauthenticated(_) => "unauthenticated",
            AppError::PermissionDenied(_) => "permission-denied",
            AppError::BadRequest(_) => "invalid-argument",
            AppError::Internal(_) => "internal",
        }
    }
}

impl From<StatsError> for AppError {
    fn from(err: StatsError) -> Self {
        let message = err.to_string();
        match err {
            StatsError::Unauthenticated => AppError::Unauthenticated(message),
            StatsError::PermissionDenied => AppError::PermissionDenied(message),
            StatsError::Validation(_) => AppError::BadRequest(message),
            StatsError::WriteConflict(_)
            | StatsError::ContentionExhausted { .. }
            | StatsError::Repository(_) => AppError::Internal(message),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let code = self.code();
        let (status, error_message) = match self {
            AppError::Unauthenticated(msg) => (StatusCode::UNAUTHORIZED, msg),
            AppError::PermissionDenied(msg) => (StatusCode::FORBIDDEN, msg),
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::Internal(msg) => {
                error!(error = %msg, "Request failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
        };

        let body = Json(json!({
            "code": code,
            "error": error_message
        }));

        (status, body).into_response()
    }
}
