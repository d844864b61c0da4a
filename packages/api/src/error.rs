// ABOUTME: Application error type returned by every handler
// ABOUTME: Maps domain errors to status codes and sanitized JSON bodies with a request id

use agentboard_storage::StorageError;
use agentboard_sync::SyncError;
use axum::{
    extract::rejection::{JsonRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;
use tracing::{error, info};
use uuid::Uuid;

pub const PROJECT_NOT_FOUND: &str = "Project not found or access denied";

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Unauthorized access")]
    Unauthorized,

    #[error("Validation error: {0}")]
    Validation(String),

    /// Missing or not owned; the two cases are deliberately indistinguishable
    #[error("{0}")]
    NotFound(String),

    #[error("Upstream unavailable: {0}")]
    Upstream(String),

    #[error("Sync failed: {0}")]
    Sync(SyncError),

    #[error("Storage error: {0}")]
    Storage(StorageError),

    #[error("Internal server error")]
    Internal(#[from] anyhow::Error),
}

/// Error body shared by all endpoints
#[derive(Serialize)]
struct ErrorResponse {
    error: String,
    code: &'static str,
    request_id: String,
}

impl AppError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn project_not_found() -> Self {
        Self::NotFound(PROJECT_NOT_FOUND.to_string())
    }

    pub fn internal(err: impl Into<anyhow::Error>) -> Self {
        Self::Internal(err.into())
    }

    fn to_status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            AppError::Unauthorized => (StatusCode::UNAUTHORIZED, "UNAUTHORIZED"),
            AppError::Validation(_) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR"),
            AppError::NotFound(_) => (StatusCode::NOT_FOUND, "NOT_FOUND"),
            AppError::Upstream(_) => (StatusCode::BAD_GATEWAY, "UPSTREAM_UNAVAILABLE"),
            AppError::Sync(err) => {
                let status = match err {
                    SyncError::ProjectNotFound | SyncError::MetricsNotFound => StatusCode::NOT_FOUND,
                    SyncError::RepoNotConfigured
                    | SyncError::GitHubNotConnected
                    | SyncError::InvalidRepoFormat
                    | SyncError::GitHubUnauthorized => StatusCode::BAD_REQUEST,
                    SyncError::UpstreamUnavailable(_) => StatusCode::BAD_GATEWAY,
                    SyncError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
                };
                (status, err.code())
            }
            AppError::Storage(err) => match err {
                StorageError::Validation(_) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR"),
                err if err.is_not_found() => (StatusCode::NOT_FOUND, "NOT_FOUND"),
                _ => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
            },
            AppError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
        }
    }

    /// Message safe to show to API clients
    fn to_user_message(&self) -> String {
        match self {
            AppError::Unauthorized => "Authentication required".to_string(),
            AppError::Validation(msg) => msg.clone(),
            AppError::NotFound(msg) => msg.clone(),
            AppError::Upstream(_) => "GitHub is unavailable. Please try again later.".to_string(),
            AppError::Sync(err) => match err {
                SyncError::UpstreamUnavailable(_) => {
                    "GitHub is unavailable. Please try again later.".to_string()
                }
                SyncError::Storage(_) => "An internal server error occurred".to_string(),
                other => other.to_string(),
            },
            AppError::Storage(err) => match err {
                StorageError::Validation(validation) => validation.to_string(),
                err if err.is_not_found() => "The requested resource was not found".to_string(),
                _ => "An internal server error occurred".to_string(),
            },
            AppError::Internal(_) => "An internal server error occurred".to_string(),
        }
    }
}

impl From<StorageError> for AppError {
    fn from(err: StorageError) -> Self {
        AppError::Storage(err)
    }
}

impl From<SyncError> for AppError {
    fn from(err: SyncError) -> Self {
        match err {
            SyncError::ProjectNotFound => AppError::project_not_found(),
            SyncError::Storage(storage) => AppError::Storage(storage),
            other => AppError::Sync(other),
        }
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::Validation(rejection.body_text())
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        AppError::Validation(rejection.body_text())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let request_id = Uuid::new_v4().to_string();
        let (status_code, error_code) = self.to_status_and_code();

        if status_code.is_server_error() && status_code != StatusCode::BAD_GATEWAY {
            error!(
                request_id = %request_id,
                error = %self,
                "Internal server error occurred"
            );
        } else {
            // Expected business errors
            info!(
                request_id = %request_id,
                error_code = %error_code,
                error = %self,
                "API error response"
            );
        }

        let body = ErrorResponse {
            error: self.to_user_message(),
            code: error_code,
            request_id,
        };

        (status_code, Json(body)).into_response()
    }
}

/// Result type alias for API handlers
pub type ApiResult<T> = Result<T, AppError>;
