//! services/api/src/error.rs
//!
//! Defines the primary error type for the entire API service.

use crate::config::ConfigError;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use medilog_core::assistant::EmptyContent;
use medilog_core::{AuthError, CaptureError, PortError, RecordError};
use serde::Serialize;
use tracing::error;

/// The primary error type for the `api` service.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Represents an error that occurred during configuration loading.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Represents an error that propagated up from one of the core service ports.
    #[error("Service Port Error: {0}")]
    Port(#[from] PortError),

    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error(transparent)]
    Record(#[from] RecordError),

    #[error(transparent)]
    Capture(#[from] CaptureError),

    #[error(transparent)]
    Suggest(#[from] EmptyContent),

    /// Represents an error from the underlying database library.
    #[error("Database Error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Migration Error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// Represents a standard Input/Output error (e.g., binding to a network socket).
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Not signed in")]
    Unauthenticated,

    /// A catch-all for any other unexpected errors.
    #[error("An unexpected internal error occurred: {0}")]
    Internal(String),
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

fn port_status(e: &PortError) -> StatusCode {
    match e {
        PortError::NotFound(_) => StatusCode::NOT_FOUND,
        PortError::Conflict(_) => StatusCode::CONFLICT,
        PortError::Unauthorized => StatusCode::UNAUTHORIZED,
        PortError::Unexpected(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            ApiError::Auth(e) => match e {
                AuthError::MissingField(_) => StatusCode::BAD_REQUEST,
                AuthError::EmailTaken(_) => StatusCode::CONFLICT,
                AuthError::InvalidCredentials | AuthError::ExternalRejected => {
                    StatusCode::UNAUTHORIZED
                }
                AuthError::ProfileNotFound => StatusCode::NOT_FOUND,
                AuthError::Unsupported => StatusCode::SERVICE_UNAVAILABLE,
                AuthError::Port(e) => port_status(e),
            },
            ApiError::Record(e) => match e {
                RecordError::EmptyBatch => StatusCode::BAD_REQUEST,
                RecordError::ReminderNotFound(_) => StatusCode::NOT_FOUND,
                RecordError::Port(e) => port_status(e),
            },
            ApiError::Capture(e) => match e {
                CaptureError::EmptyTranscript => StatusCode::BAD_REQUEST,
                CaptureError::Unsupported => StatusCode::NOT_IMPLEMENTED,
                CaptureError::Busy => StatusCode::CONFLICT,
                CaptureError::Port(e) => port_status(e),
                CaptureError::Record(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
            ApiError::Suggest(_) => StatusCode::BAD_REQUEST,
            ApiError::Port(e) => port_status(e),
            ApiError::Unauthenticated => StatusCode::UNAUTHORIZED,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        // Server-side failures are logged in full but reported opaquely.
        let message = if status.is_server_error() {
            error!("Request failed: {}", self);
            "Something went wrong. Please try again.".to_string()
        } else {
            self.to_string()
        };
        (status, Json(ErrorResponse { error: message })).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn domain_errors_map_to_client_statuses() {
        let cases = [
            (ApiError::Auth(AuthError::EmailTaken("a@b.c".into())), StatusCode::CONFLICT),
            (ApiError::Auth(AuthError::ProfileNotFound), StatusCode::NOT_FOUND),
            (ApiError::Auth(AuthError::Unsupported), StatusCode::SERVICE_UNAVAILABLE),
            (ApiError::Record(RecordError::EmptyBatch), StatusCode::BAD_REQUEST),
            (ApiError::Capture(CaptureError::EmptyTranscript), StatusCode::BAD_REQUEST),
            (ApiError::Unauthenticated, StatusCode::UNAUTHORIZED),
            (ApiError::Internal("boom".into()), StatusCode::INTERNAL_SERVER_ERROR),
        ];
        for (err, status) in cases {
            assert_eq!(err.status(), status, "{}", err);
        }
    }
}
