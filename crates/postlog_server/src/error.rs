//! Error types for the HTTP adapter.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use postlog_sync_engine::SyncError;
use thiserror::Error;
use tracing::error;

/// Result type for server operations.
pub type ServerResult<T> = Result<T, ServerError>;

/// Errors that can occur in the HTTP adapter.
#[derive(Error, Debug)]
pub enum ServerError {
    /// Required settings are absent.
    #[error("missing configuration: {}", .0.join(", "))]
    MissingConfig(Vec<String>),

    /// A setting has an unusable value.
    #[error("invalid configuration for `{key}`: {reason}")]
    InvalidConfig {
        /// Offending key.
        key: &'static str,
        /// Why it was rejected.
        reason: String,
    },

    /// The configuration sources could not be read.
    #[error("failed to build configuration: {0}")]
    Source(#[from] config::ConfigError),

    /// A collect or clear run failed.
    #[error(transparent)]
    Sync(#[from] SyncError),

    /// The blocking worker running the engine panicked or was cancelled.
    #[error("worker failed: {0}")]
    Worker(String),

    /// I/O error.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let message = self.to_string();
        error!(error = %message, "request failed");
        (StatusCode::INTERNAL_SERVER_ERROR, message).into_response()
    }
}
