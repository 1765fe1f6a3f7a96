//! Error types for the sync engine.

use postlog_codec::CodecError;
use thiserror::Error;

/// Result type for sync operations.
pub type SyncResult<T> = Result<T, SyncError>;

/// Errors that can occur during collect and clear runs.
#[derive(Error, Debug)]
pub enum SyncError {
    /// Missing or invalid configuration. Raised before any remote call.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// The remote platform rejected the credentials.
    #[error("authentication failed: {0}")]
    AuthenticationFailed(String),

    /// The storage post content is not a valid post log.
    #[error("storage post does not hold a valid post log: {source}")]
    MalformedStorage {
        /// The decode failure.
        #[source]
        source: CodecError,
    },

    /// Clear refused to overwrite a post that does not hold a post log.
    #[error("this does not look like a storage post, delete its content manually: {source}")]
    NotStoragePost {
        /// The decode failure that failed the check.
        #[source]
        source: CodecError,
    },

    /// A remote call failed.
    #[error("remote service error: {message}")]
    Remote {
        /// Error message.
        message: String,
        /// Whether a later attempt may succeed.
        retryable: bool,
    },

    /// The remote service answered with an unexpected shape.
    #[error("protocol error: {0}")]
    Protocol(String),

    /// A run was started while another run is active on the same engine.
    #[error("invalid state transition from {from} to {to}")]
    InvalidStateTransition {
        /// Current state.
        from: String,
        /// Attempted run.
        to: String,
    },
}

impl SyncError {
    /// Creates a retryable remote error.
    pub fn remote_retryable(message: impl Into<String>) -> Self {
        Self::Remote {
            message: message.into(),
            retryable: true,
        }
    }

    /// Creates a non-retryable remote error.
    pub fn remote_fatal(message: impl Into<String>) -> Self {
        Self::Remote {
            message: message.into(),
            retryable: false,
        }
    }

    /// Returns true if the invoking scheduler may retry the run later.
    pub fn is_retryable(&self) -> bool {
        match self {
            SyncError::Remote { retryable, .. } => *retryable,
            _ => false,
        }
    }
}

impl From<CodecError> for SyncError {
    fn from(source: CodecError) -> Self {
        SyncError::MalformedStorage { source }
    }
}
