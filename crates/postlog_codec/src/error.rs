//! Error types for the codec crate.

use thiserror::Error;

/// Result type for codec operations.
pub type CodecResult<T> = Result<T, CodecError>;

/// Errors that can occur while decoding a serialized post log.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CodecError {
    /// A token did not split into exactly `DATE:COUNT`.
    #[error("malformed log token: {token:?}")]
    MalformedToken {
        /// The offending token.
        token: String,
    },

    /// The date half of a token is not a `YYYY-MM-DD` calendar date.
    #[error("invalid date in log token: {value:?}")]
    InvalidDate {
        /// The offending date text.
        value: String,
    },

    /// The count half of a token is not a positive integer without leading zeros.
    #[error("invalid count in log token: {value:?}")]
    InvalidCount {
        /// The offending count text.
        value: String,
    },

    /// The post body has no element carrying the log container id.
    #[error("post body has no #{id} container")]
    MissingContainer {
        /// The container id that was searched for.
        id: &'static str,
    },

    /// The post body could not be scanned as HTML.
    #[error("failed to scan post body: {message}")]
    Html {
        /// Description of the scanning error.
        message: String,
    },
}

impl CodecError {
    /// Create a malformed token error.
    pub fn malformed_token(token: impl Into<String>) -> Self {
        Self::MalformedToken {
            token: token.into(),
        }
    }

    /// Create an invalid date error.
    pub fn invalid_date(value: impl Into<String>) -> Self {
        Self::InvalidDate {
            value: value.into(),
        }
    }

    /// Create an invalid count error.
    pub fn invalid_count(value: impl Into<String>) -> Self {
        Self::InvalidCount {
            value: value.into(),
        }
    }
}
