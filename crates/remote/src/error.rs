//! Error types for the remote store crate.

use thiserror::Error;

/// Result type alias for remote store operations.
pub type Result<T> = std::result::Result<T, RemoteStoreError>;

#[derive(Debug, Error)]
pub enum RemoteStoreError {
    /// HTTP client error
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Error response from the REST endpoint
    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("Remote {operation} for '{key}' timed out after {timeout_ms}ms")]
    Timeout {
        operation: &'static str,
        key: String,
        timeout_ms: u64,
    },

    /// The request was accepted but the row is not there afterwards.
    #[error("Write verification failed: {0}")]
    Verification(String),
}

impl RemoteStoreError {
    pub fn api(status: u16, message: impl Into<String>) -> Self {
        Self::Api {
            status,
            message: message.into(),
        }
    }

    pub fn verification(message: impl Into<String>) -> Self {
        Self::Verification(message.into())
    }

    /// HTTP status if this is an API error.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::Api { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.status_code() == Some(404)
    }
}

impl From<RemoteStoreError> for folio_core::Error {
    fn from(err: RemoteStoreError) -> Self {
        match err {
            RemoteStoreError::Timeout {
                operation,
                key,
                timeout_ms,
            } => folio_core::Error::RemoteTimeout {
                operation,
                key,
                timeout_ms,
            },
            other => folio_core::Error::Remote(other.to_string()),
        }
    }
}
