//! Error taxonomy shared by every portfolio crate.

use thiserror::Error;

/// Result type alias for portfolio operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Top-level error for the portfolio data layer.
#[derive(Debug, Error)]
pub enum Error {
    #[error("Database operation failed: {0}")]
    Database(#[from] DatabaseError),

    /// The remote store rejected or failed an operation.
    #[error("Remote store error: {0}")]
    Remote(String),

    /// A remote operation did not finish within its bounded window.
    #[error("Remote {operation} for '{key}' timed out after {timeout_ms}ms")]
    RemoteTimeout {
        operation: &'static str,
        key: String,
        timeout_ms: u64,
    },

    /// A persisted value could not be decoded into its document type.
    #[error("Corrupt data for '{key}': {message}")]
    CorruptData { key: String, message: String },

    #[error("Seed source unavailable: {0}")]
    Seed(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Invalid state: {0}")]
    InvalidState(String),
}

/// Storage-level failures raised by embedded database adapters.
#[derive(Debug, Error)]
pub enum DatabaseError {
    #[error("Failed to connect to database: {0}")]
    ConnectionFailed(String),

    #[error("Failed to create connection pool: {0}")]
    PoolCreationFailed(String),

    #[error("Migration failed: {0}")]
    MigrationFailed(String),

    #[error("Query failed: {0}")]
    QueryFailed(String),

    #[error("Internal database error: {0}")]
    Internal(String),
}

impl Error {
    pub fn corrupt(key: impl Into<String>, message: impl Into<String>) -> Self {
        Self::CorruptData {
            key: key.into(),
            message: message.into(),
        }
    }

    pub fn remote(message: impl Into<String>) -> Self {
        Self::Remote(message.into())
    }

    /// True for failures that came from the remote tier.
    pub fn is_remote(&self) -> bool {
        matches!(self, Self::Remote(_) | Self::RemoteTimeout { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timeout_message_names_operation_and_key() {
        let err = Error::RemoteTimeout {
            operation: "set",
            key: "about_info".to_string(),
            timeout_ms: 15_000,
        };
        assert_eq!(
            err.to_string(),
            "Remote set for 'about_info' timed out after 15000ms"
        );
        assert!(err.is_remote());
    }

    #[test]
    fn corrupt_data_is_not_remote() {
        let err = Error::corrupt("lit_cities", "expected array");
        assert!(!err.is_remote());
        assert!(err.to_string().contains("lit_cities"));
    }
}
