//! Core error types for flocus-core.
//!
//! None of these are fatal to a running timer: the controller logs storage
//! failures and falls back to defaults, and the quote client falls back to a
//! local quote. They are still surfaced from the lower-level APIs so callers
//! that care (the CLI, tests) can inspect them.

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for flocus-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Key/value storage errors
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

/// Errors from the persistence gateway.
#[derive(Error, Debug)]
pub enum StorageError {
    /// Failed to open database connection
    #[error("Failed to open database at {path}: {source}")]
    OpenFailed {
        path: PathBuf,
        #[source]
        source: rusqlite::Error,
    },

    /// Query execution failed
    #[error("Query failed: {0}")]
    QueryFailed(String),

    /// Database is locked
    #[error("Database is locked")]
    Locked,

    /// A stored value exists but cannot be decoded
    #[error("Corrupt value for key '{key}': {message}")]
    Corrupt { key: String, message: String },

    /// A value could not be encoded for storage
    #[error("Failed to encode value for key '{key}': {message}")]
    Encode { key: String, message: String },
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to load configuration
    #[error("Failed to load configuration from {path}: {message}")]
    LoadFailed { path: PathBuf, message: String },

    /// Failed to save configuration
    #[error("Failed to save configuration to {path}: {message}")]
    SaveFailed { path: PathBuf, message: String },

    /// Invalid configuration value
    #[error("Invalid configuration value for '{key}': {message}")]
    InvalidValue { key: String, message: String },

    /// Unknown configuration key
    #[error("Unknown configuration key: {0}")]
    UnknownKey(String),

    /// Data directory could not be determined or created
    #[error("Data directory unavailable: {0}")]
    DataDir(String),
}

/// Errors from the motivational quote service.
#[derive(Error, Debug)]
pub enum QuoteError {
    /// Transport-level failure
    #[error("Request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The service did not answer within the allowed window
    #[error("No response within {timeout_secs} seconds")]
    Timeout { timeout_secs: u64 },

    /// Non-success HTTP status
    #[error("Service returned status {0}")]
    Status(u16),

    /// Body was not the expected `{ text, author }` shape
    #[error("Malformed quote: {0}")]
    Malformed(String),
}

impl From<rusqlite::Error> for StorageError {
    fn from(err: rusqlite::Error) -> Self {
        match &err {
            rusqlite::Error::SqliteFailure(inner, _msg) => {
                if inner.code == rusqlite::ErrorCode::DatabaseBusy
                    || inner.code == rusqlite::ErrorCode::DatabaseLocked
                {
                    StorageError::Locked
                } else {
                    StorageError::QueryFailed(err.to_string())
                }
            }
            _ => StorageError::QueryFailed(err.to_string()),
        }
    }
}

/// Errors from talking to the live timer driver.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum DriverError {
    /// The driver task has shut down
    #[error("Timer driver has stopped")]
    Closed,
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn storage_error_wraps_into_core_error() {
        let err: CoreError = StorageError::Corrupt {
            key: "streak".into(),
            message: "not a number".into(),
        }
        .into();
        assert_eq!(
            err.to_string(),
            "Storage error: Corrupt value for key 'streak': not a number"
        );
    }

    #[test]
    fn data_dir_error_wraps_into_core_error() {
        let err: CoreError = ConfigError::DataDir("/nope: denied".into()).into();
        assert_eq!(
            err.to_string(),
            "Configuration error: Data directory unavailable: /nope: denied"
        );
    }

    #[test]
    fn timeout_message_names_the_window() {
        let err = QuoteError::Timeout { timeout_secs: 10 };
        assert_eq!(err.to_string(), "No response within 10 seconds");
    }
}
