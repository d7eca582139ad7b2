//! Error types for the EventDesk backend
//!
//! This module defines the error types used by the operator CLI, wrapping
//! the shared library's errors and adding configuration and storage
//! failures with enough context to act on.

use eventdesk_shared::SharedError;
use thiserror::Error;

/// Main error type for the EventDesk backend
#[derive(Error, Debug)]
pub enum BackendError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Record storage errors
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// Two-factor engine and account security errors
    #[error("{0}")]
    Shared(#[from] SharedError),

    /// File system operation errors
    #[error("File system error: {0}")]
    FileSystem(#[from] std::io::Error),

    /// Anyhow errors (for context and chaining)
    #[error("Operation failed: {0}")]
    Anyhow(#[from] anyhow::Error),
}

/// Configuration-related errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Configuration file not found: {path}")]
    NotFound { path: String },

    #[error("Invalid configuration: {field} - {reason}")]
    Invalid { field: String, reason: String },

    #[error("Configuration parsing failed: {0}")]
    Parse(#[from] serde_yaml::Error),
}

/// Two-factor record file errors
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Failed to read record file {path}: {reason}")]
    Read { path: String, reason: String },

    #[error("Failed to write record file {path}: {reason}")]
    Write { path: String, reason: String },

    #[error("Record file is corrupted: {path} - {reason}")]
    Corrupted { path: String, reason: String },

    #[error("Failed to lock record file {path}: {reason}")]
    Lock { path: String, reason: String },
}

/// Result type alias for backend operations
pub type BackendResult<T> = Result<T, BackendError>;

impl From<StorageError> for SharedError {
    fn from(err: StorageError) -> Self {
        SharedError::Store {
            message: err.to_string(),
        }
    }
}

impl BackendError {
    /// Whether the error came from user input rather than the environment
    pub fn is_user_error(&self) -> bool {
        matches!(
            self,
            BackendError::Config(ConfigError::Invalid { .. })
                | BackendError::Shared(SharedError::NotEnrolled { .. })
                | BackendError::Shared(SharedError::InvalidConfig { .. })
        )
    }
}
