//! # Storage Errors
//!
//! The contract exposes exactly three kinds of failure:
//! - `NotFound`: the target was absent when the operation required it
//! - `IoFailure`: a substrate-level read/write/permission error
//! - `NotInitialized`: no root bound and no default root configured

use thiserror::Error;

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Storage contract errors
#[derive(Debug, Clone, Error)]
pub enum StorageError {
    #[error("No file or directory at path: {0}")]
    NotFound(String),

    #[error("I/O failure: {0}")]
    IoFailure(String),

    #[error("Storage not initialized: call init() with a root location")]
    NotInitialized,
}

impl StorageError {
    /// Create an `IoFailure` from a substrate error, keeping the path context
    pub fn io(path: &str, err: impl std::fmt::Display) -> Self {
        StorageError::IoFailure(format!("{}: {}", path, err))
    }

    /// Create a `NotFound` for the given logical path
    pub fn not_found(path: impl Into<String>) -> Self {
        StorageError::NotFound(path.into())
    }

    /// Whether this error is the recoverable `NotFound` case
    pub fn is_not_found(&self) -> bool {
        matches!(self, StorageError::NotFound(_))
    }
}

impl From<std::io::Error> for StorageError {
    fn from(err: std::io::Error) -> Self {
        if err.kind() == std::io::ErrorKind::NotFound {
            StorageError::NotFound(err.to_string())
        } else {
            StorageError::IoFailure(err.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_is_recoverable() {
        let err = StorageError::not_found("db/users.db");
        assert!(err.is_not_found());
        assert!(err.to_string().contains("db/users.db"));
    }

    #[test]
    fn test_io_failure_keeps_path_context() {
        let source = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let err = StorageError::io("db/users.db", source);
        assert!(!err.is_not_found());
        assert!(err.to_string().contains("db/users.db"));
        assert!(err.to_string().contains("denied"));
    }

    #[test]
    fn test_io_error_kind_mapping() {
        let missing = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        assert!(StorageError::from(missing).is_not_found());

        let denied = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        assert!(!StorageError::from(denied).is_not_found());
    }
}
