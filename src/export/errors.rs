//! # Storage Errors

use thiserror::Error;

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Storage backend errors
#[derive(Debug, Clone, Error)]
pub enum StorageError {
    #[error("Object not found: {0}")]
    ObjectNotFound(String),

    #[error("Object already exists: {0}")]
    ObjectAlreadyExists(String),

    #[error("Invalid path: {0}")]
    InvalidPath(String),

    #[error("I/O error: {0}")]
    IoError(String),
}

impl StorageError {
    /// Whether the error leaves the target untouched
    pub fn is_refusal(&self) -> bool {
        matches!(
            self,
            StorageError::ObjectAlreadyExists(_) | StorageError::InvalidPath(_)
        )
    }
}

impl From<std::io::Error> for StorageError {
    fn from(err: std::io::Error) -> Self {
        StorageError::IoError(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_io_conversion() {
        let err = StorageError::from(std::io::Error::new(std::io::ErrorKind::Other, "disk full"));
        assert!(matches!(err, StorageError::IoError(ref m) if m.contains("disk full")));
        assert!(!err.is_refusal());
    }

    #[test]
    fn test_refusals() {
        assert!(StorageError::ObjectAlreadyExists("a".into()).is_refusal());
        assert!(StorageError::InvalidPath("/abs".into()).is_refusal());
        assert!(!StorageError::ObjectNotFound("a".into()).is_refusal());
    }
}
