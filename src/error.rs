//! Crate-level error type
//!
//! Every failure maps onto one [`ErrorKind`]:
//! - `Context`: missing or contradictory run context
//! - `SchemaValidation`: document or registry rejected by a schema rule
//! - `Io`: write, read or encoding failure
//! - `InvalidInput`: bad arguments or configuration
//!
//! Nothing is retried. Validation always fails before any write.

use thiserror::Error;

use crate::export::StorageError;
use crate::schema::{SchemaError, ValidationReport};

/// Coarse error classification
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Context,
    SchemaValidation,
    Io,
    InvalidInput,
}

impl ErrorKind {
    pub fn code(&self) -> &'static str {
        match self {
            ErrorKind::Context => "FMU_CONTEXT_ERROR",
            ErrorKind::SchemaValidation => "FMU_SCHEMA_VALIDATION_ERROR",
            ErrorKind::Io => "FMU_IO_ERROR",
            ErrorKind::InvalidInput => "FMU_INVALID_INPUT",
        }
    }
}

#[derive(Debug, Error)]
pub enum DataioError {
    #[error("Context error: {0}")]
    Context(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("{0}")]
    Schema(#[from] SchemaError),

    #[error("Validation failed: {0}")]
    Validation(ValidationReport),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl DataioError {
    pub fn context(message: impl Into<String>) -> Self {
        DataioError::Context(message.into())
    }

    pub fn invalid_input(message: impl Into<String>) -> Self {
        DataioError::InvalidInput(message.into())
    }

    pub fn invalid_config(message: impl Into<String>) -> Self {
        DataioError::InvalidConfig(message.into())
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            DataioError::Context(_) => ErrorKind::Context,
            DataioError::Schema(_) | DataioError::Validation(_) => ErrorKind::SchemaValidation,
            DataioError::Storage(_) | DataioError::Serialization(_) => ErrorKind::Io,
            DataioError::InvalidInput(_) | DataioError::InvalidConfig(_) => {
                ErrorKind::InvalidInput
            }
        }
    }

    /// Most specific code available: the registry code for schema errors,
    /// else the kind code.
    pub fn code(&self) -> &'static str {
        match self {
            DataioError::Schema(e) => e.code().code(),
            DataioError::InvalidConfig(_) => "FMU_INVALID_CONFIG",
            other => other.kind().code(),
        }
    }

    /// The validation report, when this is a validation failure
    pub fn report(&self) -> Option<&ValidationReport> {
        match self {
            DataioError::Validation(report) => Some(report),
            _ => None,
        }
    }
}

impl From<std::io::Error> for DataioError {
    fn from(err: std::io::Error) -> Self {
        DataioError::Storage(StorageError::from(err))
    }
}

impl From<serde_json::Error> for DataioError {
    fn from(err: serde_json::Error) -> Self {
        DataioError::Serialization(err.to_string())
    }
}

impl From<serde_yaml::Error> for DataioError {
    fn from(err: serde_yaml::Error) -> Self {
        DataioError::Serialization(err.to_string())
    }
}

impl From<csv::Error> for DataioError {
    fn from(err: csv::Error) -> Self {
        DataioError::Serialization(err.to_string())
    }
}

pub type DataioResult<T> = Result<T, DataioError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_mapping() {
        assert_eq!(DataioError::context("no case").kind(), ErrorKind::Context);
        assert_eq!(DataioError::invalid_input("x").kind(), ErrorKind::InvalidInput);
        assert_eq!(DataioError::invalid_config("x").kind(), ErrorKind::InvalidInput);
        assert_eq!(
            DataioError::Serialization("x".into()).kind(),
            ErrorKind::Io
        );
        assert_eq!(
            DataioError::from(SchemaError::schema_required()).kind(),
            ErrorKind::SchemaValidation
        );
    }

    #[test]
    fn test_schema_error_keeps_registry_code() {
        let err = DataioError::from(SchemaError::schema_immutable("fmu_results", "0.10.0"));
        assert_eq!(err.code(), "FMU_SCHEMA_IMMUTABLE");
    }

    #[test]
    fn test_io_error_maps_to_storage() {
        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let err = DataioError::from(io);
        assert_eq!(err.kind(), ErrorKind::Io);
        assert_eq!(err.code(), "FMU_IO_ERROR");
    }

    #[test]
    fn test_validation_error_carries_report() {
        let report = ValidationReport {
            schema_id: "id".into(),
            version: "0.10.0".into(),
            violations: vec![crate::schema::Violation::missing_field("/data/spec", "xinc")],
        };
        let err = DataioError::Validation(report);
        assert_eq!(err.report().unwrap().violations.len(), 1);
        assert!(err.to_string().contains("xinc"));
    }
}
