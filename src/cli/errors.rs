//! CLI-specific error types
//!
//! Library errors keep their own `FMU_*` code; failures of the CLI
//! itself use `FMU_CLI_*`.

use std::fmt;
use std::io;

use crate::error::DataioError;
use crate::schema::SchemaError;

/// CLI error codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CliErrorCode {
    /// Configuration file error
    ConfigError,
    /// I/O error (stdin/stdout, files)
    IoError,
    /// At least one document failed validation
    ValidationFailed,
    /// Schema server could not start or stopped with an error
    ServeFailed,
    /// Error raised by the library, with its code
    Dataio(&'static str),
}

impl CliErrorCode {
    pub fn code(&self) -> &'static str {
        match self {
            Self::ConfigError => "FMU_CLI_CONFIG_ERROR",
            Self::IoError => "FMU_CLI_IO_ERROR",
            Self::ValidationFailed => "FMU_CLI_VALIDATION_FAILED",
            Self::ServeFailed => "FMU_CLI_SERVE_FAILED",
            Self::Dataio(code) => code,
        }
    }
}

#[derive(Debug)]
pub struct CliError {
    code: CliErrorCode,
    message: String,
}

impl CliError {
    pub fn new(code: CliErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    pub fn config_error(msg: impl Into<String>) -> Self {
        Self::new(CliErrorCode::ConfigError, msg)
    }

    pub fn io_error(msg: impl Into<String>) -> Self {
        Self::new(CliErrorCode::IoError, msg)
    }

    pub fn validation_failed(msg: impl Into<String>) -> Self {
        Self::new(CliErrorCode::ValidationFailed, msg)
    }

    pub fn serve_failed(msg: impl Into<String>) -> Self {
        Self::new(CliErrorCode::ServeFailed, msg)
    }

    pub fn code(&self) -> CliErrorCode {
        self.code
    }

    pub fn code_str(&self) -> &'static str {
        self.code.code()
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code.code(), self.message)
    }
}

impl std::error::Error for CliError {}

impl From<io::Error> for CliError {
    fn from(e: io::Error) -> Self {
        Self::io_error(e.to_string())
    }
}

impl From<serde_json::Error> for CliError {
    fn from(e: serde_json::Error) -> Self {
        Self::io_error(format!("JSON error: {}", e))
    }
}

impl From<DataioError> for CliError {
    fn from(e: DataioError) -> Self {
        match e {
            DataioError::InvalidConfig(msg) => Self::config_error(msg),
            DataioError::Validation(report) => Self::validation_failed(report.to_string()),
            other => Self::new(CliErrorCode::Dataio(other.code()), other.to_string()),
        }
    }
}

impl From<SchemaError> for CliError {
    fn from(e: SchemaError) -> Self {
        DataioError::from(e).into()
    }
}

/// CLI result type
pub type CliResult<T> = Result<T, CliError>;
