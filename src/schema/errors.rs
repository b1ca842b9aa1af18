//! Schema error types
//!
//! Error codes:
//! - FMU_SCHEMA_REQUIRED (REJECT)
//! - FMU_UNKNOWN_SCHEMA (REJECT)
//! - FMU_UNKNOWN_SCHEMA_VERSION (REJECT)
//! - FMU_SCHEMA_IMMUTABLE (REJECT)
//! - FMU_SCHEMA_VERSION_BUMP (REJECT)
//! - FMU_SCHEMA_MALFORMED (FATAL)

use std::fmt;

use serde::{Deserialize, Serialize};

/// Severity levels for schema errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Request rejected, registry unchanged
    Reject,
    /// Registry cannot be trusted; the process should stop
    Fatal,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Reject => write!(f, "REJECT"),
            Severity::Fatal => write!(f, "FATAL"),
        }
    }
}

/// Schema-specific error codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchemaErrorCode {
    /// Document does not declare a schema version
    FmuSchemaRequired,
    /// No schema published under this category or name
    FmuUnknownSchema,
    /// Category known, version not published
    FmuUnknownSchemaVersion,
    /// Attempt to change a published schema
    FmuSchemaImmutable,
    /// New version does not bump enough for its changes
    FmuSchemaVersionBump,
    /// Schema file unreadable, not JSON, or not a valid JSON Schema
    FmuSchemaMalformed,
}

impl SchemaErrorCode {
    /// Returns the string code
    pub fn code(&self) -> &'static str {
        match self {
            SchemaErrorCode::FmuSchemaRequired => "FMU_SCHEMA_REQUIRED",
            SchemaErrorCode::FmuUnknownSchema => "FMU_UNKNOWN_SCHEMA",
            SchemaErrorCode::FmuUnknownSchemaVersion => "FMU_UNKNOWN_SCHEMA_VERSION",
            SchemaErrorCode::FmuSchemaImmutable => "FMU_SCHEMA_IMMUTABLE",
            SchemaErrorCode::FmuSchemaVersionBump => "FMU_SCHEMA_VERSION_BUMP",
            SchemaErrorCode::FmuSchemaMalformed => "FMU_SCHEMA_MALFORMED",
        }
    }

    /// Returns the severity level for this error
    pub fn severity(&self) -> Severity {
        match self {
            SchemaErrorCode::FmuSchemaMalformed => Severity::Fatal,
            _ => Severity::Reject,
        }
    }
}

impl fmt::Display for SchemaErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Category of a single validation violation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ViolationKind {
    /// A required property is absent
    MissingField,
    /// Value outside an enumeration
    EnumMismatch,
    /// Value has the wrong JSON type
    TypeMismatch,
    /// Value differs from a fixed constant
    ConstantMismatch,
    /// String does not match a declared format (uuid, date-time, ...)
    Format,
    /// String does not match a pattern
    Pattern,
    /// Class, stage and populated context blocks disagree
    ContextMismatch,
    /// Anything else the schema rejects
    Other,
}

impl ViolationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ViolationKind::MissingField => "missing_field",
            ViolationKind::EnumMismatch => "enum_mismatch",
            ViolationKind::TypeMismatch => "type_mismatch",
            ViolationKind::ConstantMismatch => "constant_mismatch",
            ViolationKind::Format => "format",
            ViolationKind::Pattern => "pattern",
            ViolationKind::ContextMismatch => "context_mismatch",
            ViolationKind::Other => "other",
        }
    }
}

/// One schema-path violation found in a document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Violation {
    /// JSON pointer into the document (`""` for the root)
    pub path: String,
    /// JSON pointer into the schema, empty for native rules
    pub schema_path: String,
    pub kind: ViolationKind,
    pub message: String,
}

impl Violation {
    pub fn new(
        path: impl Into<String>,
        schema_path: impl Into<String>,
        kind: ViolationKind,
        message: impl Into<String>,
    ) -> Self {
        Self {
            path: path.into(),
            schema_path: schema_path.into(),
            kind,
            message: message.into(),
        }
    }

    pub fn missing_field(path: impl Into<String>, field: &str) -> Self {
        Self::new(
            path,
            "",
            ViolationKind::MissingField,
            format!("\"{}\" is a required property", field),
        )
    }

    pub fn context_mismatch(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(path, "", ViolationKind::ContextMismatch, message)
    }
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let path = if self.path.is_empty() { "/" } else { &self.path };
        write!(f, "{} at '{}': {}", self.kind.as_str(), path, self.message)
    }
}

/// Schema error type with full context
#[derive(Debug)]
pub struct SchemaError {
    code: SchemaErrorCode,
    message: String,
    schema_id: Option<String>,
    schema_version: Option<String>,
}

impl SchemaError {
    /// Document carries no `version`
    pub fn schema_required() -> Self {
        Self {
            code: SchemaErrorCode::FmuSchemaRequired,
            message: "Metadata document does not declare a schema 'version'".into(),
            schema_id: None,
            schema_version: None,
        }
    }

    /// No schema under this identifier
    pub fn unknown_schema(schema_id: impl Into<String>) -> Self {
        let id = schema_id.into();
        Self {
            code: SchemaErrorCode::FmuUnknownSchema,
            message: format!("Schema '{}' not found", id),
            schema_id: Some(id),
            schema_version: None,
        }
    }

    /// Known schema, unknown version
    pub fn unknown_version(schema_id: impl Into<String>, version: impl Into<String>) -> Self {
        let id = schema_id.into();
        let ver = version.into();
        Self {
            code: SchemaErrorCode::FmuUnknownSchemaVersion,
            message: format!("Schema '{}' version '{}' is not published", id, ver),
            schema_id: Some(id),
            schema_version: Some(ver),
        }
    }

    /// Published content cannot change
    pub fn schema_immutable(schema_id: impl Into<String>, version: impl Into<String>) -> Self {
        let id = schema_id.into();
        let ver = version.into();
        Self {
            code: SchemaErrorCode::FmuSchemaImmutable,
            message: format!(
                "Schema '{}' version '{}' is already published with different content",
                id, ver
            ),
            schema_id: Some(id),
            schema_version: Some(ver),
        }
    }

    /// Version increment too small for the changes it carries
    pub fn version_bump(
        schema_id: impl Into<String>,
        version: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        let id = schema_id.into();
        let ver = version.into();
        Self {
            code: SchemaErrorCode::FmuSchemaVersionBump,
            message: format!("Schema '{}' version '{}': {}", id, ver, reason.into()),
            schema_id: Some(id),
            schema_version: Some(ver),
        }
    }

    /// Unreadable or invalid schema document
    pub fn malformed_schema(path: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            code: SchemaErrorCode::FmuSchemaMalformed,
            message: format!("Malformed schema '{}': {}", path.into(), reason.into()),
            schema_id: None,
            schema_version: None,
        }
    }

    /// Returns the error code
    pub fn code(&self) -> SchemaErrorCode {
        self.code
    }

    /// Returns the severity level
    pub fn severity(&self) -> Severity {
        self.code.severity()
    }

    /// Returns the error message
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Returns the schema ID if applicable
    pub fn schema_id(&self) -> Option<&str> {
        self.schema_id.as_deref()
    }

    /// Returns the schema version if applicable
    pub fn schema_version(&self) -> Option<&str> {
        self.schema_version.as_deref()
    }

    /// Returns whether this is a fatal error
    pub fn is_fatal(&self) -> bool {
        self.severity() == Severity::Fatal
    }
}

impl fmt::Display for SchemaError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}: {}", self.code.severity(), self.code.code(), self.message)
    }
}

impl std::error::Error for SchemaError {}

/// Result type for schema operations
pub type SchemaResult<T> = Result<T, SchemaError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        assert_eq!(SchemaErrorCode::FmuSchemaRequired.code(), "FMU_SCHEMA_REQUIRED");
        assert_eq!(SchemaErrorCode::FmuUnknownSchema.code(), "FMU_UNKNOWN_SCHEMA");
        assert_eq!(
            SchemaErrorCode::FmuUnknownSchemaVersion.code(),
            "FMU_UNKNOWN_SCHEMA_VERSION"
        );
        assert_eq!(SchemaErrorCode::FmuSchemaImmutable.code(), "FMU_SCHEMA_IMMUTABLE");
        assert_eq!(SchemaErrorCode::FmuSchemaMalformed.code(), "FMU_SCHEMA_MALFORMED");
    }

    #[test]
    fn test_severity_levels() {
        assert_eq!(SchemaErrorCode::FmuSchemaImmutable.severity(), Severity::Reject);
        assert_eq!(SchemaErrorCode::FmuSchemaMalformed.severity(), Severity::Fatal);
        assert!(SchemaError::malformed_schema("x.json", "bad").is_fatal());
    }

    #[test]
    fn test_violation_display() {
        let violation = Violation::missing_field("/data/spec", "xinc");
        let display = format!("{}", violation);
        assert!(display.contains("missing_field"));
        assert!(display.contains("/data/spec"));
        assert!(display.contains("xinc"));
    }

    #[test]
    fn test_root_violation_path_displayed_as_slash() {
        let violation = Violation::context_mismatch("", "class 'case' carries a file block");
        assert!(format!("{}", violation).contains("at '/'"));
    }

    #[test]
    fn test_error_display_includes_code_and_severity() {
        let err = SchemaError::unknown_version("fmu_results", "9.9.9");
        let display = format!("{}", err);
        assert!(display.contains("REJECT"));
        assert!(display.contains("FMU_UNKNOWN_SCHEMA_VERSION"));
        assert!(display.contains("9.9.9"));
    }
}
