//! Observable events
//!
//! Events are explicit and typed. Multi-step operations are bracketed by
//! an [`ObservationScope`](super::ObservationScope) instead.

use std::fmt;

use super::logger::Severity;

/// Observable events in fmu-dataio
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    // Configuration
    /// Global configuration parsed and normalized
    ConfigLoaded,
    /// Configuration accepted with a deprecated or conflicting setting
    ConfigWarning,

    // Schema registry
    /// Schema registry populated
    SchemasLoaded,
    /// Schema document written to a publish directory
    SchemaPublished,

    // Metadata
    /// Metadata document assembled
    MetadataBuilt,
    /// Export setting ignored for the chosen content
    SettingIgnored,
    /// Document passed schema validation
    ValidationPassed,
    /// Document failed schema validation
    ValidationFailed,

    // Case and aggregation
    /// Case metadata written to the case root
    CaseMetadataCreated,
    /// Case metadata already present, left untouched
    CaseMetadataExists,
    /// Aggregated metadata assembled from realization metadata
    AggregationBuilt,

    // Export
    /// Payload removed after its sidecar could not be written
    ExportRolledBack,
    /// Export manifest could not be updated
    ManifestUpdateFailed,

    // Server
    /// Schema server is accepting requests
    Serving,
}

impl Event {
    /// Returns the string representation of the event
    pub fn as_str(&self) -> &'static str {
        match self {
            Event::ConfigLoaded => "CONFIG_LOADED",
            Event::ConfigWarning => "CONFIG_WARNING",
            Event::SchemasLoaded => "SCHEMAS_LOADED",
            Event::SchemaPublished => "SCHEMA_PUBLISHED",
            Event::MetadataBuilt => "METADATA_BUILT",
            Event::SettingIgnored => "SETTING_IGNORED",
            Event::ValidationPassed => "VALIDATION_PASSED",
            Event::ValidationFailed => "VALIDATION_FAILED",
            Event::CaseMetadataCreated => "CASE_METADATA_CREATED",
            Event::CaseMetadataExists => "CASE_METADATA_EXISTS",
            Event::AggregationBuilt => "AGGREGATION_BUILT",
            Event::ExportRolledBack => "EXPORT_ROLLED_BACK",
            Event::ManifestUpdateFailed => "MANIFEST_UPDATE_FAILED",
            Event::Serving => "SCHEMA_SERVER_SERVING",
        }
    }

    /// Severity the event is logged at
    pub fn severity(&self) -> Severity {
        match self {
            Event::ConfigWarning
            | Event::SettingIgnored
            | Event::CaseMetadataExists
            | Event::ManifestUpdateFailed => Severity::Warn,
            Event::ValidationFailed | Event::ExportRolledBack => Severity::Error,
            Event::MetadataBuilt | Event::ValidationPassed => Severity::Trace,
            _ => Severity::Info,
        }
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
