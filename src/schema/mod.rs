//! Schema registry and validation
//!
//! Published schema documents are versioned, immutable JSON Schemas.
//!
//! # Design Principles
//!
//! - One document per `(category, version, name)`
//! - Published content never changes; new content needs a new version
//! - A document is validated against the version it declares
//! - Validation collects every violation and never mutates the document

mod errors;
mod published;
mod registry;
mod types;
mod validator;
pub mod version;

pub use errors::{
    SchemaError, SchemaErrorCode, SchemaResult, Severity, Violation, ViolationKind,
};
pub use published::{
    field_outline_key, fmu_results_key, inplace_volumes_key, ACTIVE_VERSION, FILE_FORMATS,
    standard_result_key, FMU_RESULTS, SCHEMA_BASE_URL,
};
pub use registry::SchemaRegistry;
pub use types::{PublishedSchema, SchemaKey};
pub use validator::{SchemaValidator, ValidationReport};
pub use version::VersionBump;
