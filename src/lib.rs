//! fmu-dataio - schema-validated metadata for FMU data exports
//!
//! Every exported data file gets a sidecar metadata document describing
//! what it is, where it came from and who may see it. Documents are
//! validated against versioned, immutable JSON Schemas before anything is
//! written.
//!
//! - [`schema`]: registry and validation of published schemas
//! - [`metadata`]: the typed document model
//! - [`builder`]: assembles documents from configuration and run context
//! - [`export`]: atomic payload + sidecar writes
//! - [`server`]: HTTP schema server

pub mod builder;
pub mod checksum;
pub mod cli;
pub mod config;
pub mod context;
pub mod error;
pub mod export;
pub mod metadata;
pub mod objects;
pub mod observability;
pub mod schema;
pub mod server;

pub use error::{DataioError, DataioResult, ErrorKind};
