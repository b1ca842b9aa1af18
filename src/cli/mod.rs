//! Command line interface
//!
//! - validate: check metadata files against their declared schema
//! - create-case: write case metadata under a case root
//! - schemas: list or publish the registry
//! - serve: run the schema server

mod args;
mod commands;
mod errors;
mod io;

pub use args::{Cli, Command, SchemasAction};
pub use commands::{
    create_case, list_schemas, load_registry, publish_schemas, run, run_command, serve, validate,
};
pub use errors::{CliError, CliErrorCode, CliResult};
pub use io::{write_error, write_response};
