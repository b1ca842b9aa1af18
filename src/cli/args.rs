//! CLI argument definitions using clap
//!
//! Commands:
//! - fmu-dataio validate <files...> [--schema-dir <dir>]
//! - fmu-dataio create-case --config <file> --caseroot <dir> --casename <name>
//! - fmu-dataio schemas list | publish --out <dir>
//! - fmu-dataio serve [--host <host>] [--port <port>]

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// fmu-dataio - schema-validated metadata for FMU data exports
#[derive(Parser, Debug)]
#[command(name = "fmu-dataio")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Validate metadata files (YAML or JSON) against their declared schema version
    Validate {
        /// Metadata files to validate
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// Directory with additional published schemas
        #[arg(long)]
        schema_dir: Option<PathBuf>,
    },

    /// Write case metadata for a new FMU case
    CreateCase {
        /// Path to the global configuration (YAML)
        #[arg(long)]
        config: PathBuf,

        /// Case root directory
        #[arg(long)]
        caseroot: PathBuf,

        /// Case name
        #[arg(long)]
        casename: String,

        /// User id recorded on the case (default: current user)
        #[arg(long)]
        user: Option<String>,

        /// Free-text case description
        #[arg(long)]
        description: Option<String>,
    },

    /// Inspect or publish the schema registry
    Schemas {
        #[command(subcommand)]
        action: SchemasAction,
    },

    /// Run the schema server
    Serve {
        /// Host to bind to
        #[arg(long, default_value = "0.0.0.0")]
        host: String,

        /// Port to bind to
        #[arg(long, default_value_t = 8080)]
        port: u16,

        /// Directory with additional published schemas
        #[arg(long)]
        schema_dir: Option<PathBuf>,
    },
}

#[derive(Subcommand, Debug)]
pub enum SchemasAction {
    /// List every registered schema document
    List {
        #[arg(long)]
        schema_dir: Option<PathBuf>,
    },

    /// Write the registry as static files under <out>/<category>/<version>/
    Publish {
        /// Output directory
        #[arg(long)]
        out: PathBuf,

        #[arg(long)]
        schema_dir: Option<PathBuf>,
    },
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_validate() {
        let cli = Cli::try_parse_from(["fmu-dataio", "validate", "a.yml", "b.json"]).unwrap();
        match cli.command {
            Command::Validate { files, schema_dir } => {
                assert_eq!(files.len(), 2);
                assert!(schema_dir.is_none());
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_validate_needs_files() {
        assert!(Cli::try_parse_from(["fmu-dataio", "validate"]).is_err());
    }

    #[test]
    fn test_parse_serve_defaults() {
        let cli = Cli::try_parse_from(["fmu-dataio", "serve"]).unwrap();
        match cli.command {
            Command::Serve { host, port, .. } => {
                assert_eq!(host, "0.0.0.0");
                assert_eq!(port, 8080);
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_parse_schemas_publish() {
        let cli =
            Cli::try_parse_from(["fmu-dataio", "schemas", "publish", "--out", "/tmp/s"]).unwrap();
        assert!(matches!(
            cli.command,
            Command::Schemas {
                action: SchemasAction::Publish { .. }
            }
        ));
    }

    #[test]
    fn test_create_case_requires_casename() {
        let result = Cli::try_parse_from([
            "fmu-dataio",
            "create-case",
            "--config",
            "global_variables.yml",
            "--caseroot",
            "/scratch/field/snakeoil",
        ]);
        assert!(result.is_err());
    }
}
