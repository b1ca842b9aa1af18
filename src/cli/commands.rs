//! CLI command implementations
//!
//! Every command reports through JSON lines on stdout. A command that
//! fails returns a [`CliError`]; [`run`] writes it as the final line.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde_json::{json, Value};

use crate::builder::{current_user, CaseMetadataBuilder};
use crate::config::GlobalConfiguration;
use crate::export::{Exporter, LocalBackend};
use crate::metadata::{read_value, MetaFormat};
use crate::schema::{SchemaRegistry, SchemaValidator};
use crate::server::{SchemaServer, ServerConfig};

use super::args::{Cli, Command, SchemasAction};
use super::errors::{CliError, CliResult};
use super::io::{write_error, write_response};

/// Parse arguments, run the command and report a failure on stdout
pub fn run() -> CliResult<()> {
    let cli = Cli::parse_args();
    run_command(cli.command).map_err(|e| {
        // The error line is best effort; the exit code already says it failed.
        let _ = write_error(e.code_str(), e.message());
        e
    })
}

/// Run the appropriate command based on CLI args
pub fn run_command(cmd: Command) -> CliResult<()> {
    match cmd {
        Command::Validate { files, schema_dir } => validate(&files, schema_dir.as_deref()),
        Command::CreateCase {
            config,
            caseroot,
            casename,
            user,
            description,
        } => create_case(&config, &caseroot, &casename, user, description),
        Command::Schemas { action } => match action {
            SchemasAction::List { schema_dir } => list_schemas(schema_dir.as_deref()),
            SchemasAction::Publish { out, schema_dir } => {
                publish_schemas(&out, schema_dir.as_deref())
            }
        },
        Command::Serve {
            host,
            port,
            schema_dir,
        } => serve(ServerConfig {
            host,
            port,
            cors_origins: Vec::new(),
            schema_dir,
        }),
    }
}

/// Built-in schemas plus any found under `schema_dir`
pub fn load_registry(schema_dir: Option<&Path>) -> CliResult<SchemaRegistry> {
    let mut registry = SchemaRegistry::with_published()?;
    if let Some(dir) = schema_dir {
        registry.load_dir(dir)?;
    }
    Ok(registry)
}

/// Validate metadata files, one output line per file.
///
/// Every file is checked; the command fails if any of them is invalid or
/// unreadable.
pub fn validate(files: &[PathBuf], schema_dir: Option<&Path>) -> CliResult<()> {
    let registry = load_registry(schema_dir)?;
    let validator = SchemaValidator::new(&registry);

    let mut failed = 0;
    for file in files {
        match validate_file(&validator, file) {
            Ok(result) => {
                if result["valid"] != Value::Bool(true) {
                    failed += 1;
                }
                write_response(result)?;
            }
            Err(e) => {
                failed += 1;
                write_error(e.code_str(), &format!("{}: {}", file.display(), e.message()))?;
            }
        }
    }

    if failed > 0 {
        return Err(CliError::validation_failed(format!(
            "{} of {} file(s) failed validation",
            failed,
            files.len()
        )));
    }
    Ok(())
}

fn validate_file(validator: &SchemaValidator<'_>, file: &Path) -> CliResult<Value> {
    let raw = fs::read_to_string(file)
        .map_err(|e| CliError::io_error(format!("cannot read '{}': {}", file.display(), e)))?;
    let document = read_value(&raw, MetaFormat::from_path(file))?;
    let report = validator.validate_value(&document)?;

    Ok(json!({
        "file": file.display().to_string(),
        "valid": report.is_valid(),
        "schema_id": report.schema_id,
        "version": report.version,
        "violations": report.violations,
    }))
}

/// Write `share/metadata/fmu_case.yml` under the case root
pub fn create_case(
    config_path: &Path,
    caseroot: &Path,
    casename: &str,
    user: Option<String>,
    description: Option<String>,
) -> CliResult<()> {
    let config = GlobalConfiguration::load(config_path)?;
    let caseroot = absolute(caseroot)?;
    let user = user.unwrap_or_else(current_user);

    let builder = CaseMetadataBuilder::new(&config, &caseroot, casename, user)?
        .with_description(description.into_iter().collect());
    let registry = Arc::new(SchemaRegistry::with_published()?);
    let exporter = Exporter::new(LocalBackend::new(&caseroot), registry);
    let result = exporter.export_case(&builder)?;

    write_response(json!({
        "path": caseroot.join(&result.relative_path).display().to_string(),
        "case_uuid": result.document.fmu.case.uuid.to_string(),
        "created": result.created,
    }))
}

pub fn list_schemas(schema_dir: Option<&Path>) -> CliResult<()> {
    let registry = load_registry(schema_dir)?;
    let schemas: Vec<Value> = registry
        .all()
        .map(|schema| {
            json!({
                "category": schema.key.category,
                "version": schema.key.version,
                "name": schema.key.name,
                "id": schema.id(),
                "digest": schema.digest,
            })
        })
        .collect();
    write_response(Value::Array(schemas))
}

/// Write the registry as static files. Existing identical files are kept;
/// a differing file on disk is FMU_SCHEMA_IMMUTABLE.
pub fn publish_schemas(out: &Path, schema_dir: Option<&Path>) -> CliResult<()> {
    let registry = load_registry(schema_dir)?;
    let written = registry.publish_to(out)?;
    write_response(json!({
        "out": out.display().to_string(),
        "written": written,
        "total": registry.len(),
    }))
}

/// Run the schema server on a fresh tokio runtime until it stops
pub fn serve(config: ServerConfig) -> CliResult<()> {
    let registry = Arc::new(load_registry(config.schema_dir.as_deref())?);
    let runtime = tokio::runtime::Runtime::new()
        .map_err(|e| CliError::serve_failed(format!("cannot start runtime: {}", e)))?;

    runtime
        .block_on(SchemaServer::with_config(registry, config).start())
        .map_err(|e| CliError::serve_failed(e.to_string()))
}

fn absolute(path: &Path) -> CliResult<PathBuf> {
    if path.is_absolute() {
        return Ok(path.to_path_buf());
    }
    Ok(env::current_dir()?.join(path))
}
