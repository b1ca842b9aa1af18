//! Metadata document validation
//!
//! - The schema is selected by the document's own `version`
//! - Every violation is collected, none short-circuits
//! - Class, stage and populated context blocks are cross-checked natively
//! - The document is never mutated

use std::fmt;

use jsonschema::error::ValidationErrorKind;
use serde::Serialize;
use serde_json::Value;

use super::errors::{SchemaError, SchemaResult, Violation, ViolationKind};
use super::registry::SchemaRegistry;
use super::types::{PublishedSchema, SchemaKey};
use crate::error::{DataioError, DataioResult};
use crate::metadata::MetadataDocument;
use crate::observability::{log_event, Event};

const CONTEXT_CLASSES: [&str; 3] = ["case", "ensemble", "realization"];

/// Outcome of validating one document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationReport {
    pub schema_id: String,
    pub version: String,
    pub violations: Vec<Violation>,
}

impl ValidationReport {
    pub fn is_valid(&self) -> bool {
        self.violations.is_empty()
    }

    /// Violations of one kind.
    pub fn of_kind(&self, kind: ViolationKind) -> impl Iterator<Item = &Violation> {
        self.violations.iter().filter(move |v| v.kind == kind)
    }

    /// Whether a violation of `kind` was reported at `path`.
    pub fn has(&self, kind: ViolationKind, path: &str) -> bool {
        self.violations
            .iter()
            .any(|v| v.kind == kind && v.path == path)
    }

    /// Turns a failed report into [`DataioError::Validation`].
    pub fn into_result(self) -> DataioResult<Self> {
        if self.is_valid() {
            Ok(self)
        } else {
            Err(DataioError::Validation(self))
        }
    }
}

impl fmt::Display for ValidationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_valid() {
            return write!(f, "valid against {}", self.schema_id);
        }
        write!(
            f,
            "{} violation(s) against {}",
            self.violations.len(),
            self.schema_id
        )?;
        for violation in &self.violations {
            write!(f, "; {}", violation)?;
        }
        Ok(())
    }
}

/// Validates documents against the schemas held by a registry.
pub struct SchemaValidator<'a> {
    registry: &'a SchemaRegistry,
}

impl<'a> SchemaValidator<'a> {
    pub fn new(registry: &'a SchemaRegistry) -> Self {
        Self { registry }
    }

    /// Validates a metadata document given as JSON.
    ///
    /// # Errors
    ///
    /// - FMU_SCHEMA_REQUIRED when the document declares no `version`
    /// - FMU_UNKNOWN_SCHEMA_VERSION when that version is not published
    ///
    /// Schema violations are not errors; they are returned in the report.
    pub fn validate_value(&self, document: &Value) -> SchemaResult<ValidationReport> {
        let version = document
            .get("version")
            .and_then(Value::as_str)
            .ok_or_else(SchemaError::schema_required)?;
        let schema = self.registry.fmu_results(version)?;

        let mut violations = collect_violations(schema, document);

        if let Some(declared) = document.get("$schema").and_then(Value::as_str) {
            if declared != schema.id() {
                violations.push(Violation::new(
                    "/$schema",
                    "",
                    ViolationKind::ConstantMismatch,
                    format!("'{}' does not match '{}'", declared, schema.id()),
                ));
            }
        }
        violations.extend(context_violations(document));

        let report = ValidationReport {
            schema_id: schema.id().to_owned(),
            version: version.to_owned(),
            violations,
        };

        let class = document.get("class").and_then(Value::as_str).unwrap_or("");
        if report.is_valid() {
            log_event(
                Event::ValidationPassed,
                &[("class", class), ("version", version)],
            );
        } else {
            log_event(
                Event::ValidationFailed,
                &[
                    ("class", class),
                    ("version", version),
                    ("violations", &report.violations.len().to_string()),
                ],
            );
        }
        Ok(report)
    }

    /// Validates a typed metadata document.
    pub fn validate_document(&self, document: &MetadataDocument) -> DataioResult<ValidationReport> {
        let value = document.to_json_value()?;
        Ok(self.validate_value(&value)?)
    }

    /// Validates payload content against a file-format schema.
    pub fn validate_payload(&self, key: &SchemaKey, payload: &Value) -> SchemaResult<ValidationReport> {
        let schema = self.registry.require(key)?;
        Ok(ValidationReport {
            schema_id: schema.id().to_owned(),
            version: key.version.clone(),
            violations: collect_violations(schema, payload),
        })
    }
}

fn collect_violations(schema: &PublishedSchema, instance: &Value) -> Vec<Violation> {
    schema
        .compiled
        .iter_errors(instance)
        .map(|error| {
            let kind = match &error.kind {
                ValidationErrorKind::Required { .. } => ViolationKind::MissingField,
                ValidationErrorKind::Enum { .. } => ViolationKind::EnumMismatch,
                ValidationErrorKind::Type { .. } => ViolationKind::TypeMismatch,
                ValidationErrorKind::Constant { .. } => ViolationKind::ConstantMismatch,
                ValidationErrorKind::Format { .. } => ViolationKind::Format,
                ValidationErrorKind::Pattern { .. } => ViolationKind::Pattern,
                _ => ViolationKind::Other,
            };
            Violation::new(
                error.instance_path.to_string(),
                error.schema_path.to_string(),
                kind,
                error.to_string(),
            )
        })
        .collect()
}

fn is_present(parent: Option<&Value>, key: &str) -> bool {
    parent
        .and_then(|p| p.get(key))
        .map_or(false, |v| !v.is_null())
}

/// Cross-checks class, `fmu.context.stage` and the populated `fmu` blocks.
fn context_violations(document: &Value) -> Vec<Violation> {
    let mut violations = Vec::new();
    let Some(fmu) = document.get("fmu") else {
        return violations;
    };

    let has_ensemble = is_present(Some(fmu), "ensemble") || is_present(Some(fmu), "iteration");
    let has_realization = is_present(Some(fmu), "realization");
    let has_aggregation = is_present(Some(fmu), "aggregation");

    if has_realization && has_aggregation {
        violations.push(Violation::context_mismatch(
            "/fmu",
            "'realization' and 'aggregation' cannot both be present",
        ));
    }
    if has_realization && !has_ensemble {
        violations.push(Violation::context_mismatch(
            "/fmu",
            "'realization' requires an 'ensemble' block",
        ));
    }

    let expected = if has_realization {
        "realization"
    } else if has_ensemble {
        "ensemble"
    } else {
        "case"
    };

    let stage = fmu
        .pointer("/context/stage")
        .and_then(Value::as_str)
        .map(|s| if s == "iteration" { "ensemble" } else { s });

    if let Some(stage) = stage {
        if stage != expected {
            violations.push(Violation::context_mismatch(
                "/fmu/context/stage",
                format!(
                    "stage '{}' does not match populated blocks, expected '{}'",
                    stage, expected
                ),
            ));
        }
    }

    let Some(class) = document.get("class").and_then(Value::as_str) else {
        return violations;
    };
    if CONTEXT_CLASSES.contains(&class) {
        if let Some(stage) = stage {
            if stage != class {
                violations.push(Violation::context_mismatch(
                    "/class",
                    format!("class '{}' requires stage '{}', got '{}'", class, class, stage),
                ));
            }
        }
        for block in ["file", "data"] {
            if is_present(Some(document), block) {
                violations.push(Violation::context_mismatch(
                    format!("/{}", block),
                    format!("class '{}' cannot carry a '{}' block", class, block),
                ));
            }
        }
    }
    violations
}
