//! Schema registry
//!
//! Holds every published schema document, compiled, keyed by
//! `(category, version, name)`.
//!
//! - Registering a key twice with the same bytes is a no-op
//! - Registering a key twice with different bytes is FMU_SCHEMA_IMMUTABLE
//! - A new version must bump enough relative to its neighbours
//! - The registry is read-only once shared

use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::Path;
use std::sync::OnceLock;

use regex::Regex;
use semver::Version;
use serde_json::Value;

use super::errors::{SchemaError, SchemaResult};
use super::published::{self, ACTIVE_VERSION, FMU_RESULTS};
use super::types::{PublishedSchema, SchemaKey};
use super::version::check_bump;
use crate::checksum::sha256_hex;
use crate::error::DataioResult;
use crate::export::{LocalBackend, StorageBackend};
use crate::observability::{log_event, Event};

fn is_valid_segment(segment: &str) -> bool {
    static PATTERN: OnceLock<Option<Regex>> = OnceLock::new();
    PATTERN
        .get_or_init(|| Regex::new(r"^[a-z0-9][a-z0-9_\-]*$").ok())
        .as_ref()
        .map_or(false, |re| re.is_match(segment))
}

/// In-memory registry of compiled schema documents.
#[derive(Debug, Default)]
pub struct SchemaRegistry {
    schemas: BTreeMap<SchemaKey, PublishedSchema>,
}

impl SchemaRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a registry holding the schemas compiled into the binary.
    pub fn with_published() -> SchemaResult<Self> {
        let mut registry = Self::new();
        for (key, content) in published::builtin() {
            registry.register(key, content)?;
        }
        log_event(
            Event::SchemasLoaded,
            &[("count", &registry.len().to_string()), ("source", "builtin")],
        );
        Ok(registry)
    }

    /// Loads `<dir>/<category>/<version>/<name>.json` files.
    ///
    /// Returns the number of documents that were not already registered.
    pub fn load_dir(&mut self, dir: &Path) -> SchemaResult<usize> {
        let mut found = Vec::new();
        for category in read_subdirs(dir)? {
            for version in read_subdirs(&category)? {
                let entries = fs::read_dir(&version).map_err(|e| {
                    SchemaError::malformed_schema(
                        version.display().to_string(),
                        format!("Failed to read schema directory: {}", e),
                    )
                })?;
                for entry in entries.flatten() {
                    let path = entry.path();
                    if path.extension().map_or(true, |ext| ext != "json") {
                        continue;
                    }
                    found.push(path);
                }
            }
        }
        found.sort();

        let mut added = 0;
        for path in found {
            let key = key_from_path(dir, &path)?;
            let content = fs::read_to_string(&path).map_err(|e| {
                SchemaError::malformed_schema(
                    path.display().to_string(),
                    format!("Failed to read file: {}", e),
                )
            })?;
            if self.register(key, &content)? {
                added += 1;
            }
        }

        log_event(
            Event::SchemasLoaded,
            &[
                ("added", &added.to_string()),
                ("source", &dir.display().to_string()),
            ],
        );
        Ok(added)
    }

    /// Registers a schema document under `key`.
    ///
    /// Returns `true` when the document is new and `false` when identical
    /// content was already registered.
    pub fn register(&mut self, key: SchemaKey, content: &str) -> SchemaResult<bool> {
        for segment in [&key.category, &key.name] {
            if !is_valid_segment(segment) {
                return Err(SchemaError::malformed_schema(
                    key.to_string(),
                    format!("'{}' is not a valid path segment", segment),
                ));
            }
        }
        let version = Version::parse(&key.version).map_err(|e| {
            SchemaError::malformed_schema(key.to_string(), format!("version is not semver: {}", e))
        })?;

        let digest = sha256_hex(content.as_bytes());
        if let Some(existing) = self.schemas.get(&key) {
            if existing.digest == digest {
                return Ok(false);
            }
            return Err(SchemaError::schema_immutable(
                format!("{}/{}", key.category, key.name),
                &key.version,
            ));
        }

        let document: Value = serde_json::from_str(content).map_err(|e| {
            SchemaError::malformed_schema(key.to_string(), format!("Invalid JSON: {}", e))
        })?;

        let declared_id = document.get("$id").and_then(Value::as_str);
        if declared_id != Some(key.id_url().as_str()) {
            return Err(SchemaError::malformed_schema(
                key.to_string(),
                format!("'$id' must be '{}'", key.id_url()),
            ));
        }
        let declared_version = document.get("version").and_then(Value::as_str);
        if declared_version != Some(key.version.as_str()) {
            return Err(SchemaError::malformed_schema(
                key.to_string(),
                format!("'version' must be '{}'", key.version),
            ));
        }

        let compiled = jsonschema::options()
            .should_validate_formats(true)
            .build(&document)
            .map_err(|e| SchemaError::malformed_schema(key.to_string(), e.to_string()))?;

        self.check_neighbours(&key, &version, &document)?;

        self.schemas.insert(
            key.clone(),
            PublishedSchema {
                key,
                document,
                content: content.to_owned(),
                digest,
                compiled,
            },
        );
        Ok(true)
    }

    fn check_neighbours(
        &self,
        key: &SchemaKey,
        version: &Version,
        document: &Value,
    ) -> SchemaResult<()> {
        let mut older: Option<(Version, &PublishedSchema)> = None;
        let mut newer: Option<(Version, &PublishedSchema)> = None;

        for schema in self.family(&key.category, &key.name) {
            let Some(other) = schema.semver() else {
                continue;
            };
            if other < *version && older.as_ref().map_or(true, |(v, _)| other > *v) {
                older = Some((other, schema));
            } else if other > *version && newer.as_ref().map_or(true, |(v, _)| other < *v) {
                newer = Some((other, schema));
            }
        }

        let family = format!("{}/{}", key.category, key.name);
        if let Some((_, prev)) = older {
            check_bump(&prev.document, document)
                .map_err(|reason| SchemaError::version_bump(&family, &key.version, reason))?;
        }
        if let Some((_, next)) = newer {
            check_bump(document, &next.document)
                .map_err(|reason| SchemaError::version_bump(&family, &next.key.version, reason))?;
        }
        Ok(())
    }

    fn family<'a>(
        &'a self,
        category: &'a str,
        name: &'a str,
    ) -> impl Iterator<Item = &'a PublishedSchema> + 'a {
        self.schemas
            .values()
            .filter(move |s| s.key.category == category && s.key.name == name)
    }

    /// Gets a schema by key.
    pub fn get(&self, key: &SchemaKey) -> Option<&PublishedSchema> {
        self.schemas.get(key)
    }

    /// Gets a schema by its key, distinguishing unknown schema and
    /// unknown version.
    pub fn require(&self, key: &SchemaKey) -> SchemaResult<&PublishedSchema> {
        if let Some(schema) = self.schemas.get(key) {
            return Ok(schema);
        }
        let family = format!("{}/{}", key.category, key.name);
        if self.family(&key.category, &key.name).next().is_some() {
            Err(SchemaError::unknown_version(family, &key.version))
        } else {
            Err(SchemaError::unknown_schema(family))
        }
    }

    /// Gets a schema by its `$id` URL.
    pub fn get_by_id(&self, id: &str) -> Option<&PublishedSchema> {
        self.schemas.values().find(|s| s.id() == id)
    }

    /// Gets the metadata schema for a declared document version.
    pub fn fmu_results(&self, version: &str) -> SchemaResult<&PublishedSchema> {
        self.require(&published::fmu_results_key(version))
    }

    /// Gets the metadata schema new documents are built against.
    pub fn active(&self) -> SchemaResult<&PublishedSchema> {
        self.fmu_results(ACTIVE_VERSION)
    }

    /// Gets the single document of `category` at `version`.
    pub fn resolve(&self, category: &str, version: &str) -> Option<&PublishedSchema> {
        self.schemas
            .values()
            .find(|s| s.key.category == category && s.key.version == version)
    }

    /// Gets the highest version published in `category`.
    pub fn latest(&self, category: &str) -> Option<&PublishedSchema> {
        self.schemas
            .values()
            .filter(|s| s.key.category == category)
            .filter_map(|s| s.semver().map(|v| (v, s)))
            .max_by(|(a, _), (b, _)| a.cmp(b))
            .map(|(_, s)| s)
    }

    /// Returns whether a key is registered.
    pub fn exists(&self, key: &SchemaKey) -> bool {
        self.schemas.contains_key(key)
    }

    /// All registered keys in sorted order.
    pub fn keys(&self) -> impl Iterator<Item = &SchemaKey> {
        self.schemas.keys()
    }

    /// All registered documents in key order.
    pub fn all(&self) -> impl Iterator<Item = &PublishedSchema> {
        self.schemas.values()
    }

    /// Distinct categories.
    pub fn categories(&self) -> BTreeSet<&str> {
        self.schemas.keys().map(|k| k.category.as_str()).collect()
    }

    /// Versions published in `category`, oldest first.
    pub fn versions(&self, category: &str) -> Vec<&str> {
        let mut versions: Vec<&str> = self
            .schemas
            .keys()
            .filter(|k| k.category == category)
            .map(|k| k.version.as_str())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();
        versions.sort_by_key(|v| Version::parse(v).ok());
        versions
    }

    /// Documents published in `category` at `version`.
    pub fn documents(&self, category: &str, version: &str) -> Vec<&PublishedSchema> {
        self.schemas
            .values()
            .filter(|s| s.key.category == category && s.key.version == version)
            .collect()
    }

    /// Number of registered documents.
    pub fn len(&self) -> usize {
        self.schemas.len()
    }

    /// Returns whether the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.schemas.is_empty()
    }

    /// Writes every document to `<dir>/<category>/<version>/<name>.json`.
    ///
    /// Identical files are left alone; a differing file already on disk is
    /// FMU_SCHEMA_IMMUTABLE. Returns the number of files written.
    pub fn publish_to(&self, dir: &Path) -> DataioResult<usize> {
        let backend = LocalBackend::new(dir);
        let mut written = 0;

        for schema in self.schemas.values() {
            let path = schema.key.relative_path();
            if backend.exists(&path)? {
                let on_disk = backend.read(&path)?;
                if on_disk == schema.content.as_bytes() {
                    continue;
                }
                return Err(SchemaError::schema_immutable(
                    format!("{}/{}", schema.key.category, schema.key.name),
                    &schema.key.version,
                )
                .into());
            }
            backend.write_atomic(&path, schema.content.as_bytes())?;
            written += 1;
            log_event(
                Event::SchemaPublished,
                &[
                    ("digest", &schema.digest),
                    ("path", &path.display().to_string()),
                ],
            );
        }
        Ok(written)
    }
}

fn read_subdirs(dir: &Path) -> SchemaResult<Vec<std::path::PathBuf>> {
    let entries = fs::read_dir(dir).map_err(|e| {
        SchemaError::malformed_schema(
            dir.display().to_string(),
            format!("Failed to read schema directory: {}", e),
        )
    })?;
    let mut dirs: Vec<_> = entries
        .flatten()
        .map(|e| e.path())
        .filter(|p| p.is_dir())
        .collect();
    dirs.sort();
    Ok(dirs)
}

fn key_from_path(root: &Path, path: &Path) -> SchemaResult<SchemaKey> {
    let malformed = || {
        SchemaError::malformed_schema(
            path.display().to_string(),
            "expected <category>/<version>/<name>.json",
        )
    };
    let relative = path.strip_prefix(root).map_err(|_| malformed())?;
    let parts: Vec<&str> = relative
        .iter()
        .map(|p| p.to_str())
        .collect::<Option<_>>()
        .ok_or_else(malformed)?;
    match parts.as_slice() {
        [category, version, file] => {
            let name = file.strip_suffix(".json").ok_or_else(malformed)?;
            Ok(SchemaKey::new(*category, *version, name))
        }
        _ => Err(malformed()),
    }
}

impl SchemaRegistry {
    /// Convenience for the metadata category.
    pub fn fmu_results_versions(&self) -> Vec<&str> {
        self.versions(FMU_RESULTS)
    }
}
