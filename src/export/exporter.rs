//! Atomic export of payload + sidecar metadata
//!
//! Order of an export:
//! 1. encode the payload
//! 2. build metadata from the payload bytes
//! 3. validate file-format payloads (field outlines, standard results)
//! 4. validate the metadata
//! 5. write the payload atomically, keeping any payload it replaces
//! 6. write the sidecar atomically; on failure the replaced payload is
//!    put back, or the new one deleted when there was none
//! 7. append to the export manifest (failure only logged)
//!
//! Nothing is written before step 5. A failed export leaves the previous
//! payload and sidecar pair as it was.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use super::backend::StorageBackend;
use super::errors::StorageError;
use super::manifest::{append_entry, manifest_path};
use crate::builder::{AggregationBuilder, CaseMetadataBuilder, MetadataBuilder};
use crate::error::{DataioError, DataioResult};
use crate::metadata::{sidecar_path, Content, MetaFormat, MetadataClass, MetadataDocument};
use crate::objects::DataObject;
use crate::observability::{log_event, Event, ObservationScope};
use crate::schema::{
    field_outline_key, standard_result_key, SchemaKey, SchemaRegistry, SchemaValidator,
    ValidationReport,
};

/// What an export wrote
#[derive(Debug, Clone)]
pub struct ExportReceipt {
    /// Payload key, relative to the backend root
    pub relative_path: PathBuf,
    /// Sidecar key, relative to the backend root
    pub metadata_path: PathBuf,
    pub absolute_path: Option<String>,
    pub document: MetadataDocument,
}

/// Outcome of writing case metadata
#[derive(Debug, Clone)]
pub struct CaseExport {
    pub relative_path: PathBuf,
    pub document: MetadataDocument,
    /// False when a case file was already present and left untouched
    pub created: bool,
}

/// Writes exports through a storage backend rooted at the case root
#[derive(Debug)]
pub struct Exporter<B: StorageBackend> {
    backend: B,
    registry: Arc<SchemaRegistry>,
    meta_format: MetaFormat,
}

impl<B: StorageBackend> Exporter<B> {
    pub fn new(backend: B, registry: Arc<SchemaRegistry>) -> Self {
        Self {
            backend,
            registry,
            meta_format: MetaFormat::default(),
        }
    }

    pub fn with_meta_format(mut self, format: MetaFormat) -> Self {
        self.meta_format = format;
        self
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn registry(&self) -> &SchemaRegistry {
        &self.registry
    }

    /// Exports one data object with its metadata
    pub fn export(
        &self,
        object: &dyn DataObject,
        builder: &MetadataBuilder<'_>,
    ) -> DataioResult<ExportReceipt> {
        let payload = object.to_payload()?;
        let document = builder.build(object, &payload)?;
        let run_root = builder.context().realization_prefix();
        let manifest = manifest_path(run_root.as_deref());
        self.write_export(object, &payload, document, Some(manifest))
    }

    /// Exports an aggregated object built from realization `sources`
    pub fn export_aggregation(
        &self,
        object: &dyn DataObject,
        builder: &AggregationBuilder,
        sources: &[MetadataDocument],
    ) -> DataioResult<ExportReceipt> {
        let payload = object.to_payload()?;
        let document = builder.build(sources, object, &payload)?;
        self.write_export(object, &payload, document, None)
    }

    /// Writes case metadata unless the case already has it
    pub fn export_case(&self, builder: &CaseMetadataBuilder<'_>) -> DataioResult<CaseExport> {
        let relative_path = builder.relative_path();

        if self.backend.exists(&relative_path)? {
            return self.existing_case(relative_path);
        }

        let document = builder.build();
        self.validate(&document)?;
        let bytes = document.encode(MetaFormat::Yaml)?;
        match self.backend.write_new(&relative_path, &bytes) {
            Ok(()) => {}
            Err(StorageError::ObjectAlreadyExists(_)) => return self.existing_case(relative_path),
            Err(e) => return Err(e.into()),
        }

        log_event(
            Event::CaseMetadataCreated,
            &[
                ("case_uuid", &document.fmu.case.uuid.to_string()),
                ("path", &relative_path.display().to_string()),
            ],
        );
        Ok(CaseExport {
            relative_path,
            document,
            created: true,
        })
    }

    fn existing_case(&self, relative_path: PathBuf) -> DataioResult<CaseExport> {
        log_event(
            Event::CaseMetadataExists,
            &[("path", &relative_path.display().to_string())],
        );
        let document = MetadataDocument::decode(&self.backend.read(&relative_path)?, MetaFormat::Yaml)?;
        Ok(CaseExport {
            relative_path,
            document,
            created: false,
        })
    }

    /// Reads the sidecar metadata of the data file at `data_path`
    pub fn read_metadata(&self, data_path: &Path) -> DataioResult<MetadataDocument> {
        let path = sidecar_path(data_path, self.meta_format);
        let bytes = self.backend.read(&path)?;
        MetadataDocument::decode(&bytes, self.meta_format)
    }

    fn validate(&self, document: &MetadataDocument) -> DataioResult<ValidationReport> {
        SchemaValidator::new(&self.registry)
            .validate_document(document)?
            .into_result()
    }

    fn validate_payload(
        &self,
        object: &dyn DataObject,
        document: &MetadataDocument,
    ) -> DataioResult<()> {
        let Some(key) = payload_schema(document) else {
            return Ok(());
        };
        let rows = object.payload_rows().ok_or_else(|| {
            DataioError::invalid_input(format!("payload cannot be read as rows for {}", key))
        })?;
        SchemaValidator::new(&self.registry)
            .validate_payload(&key, &rows)?
            .into_result()?;
        Ok(())
    }

    /// Steps 3 to 7. `manifest` is given for exports made inside a run.
    fn write_export(
        &self,
        object: &dyn DataObject,
        payload: &[u8],
        document: MetadataDocument,
        manifest: Option<PathBuf>,
    ) -> DataioResult<ExportReceipt> {
        let file = document
            .file
            .as_ref()
            .ok_or_else(|| DataioError::invalid_input("metadata has no file block"))?;
        let relative_path = PathBuf::from(&file.relative_path);
        let absolute_path = file.absolute_path.clone();
        let metadata_path = sidecar_path(&relative_path, self.meta_format);
        let rel_display = relative_path.display().to_string();

        let scope = ObservationScope::with_fields(
            "EXPORT",
            &[("class", document.class.as_str()), ("path", &rel_display)],
        );

        if let Err(e) = self
            .validate_payload(object, &document)
            .and_then(|_| self.validate(&document).map(|_| ()))
        {
            scope.fail(&e.to_string());
            return Err(e);
        }

        let sidecar = match document.encode(self.meta_format) {
            Ok(bytes) => bytes,
            Err(e) => {
                scope.fail(&e.to_string());
                return Err(e);
            }
        };

        let replaced = match self.backend.read(&relative_path) {
            Ok(bytes) => Some(bytes),
            Err(StorageError::ObjectNotFound(_)) => None,
            Err(e) => {
                scope.fail(&e.to_string());
                return Err(e.into());
            }
        };

        if let Err(e) = self.backend.write_atomic(&relative_path, payload) {
            scope.fail(&e.to_string());
            return Err(e.into());
        }

        if let Err(e) = self.backend.write_atomic(&metadata_path, &sidecar) {
            let rollback = match replaced {
                Some(previous) => match self.backend.write_atomic(&relative_path, &previous) {
                    Ok(()) => "previous payload restored".to_string(),
                    Err(restore_err) => format!("payload restore failed: {}", restore_err),
                },
                None => match self.backend.delete(&relative_path) {
                    Ok(()) => "payload removed".to_string(),
                    Err(delete_err) => format!("payload removal failed: {}", delete_err),
                },
            };
            log_event(
                Event::ExportRolledBack,
                &[
                    ("path", &rel_display),
                    ("reason", &e.to_string()),
                    ("rollback", &rollback),
                ],
            );
            scope.fail(&e.to_string());
            return Err(e.into());
        }

        if let Some(manifest) = manifest {
            let entry_path = absolute_path.clone().unwrap_or_else(|| rel_display.clone());
            if let Err(e) = append_entry(&self.backend, &manifest, &entry_path) {
                log_event(
                    Event::ManifestUpdateFailed,
                    &[
                        ("manifest", &manifest.display().to_string()),
                        ("reason", &e.to_string()),
                    ],
                );
            }
        }

        scope.complete_with_fields(&[("bytes", &payload.len().to_string())]);
        Ok(ExportReceipt {
            relative_path,
            metadata_path,
            absolute_path,
            document,
        })
    }
}

/// File-format schema the payload of `document` must satisfy, if any
fn payload_schema(document: &MetadataDocument) -> Option<SchemaKey> {
    if let Some(standard) = &document.standard_result {
        return Some(standard_result_key(standard.name));
    }
    let content = document.data.as_ref().map(|d| d.content);
    if document.class == MetadataClass::Polygons && content == Some(Content::FieldOutline) {
        return Some(field_outline_key());
    }
    None
}
