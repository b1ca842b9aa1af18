//! Export manifest
//!
//! `.dataio_export_manifest.json` in the runpath (or case root) lists every
//! file exported by the run, oldest first.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::backend::StorageBackend;
use super::errors::StorageError;
use crate::error::{DataioError, DataioResult};

pub const MANIFEST_FILENAME: &str = ".dataio_export_manifest.json";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManifestEntry {
    pub absolute_path: String,
    pub exported_at: DateTime<Utc>,
}

/// Manifest key for a run rooted at `run_root` (relative to the case root)
pub fn manifest_path(run_root: Option<&Path>) -> PathBuf {
    match run_root {
        Some(root) => root.join(MANIFEST_FILENAME),
        None => PathBuf::from(MANIFEST_FILENAME),
    }
}

/// Reads the manifest; a missing manifest is empty
pub fn read_manifest(backend: &dyn StorageBackend, path: &Path) -> DataioResult<Vec<ManifestEntry>> {
    match backend.read(path) {
        Ok(bytes) => serde_json::from_slice(&bytes).map_err(|e| {
            DataioError::Serialization(format!(
                "export manifest '{}' is not valid: {}",
                path.display(),
                e
            ))
        }),
        Err(StorageError::ObjectNotFound(_)) => Ok(Vec::new()),
        Err(e) => Err(e.into()),
    }
}

/// Appends one entry and rewrites the manifest atomically
pub fn append_entry(
    backend: &dyn StorageBackend,
    path: &Path,
    absolute_path: &str,
) -> DataioResult<ManifestEntry> {
    let mut entries = read_manifest(backend, path)?;
    let entry = ManifestEntry {
        absolute_path: absolute_path.to_string(),
        exported_at: Utc::now(),
    };
    entries.push(entry.clone());
    let bytes = serde_json::to_vec_pretty(&entries)?;
    backend.write_atomic(path, &bytes)?;
    Ok(entry)
}
