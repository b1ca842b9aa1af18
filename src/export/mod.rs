//! # Export
//!
//! Payload and sidecar writing through a [`StorageBackend`].
//!
//! - [`LocalBackend`]: files under a case root, temp file + fsync + rename
//! - [`MemoryBackend`]: in-process object store
//! - [`Exporter`]: validate, then write payload and sidecar, or nothing

mod backend;
mod errors;
mod exporter;
mod local;
pub mod manifest;
mod memory;

pub use backend::{check_key, StorageBackend};
pub use errors::{StorageError, StorageResult};
pub use exporter::{CaseExport, ExportReceipt, Exporter};
pub use local::LocalBackend;
pub use manifest::{ManifestEntry, MANIFEST_FILENAME};
pub use memory::MemoryBackend;
