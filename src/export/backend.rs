//! # Storage Backend Trait
//!
//! Backends are keyed by paths relative to their root (the case root for
//! exports). Absolute keys and `..` are rejected.

use std::path::{Component, Path};

use super::errors::{StorageError, StorageResult};

/// Backend trait for export storage
pub trait StorageBackend: Send + Sync + std::fmt::Debug {
    /// Replace the object at `path` in one step; readers see either the old
    /// or the new bytes, never a mix.
    fn write_atomic(&self, path: &Path, data: &[u8]) -> StorageResult<()>;

    /// Like `write_atomic`, but fails with `ObjectAlreadyExists` when the
    /// object exists. The check and the write are one step: of concurrent
    /// callers exactly one succeeds.
    fn write_new(&self, path: &Path, data: &[u8]) -> StorageResult<()>;

    /// Read data from path
    fn read(&self, path: &Path) -> StorageResult<Vec<u8>>;

    /// Delete the object at path
    fn delete(&self, path: &Path) -> StorageResult<()>;

    /// Check if path exists
    fn exists(&self, path: &Path) -> StorageResult<bool>;

    /// Objects directly under `prefix`
    fn list(&self, prefix: &Path) -> StorageResult<Vec<String>>;
}

/// Rejects keys that would escape the backend root
pub fn check_key(path: &Path) -> StorageResult<()> {
    let escapes = path
        .components()
        .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir));
    if escapes || path.as_os_str().is_empty() {
        return Err(StorageError::InvalidPath(path.display().to_string()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_key() {
        assert!(check_key(Path::new("share/results/maps/a.gri")).is_ok());
        assert!(check_key(Path::new("/etc/passwd")).is_err());
        assert!(check_key(Path::new("share/../../x")).is_err());
        assert!(check_key(Path::new("")).is_err());
    }
}
