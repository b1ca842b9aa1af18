//! # In-Memory Backend
//!
//! Stands in for a remote object store: whole objects in, whole objects
//! out, keyed by path.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::RwLock;

use super::backend::{check_key, StorageBackend};
use super::errors::{StorageError, StorageResult};

#[derive(Debug, Default)]
pub struct MemoryBackend {
    objects: RwLock<BTreeMap<PathBuf, Vec<u8>>>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every stored key, sorted
    pub fn keys(&self) -> Vec<PathBuf> {
        self.objects
            .read()
            .map(|objects| objects.keys().cloned().collect())
            .unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.objects.read().map(|o| o.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn poisoned() -> StorageError {
    StorageError::IoError("memory backend lock poisoned".to_string())
}

impl StorageBackend for MemoryBackend {
    fn write_atomic(&self, path: &Path, data: &[u8]) -> StorageResult<()> {
        check_key(path)?;
        let mut objects = self.objects.write().map_err(|_| poisoned())?;
        objects.insert(path.to_path_buf(), data.to_vec());
        Ok(())
    }

    fn write_new(&self, path: &Path, data: &[u8]) -> StorageResult<()> {
        check_key(path)?;
        let mut objects = self.objects.write().map_err(|_| poisoned())?;
        if objects.contains_key(path) {
            return Err(StorageError::ObjectAlreadyExists(path.display().to_string()));
        }
        objects.insert(path.to_path_buf(), data.to_vec());
        Ok(())
    }

    fn read(&self, path: &Path) -> StorageResult<Vec<u8>> {
        check_key(path)?;
        let objects = self.objects.read().map_err(|_| poisoned())?;
        objects
            .get(path)
            .cloned()
            .ok_or_else(|| StorageError::ObjectNotFound(path.display().to_string()))
    }

    fn delete(&self, path: &Path) -> StorageResult<()> {
        check_key(path)?;
        let mut objects = self.objects.write().map_err(|_| poisoned())?;
        objects
            .remove(path)
            .map(|_| ())
            .ok_or_else(|| StorageError::ObjectNotFound(path.display().to_string()))
    }

    fn exists(&self, path: &Path) -> StorageResult<bool> {
        check_key(path)?;
        let objects = self.objects.read().map_err(|_| poisoned())?;
        Ok(objects.contains_key(path))
    }

    fn list(&self, prefix: &Path) -> StorageResult<Vec<String>> {
        let objects = self.objects.read().map_err(|_| poisoned())?;
        Ok(objects
            .keys()
            .filter(|key| key.parent() == Some(prefix))
            .map(|key| key.display().to_string())
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_trip_and_delete() {
        let backend = MemoryBackend::new();
        let key = Path::new("share/results/tables/volumes.csv");
        backend.write_atomic(key, b"A,B\n").unwrap();
        assert_eq!(backend.read(key).unwrap(), b"A,B\n");
        assert_eq!(
            backend.list(Path::new("share/results/tables")).unwrap(),
            vec!["share/results/tables/volumes.csv".to_string()]
        );

        backend.delete(key).unwrap();
        assert!(backend.is_empty());
        assert!(matches!(backend.delete(key), Err(StorageError::ObjectNotFound(_))));
    }

    #[test]
    fn test_write_new() {
        let backend = MemoryBackend::new();
        let key = Path::new("a.txt");
        backend.write_new(key, b"1").unwrap();
        assert!(backend.write_new(key, b"2").is_err());
        assert_eq!(backend.read(key).unwrap(), b"1");
    }
}
