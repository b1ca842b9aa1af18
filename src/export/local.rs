//! # Local Filesystem Backend
//!
//! Writes go to a temporary file next to the target, are synced, then
//! renamed into place. `write_new` hard-links the temporary file instead,
//! so an existing target is never replaced even under concurrent writers.

use std::fs::{self, File};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use uuid::Uuid;

use super::backend::{check_key, StorageBackend};
use super::errors::{StorageError, StorageResult};

/// Local filesystem storage backend
#[derive(Debug, Clone)]
pub struct LocalBackend {
    root: PathBuf,
}

impl LocalBackend {
    /// Create a new local backend
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn full_path(&self, path: &Path) -> StorageResult<PathBuf> {
        check_key(path)?;
        Ok(self.root.join(path))
    }

    /// Target path and a unique temporary sibling, with the parent created
    fn staging_paths(&self, path: &Path) -> StorageResult<(PathBuf, PathBuf)> {
        let full_path = self.full_path(path)?;
        let parent = full_path
            .parent()
            .ok_or_else(|| StorageError::InvalidPath(path.display().to_string()))?;
        fs::create_dir_all(parent)?;

        let file_name = full_path
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| StorageError::InvalidPath(path.display().to_string()))?;
        let temp_path = parent.join(format!(".{}.tmp-{}", file_name, Uuid::new_v4().simple()));
        Ok((full_path, temp_path))
    }
}

fn write_synced(path: &Path, data: &[u8]) -> std::io::Result<()> {
    let mut file = File::create(path)?;
    file.write_all(data)?;
    file.sync_all()
}

fn not_found_or_io(path: &Path, err: std::io::Error) -> StorageError {
    if err.kind() == ErrorKind::NotFound {
        StorageError::ObjectNotFound(path.display().to_string())
    } else {
        StorageError::IoError(err.to_string())
    }
}

impl StorageBackend for LocalBackend {
    fn write_atomic(&self, path: &Path, data: &[u8]) -> StorageResult<()> {
        let (full_path, temp_path) = self.staging_paths(path)?;

        let written = (|| -> std::io::Result<()> {
            write_synced(&temp_path, data)?;
            fs::rename(&temp_path, &full_path)
        })();

        if let Err(err) = written {
            let _ = fs::remove_file(&temp_path);
            return Err(err.into());
        }
        Ok(())
    }

    fn write_new(&self, path: &Path, data: &[u8]) -> StorageResult<()> {
        let (full_path, temp_path) = self.staging_paths(path)?;

        let written = write_synced(&temp_path, data)
            .and_then(|()| fs::hard_link(&temp_path, &full_path));
        let _ = fs::remove_file(&temp_path);

        match written {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == ErrorKind::AlreadyExists => Err(
                StorageError::ObjectAlreadyExists(path.display().to_string()),
            ),
            Err(err) => Err(err.into()),
        }
    }

    fn read(&self, path: &Path) -> StorageResult<Vec<u8>> {
        let full_path = self.full_path(path)?;
        fs::read(&full_path).map_err(|e| not_found_or_io(path, e))
    }

    fn delete(&self, path: &Path) -> StorageResult<()> {
        let full_path = self.full_path(path)?;
        fs::remove_file(&full_path).map_err(|e| not_found_or_io(path, e))
    }

    fn exists(&self, path: &Path) -> StorageResult<bool> {
        Ok(self.full_path(path)?.exists())
    }

    fn list(&self, prefix: &Path) -> StorageResult<Vec<String>> {
        let full_path = if prefix.as_os_str().is_empty() {
            self.root.clone()
        } else {
            self.full_path(prefix)?
        };
        let mut results = Vec::new();

        if full_path.is_dir() {
            for entry in fs::read_dir(&full_path)?.flatten() {
                if let Some(name) = entry.file_name().to_str() {
                    results.push(prefix.join(name).display().to_string());
                }
            }
        }
        results.sort();
        Ok(results)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_write_read() {
        let temp = TempDir::new().unwrap();
        let backend = LocalBackend::new(temp.path());

        backend.write_atomic(Path::new("test.txt"), b"hello").unwrap();
        let data = backend.read(Path::new("test.txt")).unwrap();
        assert_eq!(data, b"hello");
    }

    #[test]
    fn test_nested_path_and_no_temp_left() {
        let temp = TempDir::new().unwrap();
        let backend = LocalBackend::new(temp.path());
        let key = Path::new("share/results/maps/a.gri");

        backend.write_atomic(key, b"nested").unwrap();
        backend.write_atomic(key, b"replaced").unwrap();
        assert_eq!(backend.read(key).unwrap(), b"replaced");
        assert_eq!(
            backend.list(Path::new("share/results/maps")).unwrap(),
            vec!["share/results/maps/a.gri".to_string()]
        );
    }

    #[test]
    fn test_write_new_refuses_existing() {
        let temp = TempDir::new().unwrap();
        let backend = LocalBackend::new(temp.path());
        let key = Path::new("share/metadata/fmu_case.yml");

        backend.write_new(key, b"first").unwrap();
        let err = backend.write_new(key, b"second").unwrap_err();
        assert!(matches!(err, StorageError::ObjectAlreadyExists(_)));
        assert_eq!(backend.read(key).unwrap(), b"first");
    }

    #[test]
    fn test_write_new_races_have_one_winner() {
        use std::sync::{Arc, Barrier};

        let temp = TempDir::new().unwrap();
        let backend = Arc::new(LocalBackend::new(temp.path()));
        let barrier = Arc::new(Barrier::new(8));
        let key = Path::new("share/metadata/fmu_case.yml");

        let handles: Vec<_> = (0..8u8)
            .map(|i| {
                let backend = Arc::clone(&backend);
                let barrier = Arc::clone(&barrier);
                std::thread::spawn(move || {
                    barrier.wait();
                    backend.write_new(key, &[i]).is_ok()
                })
            })
            .collect();
        let winners = handles
            .into_iter()
            .map(|h| h.join().unwrap())
            .filter(|won| *won)
            .count();
        assert_eq!(winners, 1);

        assert_eq!(backend.read(key).unwrap().len(), 1);
        assert_eq!(
            backend.list(Path::new("share/metadata")).unwrap(),
            vec!["share/metadata/fmu_case.yml".to_string()]
        );
    }

    #[test]
    fn test_delete() {
        let temp = TempDir::new().unwrap();
        let backend = LocalBackend::new(temp.path());
        let key = Path::new("delete-me.txt");

        backend.write_atomic(key, b"bye").unwrap();
        assert!(backend.exists(key).unwrap());

        backend.delete(key).unwrap();
        assert!(!backend.exists(key).unwrap());
    }

    #[test]
    fn test_not_found() {
        let temp = TempDir::new().unwrap();
        let backend = LocalBackend::new(temp.path());

        let result = backend.read(Path::new("nonexistent.txt"));
        assert!(matches!(result, Err(StorageError::ObjectNotFound(_))));
    }

    #[test]
    fn test_escaping_key_rejected() {
        let temp = TempDir::new().unwrap();
        let backend = LocalBackend::new(temp.path().join("case"));
        let result = backend.write_atomic(Path::new("../outside.txt"), b"x");
        assert!(matches!(result, Err(StorageError::InvalidPath(_))));
    }
}
