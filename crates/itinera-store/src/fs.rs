//! Filesystem-backed snapshot store.

use std::fs;
use std::io::ErrorKind;
use std::path::Path;

use tracing::{debug, info};

use crate::config::StoreConfig;
use crate::{SnapshotStore, StoreError, validate_key};

/// Stores each snapshot as `<dir>/<key>.json`.
///
/// Writes go to a sibling `.tmp` file first and are renamed into place, so a
/// reader never observes a half-written snapshot.
#[derive(Debug, Clone)]
pub struct FileStore {
    config: StoreConfig,
}

impl FileStore {
    /// Open a store rooted at `config.dir`, creating the directory if needed.
    pub fn open(config: StoreConfig) -> Result<Self, StoreError> {
        fs::create_dir_all(&config.dir).map_err(|source| StoreError::Io {
            path: config.dir.clone(),
            source,
        })?;
        info!(dir = %config.dir.display(), "snapshot store opened");
        Ok(Self { config })
    }

    pub fn dir(&self) -> &Path {
        self.config.dir()
    }
}

impl SnapshotStore for FileStore {
    fn put(&self, key: &str, contents: &str) -> Result<(), StoreError> {
        validate_key(key)?;
        let path = self.config.snapshot_path(key);
        let tmp = path.with_extension("json.tmp");

        fs::write(&tmp, contents).map_err(|source| StoreError::Io {
            path: tmp.clone(),
            source,
        })?;
        fs::rename(&tmp, &path).map_err(|source| StoreError::Io {
            path: path.clone(),
            source,
        })?;

        debug!(key, bytes = contents.len(), "snapshot written");
        Ok(())
    }

    fn get(&self, key: &str) -> Result<String, StoreError> {
        validate_key(key)?;
        let path = self.config.snapshot_path(key);
        match fs::read_to_string(&path) {
            Ok(contents) => Ok(contents),
            Err(e) if e.kind() == ErrorKind::NotFound => Err(StoreError::NotFound(key.to_owned())),
            Err(source) => Err(StoreError::Io { path, source }),
        }
    }

    fn remove(&self, key: &str) -> Result<bool, StoreError> {
        validate_key(key)?;
        let path = self.config.snapshot_path(key);
        match fs::remove_file(&path) {
            Ok(()) => {
                debug!(key, "snapshot removed");
                Ok(true)
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(source) => Err(StoreError::Io { path, source }),
        }
    }

    fn keys(&self) -> Result<Vec<String>, StoreError> {
        let dir = self.config.dir();
        let entries = fs::read_dir(dir).map_err(|source| StoreError::Io {
            path: dir.to_path_buf(),
            source,
        })?;

        let mut keys = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|source| StoreError::Io {
                path: dir.to_path_buf(),
                source,
            })?;
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            match path.file_stem().and_then(|s| s.to_str()) {
                Some(stem) if validate_key(stem).is_ok() => keys.push(stem.to_owned()),
                _ => {}
            }
        }
        keys.sort();
        Ok(keys)
    }
}
