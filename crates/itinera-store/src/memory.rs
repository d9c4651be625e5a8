//! In-memory snapshot store.

use std::cell::RefCell;
use std::collections::BTreeMap;

use crate::{SnapshotStore, StoreError, validate_key};

/// A [`SnapshotStore`] backed by a map. Not shareable across threads.
#[derive(Debug, Default)]
pub struct MemoryStore {
    snapshots: RefCell<BTreeMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.snapshots.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshots.borrow().is_empty()
    }
}

impl SnapshotStore for MemoryStore {
    fn put(&self, key: &str, contents: &str) -> Result<(), StoreError> {
        validate_key(key)?;
        self.snapshots
            .borrow_mut()
            .insert(key.to_owned(), contents.to_owned());
        Ok(())
    }

    fn get(&self, key: &str) -> Result<String, StoreError> {
        validate_key(key)?;
        self.snapshots
            .borrow()
            .get(key)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(key.to_owned()))
    }

    fn remove(&self, key: &str) -> Result<bool, StoreError> {
        validate_key(key)?;
        Ok(self.snapshots.borrow_mut().remove(key).is_some())
    }

    fn keys(&self) -> Result<Vec<String>, StoreError> {
        Ok(self.snapshots.borrow().keys().cloned().collect())
    }
}
