// SPDX-License-Identifier: PMPL-1.0-or-later
//
// In-memory storage backend for MetaStash.
//
// Uses a `BTreeMap` wrapped in a `RwLock` for thread-safe, ordered string
// storage. Serves as the session scope (its lifetime is the process's) and
// as the fake backend in tests.

use std::collections::BTreeMap;
use std::sync::{Arc, RwLock};

use crate::backend::StorageBackend;
use crate::error::StorageError;

/// An in-memory storage backend backed by a sorted `BTreeMap`.
///
/// All data lives in process memory and is lost on drop. Clones share the
/// same map, so a test can keep a handle for direct inspection while the
/// facade owns another.
///
/// # Example
///
/// ```rust
/// use metastash::backend::StorageBackend;
/// use metastash::memory::InMemoryBackend;
///
/// let store = InMemoryBackend::new();
/// store.set("hello", "world").unwrap();
/// assert_eq!(store.get("hello").unwrap(), Some("world".to_string()));
/// ```
#[derive(Debug, Clone, Default)]
pub struct InMemoryBackend {
    /// The underlying sorted map, protected by a read-write lock.
    data: Arc<RwLock<BTreeMap<String, String>>>,
}

impl InMemoryBackend {
    /// Create a new, empty in-memory backend.
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the number of keys currently stored.
    pub fn len(&self) -> usize {
        self.data.read().map(|map| map.len()).unwrap_or(0)
    }

    /// Return true if the store contains no keys.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Check whether `key` is present, without going through `get`.
    pub fn contains_key(&self, key: &str) -> bool {
        self.data
            .read()
            .map(|map| map.contains_key(key))
            .unwrap_or(false)
    }

    /// Return every stored key in lexicographic order.
    pub fn keys(&self) -> Vec<String> {
        self.data
            .read()
            .map(|map| map.keys().cloned().collect())
            .unwrap_or_default()
    }
}

impl StorageBackend for InMemoryBackend {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let map = self.data.read().map_err(|_| StorageError::LockPoisoned)?;
        Ok(map.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let mut map = self.data.write().map_err(|_| StorageError::LockPoisoned)?;
        map.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        let mut map = self.data.write().map_err(|_| StorageError::LockPoisoned)?;
        map.remove(key);
        Ok(())
    }

    fn name(&self) -> &str {
        "in-memory"
    }
}
