// SPDX-License-Identifier: PMPL-1.0-or-later
//
// redb-backed durable storage backend for MetaStash.
//
// Uses redb (pure Rust, B-tree, ACID, single-file database) for the durable
// scope: entries survive process restarts. No C/C++ dependencies.
//
// # Design
//
// - Single redb `Database` file containing one string table.
// - Read transactions for `get` (concurrent, lock-free).
// - One write transaction per `set`/`remove`, committed before returning, so
//   every call is atomic and durable on its own.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use redb::{Database, ReadableDatabase, TableDefinition};
use tracing::debug;

use crate::backend::StorageBackend;
use crate::error::StorageError;

/// Table holding the backend strings, keyed by storage key.
const ENTRIES_TABLE: TableDefinition<&str, &str> = TableDefinition::new("entries");

/// A persistent storage backend powered by redb.
///
/// Thread-safe: `Database` is `Send + Sync` and handles internal locking.
///
/// # Example
///
/// ```rust,no_run
/// use metastash::backend::StorageBackend;
/// use metastash::redb_backend::RedbBackend;
///
/// let store = RedbBackend::open("/tmp/metastash.redb").unwrap();
/// store.set("hello", "world").unwrap();
/// assert_eq!(store.get("hello").unwrap(), Some("world".to_string()));
/// ```
pub struct RedbBackend {
    /// The redb database handle.
    db: Arc<Database>,
    /// Path to the database file (for diagnostics).
    path: PathBuf,
}

impl RedbBackend {
    /// Open or create a redb database at the given path.
    ///
    /// Creates the file and parent directories if they don't exist. The
    /// table is created on first write.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StorageError> {
        let path = path.as_ref().to_path_buf();

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let db = Database::create(&path).map_err(|e| {
            StorageError::BackendUnavailable(format!(
                "failed to open redb at {}: {}",
                path.display(),
                e
            ))
        })?;

        debug!(path = %path.display(), "opened redb backend");

        Ok(Self {
            db: Arc::new(db),
            path,
        })
    }

    /// Return the filesystem path of the database file.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl std::fmt::Debug for RedbBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedbBackend")
            .field("path", &self.path)
            .finish()
    }
}

impl StorageBackend for RedbBackend {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let txn = self
            .db
            .begin_read()
            .map_err(|e| StorageError::BackendUnavailable(format!("read txn: {e}")))?;

        let table = match txn.open_table(ENTRIES_TABLE) {
            Ok(t) => t,
            // Table doesn't exist yet: nothing has been written.
            Err(_) => return Ok(None),
        };

        match table.get(key) {
            Ok(Some(value)) => Ok(Some(value.value().to_string())),
            Ok(None) => Ok(None),
            Err(e) => Err(StorageError::CorruptedData(format!("get: {e}"))),
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let txn = self
            .db
            .begin_write()
            .map_err(|e| StorageError::BackendUnavailable(format!("write txn: {e}")))?;
        {
            let mut table = txn
                .open_table(ENTRIES_TABLE)
                .map_err(|e| StorageError::BackendUnavailable(format!("open table: {e}")))?;
            table
                .insert(key, value)
                .map_err(|e| StorageError::CorruptedData(format!("insert: {e}")))?;
        }
        txn.commit()
            .map_err(|e| StorageError::CorruptedData(format!("commit: {e}")))?;
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        let txn = self
            .db
            .begin_write()
            .map_err(|e| StorageError::BackendUnavailable(format!("write txn: {e}")))?;
        {
            let mut table = txn
                .open_table(ENTRIES_TABLE)
                .map_err(|e| StorageError::BackendUnavailable(format!("open table: {e}")))?;
            table
                .remove(key)
                .map_err(|e| StorageError::CorruptedData(format!("remove: {e}")))?;
        }
        txn.commit()
            .map_err(|e| StorageError::CorruptedData(format!("commit: {e}")))?;
        Ok(())
    }

    fn name(&self) -> &str {
        "redb"
    }
}
