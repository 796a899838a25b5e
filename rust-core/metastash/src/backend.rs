// SPDX-License-Identifier: PMPL-1.0-or-later
//
// Raw string store contract consumed by the MetaStash facade.
//
// A backend is a synchronous, string-keyed, string-valued store: one value
// per key, last writer wins, every call completes before returning. The
// facade never assumes anything else about it (no scans, no batching, no
// expiry of its own).

use std::sync::Arc;

use crate::error::StorageError;

/// A synchronous string key-value store.
///
/// Implementations must be safe to share across threads; the facade holds
/// them behind an `Arc` so several facades (e.g. with different prefixes)
/// can sit on one physical store.
pub trait StorageBackend: Send + Sync {
    /// Retrieve the value stored under `key`.
    ///
    /// Returns `Ok(None)` if the key does not exist, rather than an error.
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Store `value` under `key`, overwriting any previous value.
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Delete the value stored under `key`. Removing a missing key is not an error.
    fn remove(&self, key: &str) -> Result<(), StorageError>;

    /// A human-readable name for this backend, used in logging.
    fn name(&self) -> &str;
}

impl<B: StorageBackend + ?Sized> StorageBackend for Arc<B> {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        (**self).set(key, value)
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        (**self).remove(key)
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}
