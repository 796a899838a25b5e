// SPDX-License-Identifier: PMPL-1.0-or-later
//
// Error types for the MetaStash facade and its backends.
//
// Only failures the caller cannot paper over surface as `StorageError`: a
// missing backend scope, or a backend that cannot complete a call. Codec
// problems (bad JSON, failing middleware, malformed envelopes) are handled
// inside the facade and degrade to "not found" / "not successful".

use thiserror::Error;

use crate::scope::StorageScope;

/// Error returned by a caller-supplied JSON middleware transform.
pub type MiddlewareError = Box<dyn std::error::Error + Send + Sync>;

/// Errors that can occur when interacting with a storage backend.
#[derive(Debug, Error)]
pub enum StorageError {
    /// An I/O error occurred in the underlying storage layer.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The storage backend is not available (e.g., the file could not be opened).
    #[error("backend unavailable: {0}")]
    BackendUnavailable(String),

    /// No backend was supplied for the scope the facade is configured to use.
    #[error("no {0} storage backend configured")]
    ScopeUnavailable(StorageScope),

    /// The backend failed while reading or writing an entry.
    #[error("corrupted data: {0}")]
    CorruptedData(String),

    /// Envelope metadata could not be serialized.
    #[error("serialization error: {0}")]
    SerializationError(String),

    /// An in-process backend's lock was poisoned by a panicking writer.
    #[error("backend lock poisoned")]
    LockPoisoned,
}
