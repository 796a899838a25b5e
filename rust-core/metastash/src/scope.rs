// SPDX-License-Identifier: PMPL-1.0-or-later
//
// The two storage scopes a facade can target.
//
// A host typically offers a durable store (survives restarts) and a
// session store (lives as long as the current session). Both are injected
// here instead of being looked up from ambient state, which keeps the
// facade testable against in-memory fakes.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::backend::StorageBackend;
use crate::error::StorageError;
use crate::memory::InMemoryBackend;

/// Which backend a facade reads from and writes to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageScope {
    /// Store that persists across sessions.
    Durable,
    /// Store tied to the lifetime of a single session.
    Session,
}

impl StorageScope {
    /// Map the `session` configuration flag to a scope.
    pub fn from_session_flag(session: bool) -> Self {
        if session {
            StorageScope::Session
        } else {
            StorageScope::Durable
        }
    }
}

impl fmt::Display for StorageScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StorageScope::Durable => f.write_str("durable"),
            StorageScope::Session => f.write_str("session"),
        }
    }
}

/// The pair of backend capabilities handed to a facade at construction.
#[derive(Clone, Default)]
pub struct ScopedBackends {
    durable: Option<Arc<dyn StorageBackend>>,
    session: Option<Arc<dyn StorageBackend>>,
}

impl ScopedBackends {
    /// An empty pair; every scope is unavailable until supplied.
    pub fn new() -> Self {
        Self::default()
    }

    /// Fresh in-memory stores for both scopes.
    pub fn in_memory() -> Self {
        Self::new()
            .with_durable(InMemoryBackend::new())
            .with_session(InMemoryBackend::new())
    }

    pub fn with_durable(mut self, backend: impl StorageBackend + 'static) -> Self {
        self.durable = Some(Arc::new(backend));
        self
    }

    pub fn with_session(mut self, backend: impl StorageBackend + 'static) -> Self {
        self.session = Some(Arc::new(backend));
        self
    }

    /// Return the backend for `scope`, or `ScopeUnavailable` if none was supplied.
    pub fn select(&self, scope: StorageScope) -> Result<Arc<dyn StorageBackend>, StorageError> {
        let slot = match scope {
            StorageScope::Durable => &self.durable,
            StorageScope::Session => &self.session,
        };
        slot.clone().ok_or(StorageError::ScopeUnavailable(scope))
    }
}

impl fmt::Debug for ScopedBackends {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScopedBackends")
            .field("durable", &self.durable.as_ref().map(|b| b.name().to_string()))
            .field("session", &self.session.as_ref().map(|b| b.name().to_string()))
            .finish()
    }
}
