// SPDX-License-Identifier: PMPL-1.0-or-later
//
// MetaStash: a metadata-annotated key-value access layer.
//
// Stores strings, numbers and JSON values under namespaced keys in a plain
// string store, optionally tagging each value with its write time and a TTL
// so stale entries read as absent (and are deleted on that read). A single
// `disabled` flag turns every call into a no-op without touching call sites.
//
// # Modules
//
// - [`backend`] -- The synchronous `StorageBackend` string-store trait.
// - [`error`] -- `StorageError`, the only failures surfaced to callers.
// - [`memory`] -- An in-memory `BTreeMap` backend (session scope, tests).
// - [`metrics`] -- A counting wrapper, also used as a spy in tests.
// - [`scope`] -- Durable vs. session scope selection.
// - [`clock`] -- Wall-clock and manual time sources.
// - [`config`] -- `StashConfig` options.
// - [`envelope`] -- The `meta + SEPARATOR + payload` codec.
// - [`expiry`] -- TTL / predicate expiration policy.
// - [`stash`] -- The `MetaStash` facade and its typed accessors.
//
// # Example
//
// ```rust
// use metastash::{MetaStash, ScopedBackends, StashConfig};
//
// let stash = MetaStash::new(
//     StashConfig::default().with_prefix("app:"),
//     &ScopedBackends::in_memory(),
// )
// .unwrap();
//
// stash.set_json("user", &serde_json::json!({"name": "test"}), None).unwrap();
// let user: serde_json::Value = stash.get_json("user", None).unwrap().unwrap();
// assert_eq!(user["name"], "test");
// ```

pub mod backend;
pub mod clock;
pub mod config;
pub mod envelope;
pub mod error;
pub mod expiry;
pub mod memory;
pub mod metrics;
pub mod scope;
pub mod stash;

// Optional persistent backend, feature-gated to keep the default build lean.
#[cfg(feature = "redb-backend")]
pub mod redb_backend;

pub use backend::StorageBackend;
pub use clock::{Clock, ManualClock, SystemClock};
pub use config::StashConfig;
pub use envelope::{Envelope, Meta, SEPARATOR};
pub use error::{MiddlewareError, StorageError};
pub use expiry::{ExpiryPolicy, NO_VALIDATE_EXPIRE};
pub use memory::InMemoryBackend;
pub use metrics::{BackendStats, MetricsBackend};
pub use scope::{ScopedBackends, StorageScope};
pub use stash::{MetaStash, Middleware};

#[cfg(feature = "redb-backend")]
pub use redb_backend::RedbBackend;
