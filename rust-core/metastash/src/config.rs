// SPDX-License-Identifier: PMPL-1.0-or-later
//! Facade configuration.
//!
//! Field names serialize in camelCase (`enableLog`, `hasMeta`, ...) so that
//! option documents written for existing deployments load unchanged. Any
//! omitted field takes its default.

use serde::{Deserialize, Serialize};

use crate::expiry::NO_VALIDATE_EXPIRE;
use crate::scope::StorageScope;

/// Options recognised by [`crate::MetaStash`].
///
/// The `checkExpire` predicate is not data and is attached with
/// [`crate::MetaStash::with_expiry_check`] instead.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct StashConfig {
    /// Every write is a no-op and every read is "not present".
    pub disabled: bool,
    /// Emit a log record for each completed read and write.
    pub enable_log: bool,
    /// Prepended to every caller key before it reaches the backend.
    pub prefix: String,
    /// Target the session scope instead of the durable one.
    pub session: bool,
    /// Wrap payloads in a metadata envelope carrying write time and TTL.
    pub has_meta: bool,
    /// TTL in milliseconds recorded into new entries; 0 never expires.
    pub expire: u64,
}

impl Default for StashConfig {
    fn default() -> Self {
        Self {
            disabled: false,
            enable_log: false,
            prefix: String::new(),
            session: false,
            has_meta: true,
            expire: NO_VALIDATE_EXPIRE,
        }
    }
}

impl StashConfig {
    /// Parse a JSON options document.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// The backend scope selected by the `session` flag.
    pub fn scope(&self) -> StorageScope {
        StorageScope::from_session_flag(self.session)
    }

    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }

    pub fn with_expire(mut self, expire_ms: u64) -> Self {
        self.expire = expire_ms;
        self
    }

    pub fn with_session(mut self, session: bool) -> Self {
        self.session = session;
        self
    }

    pub fn with_meta(mut self, has_meta: bool) -> Self {
        self.has_meta = has_meta;
        self
    }

    pub fn with_log(mut self, enable_log: bool) -> Self {
        self.enable_log = enable_log;
        self
    }

    pub fn disabled(mut self, disabled: bool) -> Self {
        self.disabled = disabled;
        self
    }
}
