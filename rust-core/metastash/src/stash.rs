// SPDX-License-Identifier: PMPL-1.0-or-later
//
// The MetaStash facade.
//
// Typed accessors (string, number, JSON) funnel into one write primitive and
// one read primitive. Keys are namespaced with the configured prefix; values
// are optionally wrapped in a metadata envelope and judged for freshness on
// read. A read that finds an expired entry deletes it from the backend before
// reporting "not present" -- callers relying on the backend's contents should
// expect that side effect.

use std::fmt;
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::backend::StorageBackend;
use crate::clock::{Clock, SystemClock};
use crate::config::StashConfig;
use crate::envelope::{decode_envelope, encode_envelope, Envelope, Malformed, Meta};
use crate::error::{MiddlewareError, StorageError};
use crate::expiry::ExpiryPolicy;
use crate::scope::{ScopedBackends, StorageScope};

/// String-to-string transform applied to serialized JSON before a write
/// and to the stored string before a parse.
pub type Middleware<'a> = dyn Fn(&str) -> Result<String, MiddlewareError> + 'a;

/// Typed key-value facade over a raw string backend.
///
/// # Example
///
/// ```rust
/// use metastash::{ManualClock, MetaStash, ScopedBackends, StashConfig};
///
/// let clock = ManualClock::new(1_000);
/// let config = StashConfig::default().with_prefix("app:").with_expire(1000);
/// let stash = MetaStash::new(config, &ScopedBackends::in_memory())
///     .unwrap()
///     .with_clock(clock.clone());
///
/// stash.set_number("count", 5.0).unwrap();
/// assert_eq!(stash.get_number("count").unwrap(), Some(5.0));
///
/// clock.advance(1000);
/// assert_eq!(stash.get_number("count").unwrap(), None);
/// ```
pub struct MetaStash {
    config: StashConfig,
    scope: StorageScope,
    /// `None` only for a disabled facade built without a backend for its scope.
    backend: Option<Arc<dyn StorageBackend>>,
    clock: Arc<dyn Clock>,
    policy: ExpiryPolicy,
}

impl MetaStash {
    /// Build a facade on the backend selected by `config.session`.
    ///
    /// Fails with [`StorageError::ScopeUnavailable`] if that backend is
    /// missing. A disabled facade never touches a backend and so tolerates
    /// the absence.
    pub fn new(config: StashConfig, backends: &ScopedBackends) -> Result<Self, StorageError> {
        let scope = config.scope();
        let backend = match backends.select(scope) {
            Ok(backend) => Some(backend),
            Err(_) if config.disabled => None,
            Err(e) => return Err(e),
        };

        if let Some(backend) = &backend {
            debug!(backend = backend.name(), %scope, prefix = %config.prefix, "metastash ready");
        }

        Ok(Self {
            config,
            scope,
            backend,
            clock: Arc::new(SystemClock),
            policy: ExpiryPolicy::new(),
        })
    }

    /// Replace the time source used for write stamps and expiry checks.
    pub fn with_clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Arc::new(clock);
        self
    }

    /// Install a predicate over an entry's stored TTL that, when it returns
    /// `true`, marks the entry expired regardless of its age.
    pub fn with_expiry_check(mut self, check: impl Fn(f64) -> bool + Send + Sync + 'static) -> Self {
        self.policy = ExpiryPolicy::with_check(check);
        self
    }

    pub fn config(&self) -> &StashConfig {
        &self.config
    }

    pub fn scope(&self) -> StorageScope {
        self.scope
    }

    pub fn backend_name(&self) -> Option<&str> {
        self.backend.as_ref().map(|b| b.name())
    }

    /// The backend key for a caller key.
    pub fn storage_key(&self, key: &str) -> String {
        format!("{}{}", self.config.prefix, key)
    }

    // ------------------- string -------------------

    pub fn set_string(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.write(key, value)
    }

    /// Read a string; an empty string means "not found".
    ///
    /// May delete the entry if it has expired.
    pub fn get_string(&self, key: &str) -> Result<String, StorageError> {
        Ok(self.read(key)?.unwrap_or_default())
    }

    /// Like [`get_string`](Self::get_string) but with absence as `None`.
    pub fn get_string_opt(&self, key: &str) -> Result<Option<String>, StorageError> {
        self.read(key)
    }

    // ------------------- number -------------------

    pub fn set_number(&self, key: &str, value: f64) -> Result<(), StorageError> {
        self.write(key, &format_number(value))
    }

    /// Read a number. `None` when nothing is stored; `NaN` when the stored
    /// string is not numeric.
    ///
    /// May delete the entry if it has expired.
    pub fn get_number(&self, key: &str) -> Result<Option<f64>, StorageError> {
        Ok(self.read(key)?.map(|value| parse_number(&value)))
    }

    // ------------------- json -------------------

    /// Serialize `value` and store it, optionally passing the JSON text
    /// through `middleware` first.
    ///
    /// Returns `Ok(false)` without writing if serialization or the
    /// middleware fails.
    pub fn set_json<T: Serialize + ?Sized>(
        &self,
        key: &str,
        value: &T,
        middleware: Option<&Middleware<'_>>,
    ) -> Result<bool, StorageError> {
        let data = match serde_json::to_string(value) {
            Ok(data) => data,
            Err(e) => {
                warn!(key, error = %e, "failed to serialize JSON value");
                return Ok(false);
            }
        };

        let data = match middleware {
            Some(transform) => match transform(&data) {
                Ok(data) => data,
                Err(e) => {
                    warn!(key, error = %e, "JSON write middleware failed");
                    return Ok(false);
                }
            },
            None => data,
        };

        self.write(key, &data)?;
        Ok(true)
    }

    /// Read and deserialize a JSON value, optionally passing the stored
    /// text through `middleware` first.
    ///
    /// Returns `Ok(None)` when nothing is stored or the text (after the
    /// middleware) does not parse as `T`. May delete the entry if it has
    /// expired.
    pub fn get_json<T: DeserializeOwned>(
        &self,
        key: &str,
        middleware: Option<&Middleware<'_>>,
    ) -> Result<Option<T>, StorageError> {
        let Some(data) = self.read(key)? else {
            return Ok(None);
        };

        let data = match middleware {
            Some(transform) => match transform(&data) {
                Ok(data) => data,
                Err(e) => {
                    warn!(key, error = %e, "JSON read middleware failed");
                    return Ok(None);
                }
            },
            None => data,
        };

        if data.is_empty() {
            return Ok(None);
        }

        match serde_json::from_str(&data) {
            Ok(value) => Ok(Some(value)),
            Err(e) => {
                warn!(key, error = %e, "stored value is not valid JSON");
                Ok(None)
            }
        }
    }

    // ------------------- removal -------------------

    /// Delete every key in `keys` without looking at the stored values.
    ///
    /// Returns `false` for an empty list or a disabled facade, in which case
    /// the backend is not called.
    pub fn remove<K: AsRef<str>>(&self, keys: &[K]) -> Result<bool, StorageError> {
        if keys.is_empty() || self.config.disabled {
            return Ok(false);
        }

        let backend = self.backend()?;
        for key in keys {
            backend.remove(&self.storage_key(key.as_ref()))?;
        }
        Ok(true)
    }

    // ------------------- primitives -------------------

    fn backend(&self) -> Result<&dyn StorageBackend, StorageError> {
        self.backend
            .as_deref()
            .ok_or(StorageError::ScopeUnavailable(self.scope))
    }

    fn write(&self, key: &str, payload: &str) -> Result<(), StorageError> {
        if self.config.disabled {
            return Ok(());
        }

        let backend = self.backend()?;
        let storage_key = self.storage_key(key);
        if self.config.has_meta {
            let meta = Meta::new(self.clock.now_millis(), self.config.expire);
            backend.set(&storage_key, &encode_envelope(&meta, payload)?)?;
        } else {
            backend.set(&storage_key, payload)?;
        }

        self.log(key, "SET");
        Ok(())
    }

    fn read(&self, key: &str) -> Result<Option<String>, StorageError> {
        if self.config.disabled {
            return Ok(None);
        }

        let backend = self.backend()?;
        let storage_key = self.storage_key(key);
        let value = match backend.get(&storage_key)? {
            None => None,
            Some(raw) if !self.config.has_meta => Some(raw),
            Some(raw) => self.open_envelope(backend, key, &storage_key, &raw)?,
        };

        self.log(key, "GET");
        Ok(value.filter(|v| !v.is_empty()))
    }

    fn open_envelope(
        &self,
        backend: &dyn StorageBackend,
        key: &str,
        storage_key: &str,
        raw: &str,
    ) -> Result<Option<String>, StorageError> {
        match decode_envelope(raw) {
            Envelope::LegacyRaw { payload } => Ok(Some(payload.to_string())),
            Envelope::Malformed(Malformed::EmptyPayload) => Ok(None),
            Envelope::Malformed(Malformed::BadMeta(reason)) => {
                warn!(key, storage_key, %reason, "ignoring entry with unreadable metadata");
                Ok(None)
            }
            Envelope::WithMeta { meta, payload } => {
                if self.policy.is_expired(&meta, self.clock.now_millis()) {
                    debug!(key, storage_key, expire = meta.expire, "entry expired, removing");
                    backend.remove(storage_key)?;
                    return Ok(None);
                }
                Ok(Some(payload.to_string()))
            }
        }
    }

    fn log(&self, key: &str, op: &'static str) {
        if self.config.enable_log {
            info!(op, key, prefix = %self.config.prefix, "metastash access");
        }
    }
}

impl fmt::Debug for MetaStash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MetaStash")
            .field("config", &self.config)
            .field("scope", &self.scope)
            .field("backend", &self.backend_name())
            .field("policy", &self.policy)
            .finish()
    }
}

/// Textual form of a stored number: shortest round-trip decimal, with
/// `NaN`/`Infinity`/`-Infinity` for non-finite values.
fn format_number(value: f64) -> String {
    if value.is_nan() {
        "NaN".to_string()
    } else if value.is_infinite() {
        (if value > 0.0 { "Infinity" } else { "-Infinity" }).to_string()
    } else if value == 0.0 {
        // Collapse -0.
        "0".to_string()
    } else {
        value.to_string()
    }
}

/// Parse a stored number. Anything unrecognised, including the empty
/// string, is `NaN`.
fn parse_number(text: &str) -> f64 {
    let text = text.trim();
    match text {
        "" | "NaN" => f64::NAN,
        "Infinity" | "+Infinity" => f64::INFINITY,
        "-Infinity" => f64::NEG_INFINITY,
        // `f64::from_str` also takes "inf"/"nan" spellings; only exponents are letters here.
        _ if text
            .bytes()
            .any(|b| b.is_ascii_alphabetic() && b != b'e' && b != b'E') =>
        {
            f64::NAN
        }
        _ => text.parse().unwrap_or(f64::NAN),
    }
}
