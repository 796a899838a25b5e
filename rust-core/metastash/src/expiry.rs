// SPDX-License-Identifier: PMPL-1.0-or-later
//
// Expiration policy for enveloped entries.
//
// Order of evaluation:
// 1. `expire == NO_VALIDATE_EXPIRE` or no write time -> never expired.
// 2. Custom predicate says expired -> expired, whatever the age.
// 3. Otherwise expired iff `now - update_time >= expire`.

use std::fmt;
use std::sync::Arc;

use crate::envelope::Meta;

/// TTL value that disables age-based expiry for an entry.
pub const NO_VALIDATE_EXPIRE: u64 = 0;

/// Caller predicate over an entry's stored TTL; `true` means expired.
pub type ExpiryCheck = Arc<dyn Fn(f64) -> bool + Send + Sync>;

/// Decides whether a decoded entry is stale.
#[derive(Clone, Default)]
pub struct ExpiryPolicy {
    check: Option<ExpiryCheck>,
}

impl ExpiryPolicy {
    /// Age-based expiry only.
    pub fn new() -> Self {
        Self::default()
    }

    /// Age-based expiry plus a predicate consulted first.
    pub fn with_check(check: impl Fn(f64) -> bool + Send + Sync + 'static) -> Self {
        Self {
            check: Some(Arc::new(check)),
        }
    }

    pub fn has_check(&self) -> bool {
        self.check.is_some()
    }

    /// Judge `meta` at time `now_millis`.
    pub fn is_expired(&self, meta: &Meta, now_millis: u64) -> bool {
        if meta.expire == NO_VALIDATE_EXPIRE as f64 || meta.update_time == 0.0 {
            return false;
        }

        if let Some(check) = &self.check {
            if check(meta.expire) {
                return true;
            }
        }

        // A write time in the future yields a negative age, i.e. fresh.
        now_millis as f64 - meta.update_time >= meta.expire
    }
}

impl fmt::Debug for ExpiryPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExpiryPolicy")
            .field("check", &self.check.as_ref().map(|_| "<fn>"))
            .finish()
    }
}
