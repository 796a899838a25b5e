// SPDX-License-Identifier: PMPL-1.0-or-later
//
// Metrics-collecting wrapper for MetaStash storage backends.
//
// Wraps any `StorageBackend` and transparently counts calls, latency and
// bytes moved. Besides dashboards, this is how tests prove that a disabled
// facade never touches its backend: wrap, run, assert `total_calls() == 0`.

use std::sync::{Arc, RwLock};
use std::time::Instant;

use crate::backend::StorageBackend;
use crate::error::StorageError;

/// Accumulated statistics for a storage backend.
///
/// All counters are monotonically increasing until [`MetricsBackend::reset_stats`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BackendStats {
    /// Number of `get` operations performed.
    pub get_count: u64,
    /// Number of `set` operations performed.
    pub set_count: u64,
    /// Number of `remove` operations performed.
    pub remove_count: u64,
    /// Number of `get` calls that found a value.
    pub hit_count: u64,
    /// Cumulative wall-clock latency of all `get` calls, in milliseconds.
    pub get_latency_sum_ms: f64,
    /// Cumulative wall-clock latency of all `set` calls, in milliseconds.
    pub set_latency_sum_ms: f64,
    /// Total bytes returned by `get`.
    pub total_bytes_read: u64,
    /// Total bytes passed to `set`.
    pub total_bytes_written: u64,
}

impl BackendStats {
    /// Number of backend calls of any kind.
    pub fn total_calls(&self) -> u64 {
        self.get_count + self.set_count + self.remove_count
    }
}

/// A storage backend wrapper that collects operation metrics.
///
/// Clones share the same counters, so a test can hand one clone to the
/// facade and read statistics from another.
///
/// # Example
///
/// ```rust
/// use metastash::backend::StorageBackend;
/// use metastash::memory::InMemoryBackend;
/// use metastash::metrics::MetricsBackend;
///
/// let metered = MetricsBackend::new(InMemoryBackend::new());
/// metered.set("key", "value").unwrap();
/// metered.get("key").unwrap();
///
/// let stats = metered.stats();
/// assert_eq!(stats.set_count, 1);
/// assert_eq!(stats.get_count, 1);
/// ```
#[derive(Debug, Clone)]
pub struct MetricsBackend<B: StorageBackend> {
    /// The wrapped backend that performs the actual storage operations.
    inner: B,
    /// Shared, mutable statistics accumulator.
    stats: Arc<RwLock<BackendStats>>,
}

impl<B: StorageBackend> MetricsBackend<B> {
    /// Wrap `inner` with metrics collection.
    pub fn new(inner: B) -> Self {
        Self {
            inner,
            stats: Arc::new(RwLock::new(BackendStats::default())),
        }
    }

    /// Return a snapshot of the current statistics.
    pub fn stats(&self) -> BackendStats {
        self.stats
            .read()
            .map(|s| s.clone())
            .unwrap_or_default()
    }

    /// Reset all statistics to zero.
    pub fn reset_stats(&self) {
        if let Ok(mut s) = self.stats.write() {
            *s = BackendStats::default();
        }
    }

    /// Return a reference to the inner backend.
    pub fn inner(&self) -> &B {
        &self.inner
    }

    fn record(&self, update: impl FnOnce(&mut BackendStats)) {
        // Counters are best-effort; a poisoned lock must not fail the data path.
        if let Ok(mut s) = self.stats.write() {
            update(&mut s);
        }
    }
}

impl<B: StorageBackend> StorageBackend for MetricsBackend<B> {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let start = Instant::now();
        let result = self.inner.get(key);
        let elapsed_ms = start.elapsed().as_secs_f64() * 1000.0;

        self.record(|s| {
            s.get_count += 1;
            s.get_latency_sum_ms += elapsed_ms;
            if let Ok(Some(ref val)) = result {
                s.hit_count += 1;
                s.total_bytes_read += val.len() as u64;
            }
        });

        result
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let start = Instant::now();
        let result = self.inner.set(key, value);
        let elapsed_ms = start.elapsed().as_secs_f64() * 1000.0;

        self.record(|s| {
            s.set_count += 1;
            s.set_latency_sum_ms += elapsed_ms;
            if result.is_ok() {
                s.total_bytes_written += value.len() as u64;
            }
        });

        result
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        let result = self.inner.remove(key);
        self.record(|s| s.remove_count += 1);
        result
    }

    fn name(&self) -> &str {
        self.inner.name()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::InMemoryBackend;

    #[test]
    fn test_counts_operations() {
        let metered = MetricsBackend::new(InMemoryBackend::new());

        metered.set("a", "12345").unwrap();
        metered.set("b", "xy").unwrap();
        metered.get("a").unwrap();
        metered.get("missing").unwrap();
        metered.remove("b").unwrap();

        let stats = metered.stats();
        assert_eq!(stats.set_count, 2);
        assert_eq!(stats.get_count, 2);
        assert_eq!(stats.hit_count, 1);
        assert_eq!(stats.remove_count, 1);
        assert_eq!(stats.total_calls(), 5);
        assert_eq!(stats.total_bytes_written, 7);
        assert_eq!(stats.total_bytes_read, 5);
    }

    #[test]
    fn test_reset_stats() {
        let metered = MetricsBackend::new(InMemoryBackend::new());
        metered.set("k", "v").unwrap();
        metered.reset_stats();
        assert_eq!(metered.stats(), BackendStats::default());
    }

    #[test]
    fn test_clone_shares_counters() {
        let metered = MetricsBackend::new(InMemoryBackend::new());
        let spy = metered.clone();
        metered.get("x").unwrap();
        assert_eq!(spy.stats().get_count, 1);
    }

    #[test]
    fn test_delegates_name_and_data() {
        let inner = InMemoryBackend::new();
        let metered = MetricsBackend::new(inner.clone());
        metered.set("k", "v").unwrap();
        assert!(inner.contains_key("k"));
        assert_eq!(metered.name(), "in-memory");
        assert!(metered.inner().contains_key("k"));
    }
}
