//! Store activity counters.
//!
//! Plain atomics updated with relaxed ordering; they are informational and
//! never used to make store decisions.

use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};

/// Counters for store operations since construction.
#[derive(Debug, Default)]
pub struct StoreMetrics {
    /// Entries registered, including replacements
    pub created: AtomicU64,

    /// Registrations that replaced an existing entry
    pub replaced: AtomicU64,

    /// Completion stamps written (first observation of each resolution)
    pub completions_observed: AtomicU64,

    /// Lookups for ids with no entry
    pub not_found: AtomicU64,

    /// Entries removed by sweeps
    pub evicted: AtomicU64,

    /// Sweep passes run
    pub sweeps: AtomicU64,
}

impl StoreMetrics {
    /// Create new metrics instance.
    pub fn new() -> Self {
        Self::default()
    }

    /// Get current snapshot of all metrics.
    pub fn snapshot(&self) -> StoreMetricsSnapshot {
        StoreMetricsSnapshot {
            created: self.created.load(Ordering::Relaxed),
            replaced: self.replaced.load(Ordering::Relaxed),
            completions_observed: self.completions_observed.load(Ordering::Relaxed),
            not_found: self.not_found.load(Ordering::Relaxed),
            evicted: self.evicted.load(Ordering::Relaxed),
            sweeps: self.sweeps.load(Ordering::Relaxed),
        }
    }

    pub(crate) fn incr(counter: &AtomicU64) {
        counter.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn add(counter: &AtomicU64, n: u64) {
        counter.fetch_add(n, Ordering::Relaxed);
    }
}

/// Snapshot of store metrics at a point in time.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreMetricsSnapshot {
    pub created: u64,
    pub replaced: u64,
    pub completions_observed: u64,
    pub not_found: u64,
    pub evicted: u64,
    pub sweeps: u64,
}
