//! Retention sweep.
//!
//! A sweep walks every entry and drops the completed ones whose completion
//! stamp is older than the retention window. It only reads atomics, never
//! waits on a producer, and holds each shard's lock just long enough to
//! decide on that shard's entries. Cadence is up to the caller.

use serde::{Deserialize, Serialize};

use claimcheck_core::OperationId;

use crate::metrics::StoreMetrics;
use crate::store::OperationStore;

/// Outcome of a single sweep pass.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SweepReport {
    /// Entries examined
    pub scanned: usize,
    /// Entries left alone because completion was never observed
    pub pending: usize,
    /// Completed entries still inside the retention window
    pub retained: usize,
    /// Ids removed by this pass
    pub evicted: Vec<OperationId>,
}

impl SweepReport {
    pub fn evicted_count(&self) -> usize {
        self.evicted.len()
    }
}

impl OperationStore {
    /// Remove completed entries whose retention has elapsed.
    ///
    /// An entry is removed iff its completion has been observed and
    /// `now - completed_at > retention`. Pending entries stay regardless of
    /// age.
    pub fn sweep(&self) -> SweepReport {
        let now = self.clock.now();
        let retention = self.config.retention_delta();
        let mut report = SweepReport::default();

        self.entries.retain(|id, entry| {
            report.scanned += 1;
            if entry.completed_at().is_none() {
                report.pending += 1;
                true
            } else if entry.is_expired(now, retention) {
                report.evicted.push(id.clone());
                false
            } else {
                report.retained += 1;
                true
            }
        });

        StoreMetrics::incr(&self.metrics.sweeps);
        StoreMetrics::add(&self.metrics.evicted, report.evicted.len() as u64);

        if report.evicted.is_empty() {
            tracing::trace!(
                scanned = report.scanned,
                pending = report.pending,
                "Sweep completed with nothing to evict"
            );
        } else {
            tracing::info!(
                scanned = report.scanned,
                evicted = report.evicted.len(),
                pending = report.pending,
                retained = report.retained,
                "Sweep evicted expired operations"
            );
        }

        report
    }
}
