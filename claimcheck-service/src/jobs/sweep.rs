//! Retention Sweep Background Task
//!
//! The store never sweeps itself; this task is the scheduler that calls
//! [`OperationStore::sweep`] on a fixed cadence so completed operations do
//! not accumulate forever. Sweeps never touch pending operations, so a
//! stuck producer still holds its entry.
//!
//! # Configuration
//!
//! ```rust
//! use claimcheck_service::jobs::SweepJobConfig;
//! use std::time::Duration;
//!
//! let config = SweepJobConfig {
//!     interval: Duration::from_secs(60), // Sweep every minute
//!     log_evictions: true,               // Log each evicted id
//! };
//! ```

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use claimcheck_core::constants::{
    DEFAULT_SWEEP_INTERVAL_SECS, ENV_SWEEP_INTERVAL_SECS, ENV_SWEEP_LOG_EVICTIONS,
};
use claimcheck_core::ConfigError;
use claimcheck_store::{OperationStore, SweepReport};
use serde::{Deserialize, Serialize};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{interval, MissedTickBehavior};

use crate::error::ServiceResult;

// ============================================================================
// CONFIGURATION
// ============================================================================

/// Configuration for the sweep background task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SweepJobConfig {
    /// How often to sweep (default: 60 seconds)
    pub interval: Duration,

    /// Whether to log each evicted operation id (default: true)
    pub log_evictions: bool,
}

impl Default for SweepJobConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(DEFAULT_SWEEP_INTERVAL_SECS),
            log_evictions: true,
        }
    }
}

impl SweepJobConfig {
    /// Create SweepJobConfig from environment variables.
    ///
    /// # Environment Variables
    /// - `CLAIMCHECK_SWEEP_INTERVAL_SECS`: Seconds between sweeps (default: 60)
    /// - `CLAIMCHECK_SWEEP_LOG_EVICTIONS`: Whether to log evicted ids (default: true)
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Create SweepJobConfig from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let interval = Duration::from_secs(
            lookup(ENV_SWEEP_INTERVAL_SECS)
                .and_then(|s| s.trim().parse().ok())
                .unwrap_or(DEFAULT_SWEEP_INTERVAL_SECS),
        );

        let log_evictions = lookup(ENV_SWEEP_LOG_EVICTIONS)
            .map(|s| s.trim().to_lowercase() != "false")
            .unwrap_or(true);

        Self {
            interval,
            log_evictions,
        }
    }

    /// Create a configuration for development/testing with a short cadence.
    pub fn development() -> Self {
        Self {
            interval: Duration::from_secs(5),
            log_evictions: true,
        }
    }

    /// Create a configuration for production: default cadence, aggregate
    /// logging only.
    pub fn production() -> Self {
        Self {
            interval: Duration::from_secs(DEFAULT_SWEEP_INTERVAL_SECS),
            log_evictions: false,
        }
    }

    /// Reject a zero interval, which tokio's interval timer cannot use.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.interval.is_zero() {
            return Err(ConfigError::InvalidValue {
                field: "interval".to_string(),
                value: format!("{:?}", self.interval),
                reason: "sweep interval must be non-zero".to_string(),
            });
        }
        Ok(())
    }
}

// ============================================================================
// METRICS
// ============================================================================

/// Metrics for sweep job activity.
#[derive(Debug, Default)]
pub struct SweepJobMetrics {
    /// Total sweep cycles completed
    pub sweep_cycles: AtomicU64,

    /// Total entries evicted since startup
    pub entries_evicted: AtomicU64,

    /// Entries scanned in the most recent cycle
    pub last_scanned: AtomicU64,

    /// Pending entries seen in the most recent cycle
    pub last_pending: AtomicU64,
}

impl SweepJobMetrics {
    /// Create new metrics instance.
    pub fn new() -> Self {
        Self::default()
    }

    /// Get current snapshot of all metrics.
    pub fn snapshot(&self) -> SweepJobSnapshot {
        SweepJobSnapshot {
            sweep_cycles: self.sweep_cycles.load(Ordering::Relaxed),
            entries_evicted: self.entries_evicted.load(Ordering::Relaxed),
            last_scanned: self.last_scanned.load(Ordering::Relaxed),
            last_pending: self.last_pending.load(Ordering::Relaxed),
        }
    }

    fn record(&self, report: &SweepReport) {
        self.sweep_cycles.fetch_add(1, Ordering::Relaxed);
        self.entries_evicted
            .fetch_add(report.evicted_count() as u64, Ordering::Relaxed);
        self.last_scanned
            .store(report.scanned as u64, Ordering::Relaxed);
        self.last_pending
            .store(report.pending as u64, Ordering::Relaxed);
    }
}

/// Snapshot of sweep job metrics at a point in time.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SweepJobSnapshot {
    pub sweep_cycles: u64,
    pub entries_evicted: u64,
    pub last_scanned: u64,
    pub last_pending: u64,
}

// ============================================================================
// BACKGROUND TASK
// ============================================================================

/// Background task that periodically sweeps the store.
///
/// Runs until the shutdown signal flips to `true` or its sender is dropped,
/// then returns the metrics collected over its lifetime.
///
/// # Example
///
/// ```ignore
/// let (shutdown_tx, shutdown_rx) = watch::channel(false);
/// let handle = tokio::spawn(sweep_task(Arc::clone(&store), SweepJobConfig::default(), shutdown_rx));
///
/// // Later, trigger shutdown
/// let _ = shutdown_tx.send(true);
/// let metrics = handle.await?;
/// ```
pub async fn sweep_task(
    store: Arc<OperationStore>,
    config: SweepJobConfig,
    mut shutdown_rx: watch::Receiver<bool>,
) -> Arc<SweepJobMetrics> {
    let metrics = Arc::new(SweepJobMetrics::new());

    let mut sweep_interval = interval(config.interval);
    sweep_interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

    tracing::info!(
        interval_secs = config.interval.as_secs_f64(),
        retention_secs = store.config().retention.as_secs_f64(),
        "Sweep task started"
    );

    loop {
        tokio::select! {
            changed = shutdown_rx.changed() => {
                if changed.is_err() || *shutdown_rx.borrow() {
                    tracing::info!("Sweep task shutting down");
                    break;
                }
            }

            _ = sweep_interval.tick() => {
                run_sweep(&store, &config, &metrics);
            }
        }
    }

    let snapshot = metrics.snapshot();
    tracing::info!(
        sweep_cycles = snapshot.sweep_cycles,
        entries_evicted = snapshot.entries_evicted,
        "Sweep task completed"
    );

    metrics
}

/// Validate `config` and spawn [`sweep_task`] onto the current runtime.
pub fn spawn_sweeper(
    store: Arc<OperationStore>,
    config: SweepJobConfig,
    shutdown_rx: watch::Receiver<bool>,
) -> ServiceResult<JoinHandle<Arc<SweepJobMetrics>>> {
    config.validate()?;
    Ok(tokio::spawn(sweep_task(store, config, shutdown_rx)))
}

/// Perform one sweep cycle.
fn run_sweep(store: &OperationStore, config: &SweepJobConfig, metrics: &SweepJobMetrics) {
    let report = store.sweep();
    metrics.record(&report);

    if config.log_evictions {
        for id in &report.evicted {
            tracing::debug!(operation_id = %id, "Evicted expired operation");
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use claimcheck_core::{ManualClock, StoreConfig};
    use claimcheck_test_utils::{gated, payload, ready};
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_config_default() {
        let config = SweepJobConfig::default();
        assert_eq!(
            config.interval,
            Duration::from_secs(DEFAULT_SWEEP_INTERVAL_SECS)
        );
        assert!(config.log_evictions);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_development() {
        let config = SweepJobConfig::development();
        assert_eq!(config.interval, Duration::from_secs(5));
        assert!(config.log_evictions);
    }

    #[test]
    fn test_config_production() {
        let config = SweepJobConfig::production();
        assert_eq!(
            config.interval,
            Duration::from_secs(DEFAULT_SWEEP_INTERVAL_SECS)
        );
        assert!(!config.log_evictions);
    }

    #[test]
    fn test_config_from_lookup() {
        let config = SweepJobConfig::from_lookup(lookup_from(&[
            (ENV_SWEEP_INTERVAL_SECS, "15"),
            (ENV_SWEEP_LOG_EVICTIONS, "FALSE"),
        ]));
        assert_eq!(config.interval, Duration::from_secs(15));
        assert!(!config.log_evictions);

        let config = SweepJobConfig::from_lookup(lookup_from(&[(ENV_SWEEP_INTERVAL_SECS, "")]));
        assert_eq!(config, SweepJobConfig::default());
    }

    #[test]
    fn test_config_rejects_zero_interval() {
        let config = SweepJobConfig {
            interval: Duration::ZERO,
            log_evictions: false,
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidValue { ref field, .. }) if field == "interval"
        ));
    }

    #[test]
    fn test_metrics_snapshot() {
        let metrics = SweepJobMetrics::new();
        metrics.record(&SweepReport {
            scanned: 5,
            pending: 2,
            retained: 1,
            evicted: vec!["a".to_string(), "b".to_string()],
        });
        metrics.record(&SweepReport {
            scanned: 3,
            pending: 2,
            retained: 1,
            evicted: Vec::new(),
        });

        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.sweep_cycles, 2);
        assert_eq!(snapshot.entries_evicted, 2);
        assert_eq!(snapshot.last_scanned, 3);
        assert_eq!(snapshot.last_pending, 2);
    }

    #[tokio::test]
    async fn test_spawn_sweeper_rejects_invalid_config() {
        let store = Arc::new(OperationStore::with_defaults());
        let (_tx, rx) = watch::channel(false);
        let config = SweepJobConfig {
            interval: Duration::ZERO,
            log_evictions: true,
        };
        assert!(spawn_sweeper(store, config, rx).is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn test_task_evicts_and_stops_on_shutdown() {
        let clock = ManualClock::starting_now();
        let store = Arc::new(OperationStore::with_clock(
            StoreConfig::new().with_retention(Duration::from_secs(1)),
            Arc::new(clock.clone()),
        ));
        store.create("done", ready(payload("x")));
        let _ = store.get_result("done").await;
        let (_gate, producer) = gated();
        store.create("running", producer);

        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let config = SweepJobConfig {
            interval: Duration::from_millis(10),
            log_evictions: true,
        };
        let handle = spawn_sweeper(Arc::clone(&store), config, shutdown_rx).unwrap();

        clock.advance(Duration::from_secs(2));
        tokio::time::sleep(Duration::from_millis(25)).await;

        assert!(!store.exists("done"));
        assert!(store.exists("running"));

        shutdown_tx.send(true).unwrap();
        let metrics = handle.await.unwrap().snapshot();
        assert!(metrics.sweep_cycles >= 2);
        assert_eq!(metrics.entries_evicted, 1);
        assert_eq!(metrics.last_pending, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_task_stops_when_sender_dropped() {
        let store = Arc::new(OperationStore::with_defaults());
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let handle = tokio::spawn(sweep_task(store, SweepJobConfig::default(), shutdown_rx));

        drop(shutdown_tx);
        let metrics = handle.await.unwrap();
        assert!(metrics.snapshot().sweep_cycles <= 1);
    }
}
