//! CLAIMCHECK Service - Hosting Layer
//!
//! The store itself has no scheduler, no logging setup and no environment
//! handling. This crate supplies those collaborators: a background sweep
//! job, tracing subscriber initialisation and environment-driven
//! configuration, plus [`ClaimCheckService`] which wires them together.
//! Transport and routing stay with the host.

pub mod config;
pub mod error;
pub mod jobs;
pub mod telemetry;

use std::sync::Arc;

use claimcheck_core::{Clock, SystemClock};
use claimcheck_store::OperationStore;
use tokio::sync::watch;
use tokio::task::JoinHandle;

pub use config::ServiceConfig;
pub use error::{ServiceError, ServiceResult};
pub use jobs::{spawn_sweeper, sweep_task, SweepJobConfig, SweepJobMetrics, SweepJobSnapshot};
pub use telemetry::{init_tracing, LogFormat, TelemetryConfig};

/// A store plus the background sweeper that bounds its growth.
///
/// # Example
///
/// ```ignore
/// let config = ServiceConfig::from_env();
/// init_tracing(&config.telemetry)?;
///
/// let service = ClaimCheckService::start(config)?;
/// let store = service.store();
/// store.create(new_operation_id(), render_report());
///
/// // On shutdown
/// let metrics = service.shutdown().await?;
/// ```
#[derive(Debug)]
pub struct ClaimCheckService {
    store: Arc<OperationStore>,
    shutdown_tx: watch::Sender<bool>,
    sweeper: JoinHandle<Arc<SweepJobMetrics>>,
}

impl ClaimCheckService {
    /// Validate `config`, build the store and spawn its sweeper.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn start(config: ServiceConfig) -> ServiceResult<Self> {
        Self::start_with_clock(config, Arc::new(SystemClock))
    }

    /// Like [`start`](Self::start) but with an explicit clock for the store.
    pub fn start_with_clock(config: ServiceConfig, clock: Arc<dyn Clock>) -> ServiceResult<Self> {
        config.validate()?;

        let store = Arc::new(OperationStore::with_clock(config.store, clock));
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let sweeper = spawn_sweeper(Arc::clone(&store), config.sweep, shutdown_rx)?;

        Ok(Self {
            store,
            shutdown_tx,
            sweeper,
        })
    }

    /// Shared handle to the store, for request handlers.
    pub fn store(&self) -> Arc<OperationStore> {
        Arc::clone(&self.store)
    }

    /// Stop the sweeper and return its final metrics.
    ///
    /// Entries still in the store are left as they are; producers keep
    /// running until they finish on their own.
    pub async fn shutdown(self) -> ServiceResult<SweepJobSnapshot> {
        let _ = self.shutdown_tx.send(true);
        let metrics = self.sweeper.await.map_err(|e| ServiceError::SweepJob {
            reason: e.to_string(),
        })?;
        Ok(metrics.snapshot())
    }
}
