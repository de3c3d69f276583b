//! Background Jobs for CLAIMCHECK
//!
//! - `sweep`: Evicts completed operations once their retention has elapsed
//!
//! # Usage
//!
//! ```ignore
//! use claimcheck_service::jobs::{spawn_sweeper, SweepJobConfig};
//! use tokio::sync::watch;
//!
//! let (shutdown_tx, shutdown_rx) = watch::channel(false);
//! let handle = spawn_sweeper(Arc::clone(&store), SweepJobConfig::from_env(), shutdown_rx)?;
//!
//! // On shutdown
//! let _ = shutdown_tx.send(true);
//! ```

pub mod sweep;

pub use sweep::{spawn_sweeper, sweep_task, SweepJobConfig, SweepJobMetrics, SweepJobSnapshot};
