//! Service Configuration Module
//!
//! Bundles the store, sweep job and telemetry settings a host process needs.
//! Everything is loaded from environment variables with defaults.

use claimcheck_core::StoreConfig;
use serde::{Deserialize, Serialize};

use crate::error::ServiceResult;
use crate::jobs::SweepJobConfig;
use crate::telemetry::TelemetryConfig;

/// Complete configuration for a hosted store.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceConfig {
    pub store: StoreConfig,
    pub sweep: SweepJobConfig,
    pub telemetry: TelemetryConfig,
}

impl ServiceConfig {
    /// Load every section from the environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load every section from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        Self {
            store: StoreConfig::from_lookup(&lookup),
            sweep: SweepJobConfig::from_lookup(&lookup),
            telemetry: TelemetryConfig::from_lookup(&lookup),
        }
    }

    /// Short retention and cadence for local development.
    pub fn development() -> Self {
        Self {
            store: StoreConfig::development(),
            sweep: SweepJobConfig::development(),
            telemetry: TelemetryConfig::default(),
        }
    }

    /// Validate all sections.
    pub fn validate(&self) -> ServiceResult<()> {
        self.store.validate()?;
        self.sweep.validate()?;
        Ok(())
    }
}
