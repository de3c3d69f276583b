//! Store configuration
//!
//! The store recognises a single option, the retention window. Values are
//! read from the environment with defaults for anything missing or
//! unparsable.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::constants::{DEFAULT_RETENTION_SECS, ENV_RETENTION_SECS};
use crate::error::ConfigError;

/// Configuration fixed at store construction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreConfig {
    /// How long a completed entry stays retrievable before a sweep may
    /// evict it. Pending entries are never evicted. (default: 1 hour)
    pub retention: Duration,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            retention: Duration::from_secs(DEFAULT_RETENTION_SECS),
        }
    }
}

impl StoreConfig {
    /// Create a config with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the retention window.
    pub fn with_retention(mut self, retention: Duration) -> Self {
        self.retention = retention;
        self
    }

    /// Create StoreConfig from environment variables.
    ///
    /// # Environment Variables
    /// - `CLAIMCHECK_RETENTION_SECS`: Retention after completion (default: 3600)
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Create StoreConfig from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let retention = Duration::from_secs(
            lookup(ENV_RETENTION_SECS)
                .and_then(|s| s.trim().parse().ok())
                .unwrap_or(DEFAULT_RETENTION_SECS),
        );

        Self { retention }
    }

    /// Short retention for development and tests.
    pub fn development() -> Self {
        Self {
            retention: Duration::from_secs(60),
        }
    }

    /// Check that the retention window can be compared against timestamps.
    pub fn validate(&self) -> Result<(), ConfigError> {
        chrono::Duration::from_std(self.retention).map_err(|e| ConfigError::InvalidValue {
            field: "retention".to_string(),
            value: format!("{:?}", self.retention),
            reason: e.to_string(),
        })?;
        Ok(())
    }

    /// Retention as a signed duration for timestamp arithmetic.
    ///
    /// Saturates at `chrono::TimeDelta::MAX` for windows too large to
    /// represent, which never evicts anything.
    pub fn retention_delta(&self) -> chrono::Duration {
        chrono::Duration::from_std(self.retention).unwrap_or(chrono::TimeDelta::MAX)
    }
}
