//! Tracing Subscriber Initialization
//!
//! Installs a global `tracing` subscriber with an `EnvFilter` (from
//! `RUST_LOG`, falling back to [`DEFAULT_LOG_FILTER`]) and either a JSON
//! or a human-readable formatter.

use claimcheck_core::constants::{DEFAULT_LOG_FILTER, ENV_LOG_FORMAT, ENV_SERVICE_NAME};
use serde::{Deserialize, Serialize};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::error::{ServiceError, ServiceResult};

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum LogFormat {
    /// One JSON object per event, for log shippers.
    Json,
    /// Human-readable lines for local development.
    #[default]
    Pretty,
}

impl LogFormat {
    /// Parse a format name; anything other than "json" is `Pretty`.
    pub fn parse(value: &str) -> Self {
        if value.trim().eq_ignore_ascii_case("json") {
            Self::Json
        } else {
            Self::Pretty
        }
    }
}

/// Telemetry configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TelemetryConfig {
    /// Service name attached to the startup event
    pub service_name: String,
    /// Output format
    pub log_format: LogFormat,
    /// Filter used when `RUST_LOG` is not set
    pub default_filter: String,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            service_name: "claimcheck".to_string(),
            log_format: LogFormat::default(),
            default_filter: DEFAULT_LOG_FILTER.to_string(),
        }
    }
}

impl TelemetryConfig {
    /// Create TelemetryConfig from environment variables.
    ///
    /// # Environment Variables
    /// - `CLAIMCHECK_LOG_FORMAT`: "json" or "pretty" (default: pretty)
    /// - `CLAIMCHECK_SERVICE_NAME`: Service name (default: claimcheck)
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Create TelemetryConfig from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        Self {
            service_name: lookup(ENV_SERVICE_NAME)
                .filter(|s| !s.trim().is_empty())
                .unwrap_or(defaults.service_name),
            log_format: lookup(ENV_LOG_FORMAT)
                .map(|s| LogFormat::parse(&s))
                .unwrap_or(defaults.log_format),
            default_filter: defaults.default_filter,
        }
    }
}

/// Install the global tracing subscriber.
///
/// Call once at startup. Fails if a global subscriber is already set.
pub fn init_tracing(config: &TelemetryConfig) -> ServiceResult<()> {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.default_filter));

    let registry = tracing_subscriber::registry().with(env_filter);
    let installed = match config.log_format {
        LogFormat::Json => registry
            .with(tracing_subscriber::fmt::layer().json())
            .try_init(),
        LogFormat::Pretty => registry.with(tracing_subscriber::fmt::layer()).try_init(),
    };

    installed.map_err(|e| ServiceError::Telemetry {
        reason: e.to_string(),
    })?;

    tracing::info!(
        service_name = %config.service_name,
        log_format = ?config.log_format,
        "Telemetry initialized"
    );

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_telemetry_config_default() {
        let config = TelemetryConfig::default();
        assert_eq!(config.service_name, "claimcheck");
        assert_eq!(config.log_format, LogFormat::Pretty);
        assert_eq!(config.default_filter, DEFAULT_LOG_FILTER);
    }

    #[test]
    fn test_log_format_parse() {
        assert_eq!(LogFormat::parse("json"), LogFormat::Json);
        assert_eq!(LogFormat::parse(" JSON "), LogFormat::Json);
        assert_eq!(LogFormat::parse("pretty"), LogFormat::Pretty);
        assert_eq!(LogFormat::parse("xml"), LogFormat::Pretty);
    }

    #[test]
    fn test_from_lookup() {
        let config = TelemetryConfig::from_lookup(lookup_from(&[
            (ENV_LOG_FORMAT, "json"),
            (ENV_SERVICE_NAME, "poller-gateway"),
        ]));
        assert_eq!(config.log_format, LogFormat::Json);
        assert_eq!(config.service_name, "poller-gateway");

        let config = TelemetryConfig::from_lookup(lookup_from(&[(ENV_SERVICE_NAME, "  ")]));
        assert_eq!(config, TelemetryConfig::default());
    }

    #[test]
    fn test_second_init_fails() {
        let config = TelemetryConfig::default();
        // Whichever call installs first, the second must be rejected.
        let first = init_tracing(&config);
        let second = init_tracing(&config);
        assert!(first.is_ok() || matches!(first, Err(ServiceError::Telemetry { .. })));
        assert!(matches!(second, Err(ServiceError::Telemetry { .. })));
    }
}
