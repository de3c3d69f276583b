//! Constants for CLAIMCHECK
//!
//! Default values shared by the store and the service layer.

// ============================================================================
// RETENTION
// ============================================================================

/// Default retention window after completion, in seconds (1 hour)
pub const DEFAULT_RETENTION_SECS: u64 = 3600;

/// Environment variable overriding the retention window
pub const ENV_RETENTION_SECS: &str = "CLAIMCHECK_RETENTION_SECS";

// ============================================================================
// SWEEP JOB
// ============================================================================

/// Default interval between background sweeps, in seconds
pub const DEFAULT_SWEEP_INTERVAL_SECS: u64 = 60;

/// Environment variable overriding the sweep interval
pub const ENV_SWEEP_INTERVAL_SECS: &str = "CLAIMCHECK_SWEEP_INTERVAL_SECS";

/// Environment variable toggling per-entry eviction logs
pub const ENV_SWEEP_LOG_EVICTIONS: &str = "CLAIMCHECK_SWEEP_LOG_EVICTIONS";

// ============================================================================
// TELEMETRY
// ============================================================================

/// Environment variable selecting log output format ("json" or "pretty")
pub const ENV_LOG_FORMAT: &str = "CLAIMCHECK_LOG_FORMAT";

/// Environment variable overriding the service name attached to logs
pub const ENV_SERVICE_NAME: &str = "CLAIMCHECK_SERVICE_NAME";

/// Filter used when `RUST_LOG` is not set
pub const DEFAULT_LOG_FILTER: &str = "claimcheck_store=debug,claimcheck_service=debug,info";
