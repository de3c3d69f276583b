//! Telemetry module for CLAIMCHECK
//!
//! Structured logging through `tracing`, with a JSON or human-readable
//! formatter selected from the environment.

pub mod subscriber;

pub use subscriber::{init_tracing, LogFormat, TelemetryConfig};
