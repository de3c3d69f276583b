//! Error types for the service layer

use claimcheck_core::{ClaimError, ConfigError};
use thiserror::Error;

/// Errors raised while wiring up or tearing down a hosted store.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error(transparent)]
    Claim(#[from] ClaimError),

    #[error("Telemetry initialization failed: {reason}")]
    Telemetry { reason: String },

    #[error("Sweep job terminated abnormally: {reason}")]
    SweepJob { reason: String },
}

impl From<ConfigError> for ServiceError {
    fn from(err: ConfigError) -> Self {
        Self::Claim(ClaimError::Config(err))
    }
}

/// Result type alias for service operations.
pub type ServiceResult<T> = Result<T, ServiceError>;
