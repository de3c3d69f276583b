//! Error types for CLAIMCHECK operations

use thiserror::Error;

/// Failure reported by a producer.
///
/// Cloned to every observer of the operation, so it only carries owned,
/// cloneable data. The store passes it through untouched.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ProducerError {
    #[error("Producer failed: {reason}")]
    Failed { reason: String },

    #[error("Producer panicked: {reason}")]
    Panicked { reason: String },

    #[error("Producer task was aborted before resolving")]
    Aborted,
}

impl ProducerError {
    /// Build a `Failed` error from anything displayable.
    pub fn failed(reason: impl std::fmt::Display) -> Self {
        Self::Failed {
            reason: reason.to_string(),
        }
    }
}

/// Configuration errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Invalid value for {field}: {value} - {reason}")]
    InvalidValue {
        field: String,
        value: String,
        reason: String,
    },
}

/// Master error type for all CLAIMCHECK errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ClaimError {
    /// No entry is registered under the id. Covers both "never created" and
    /// "evicted after completion".
    #[error("Operation not found: {id}")]
    NotFound { id: String },

    #[error("Operation failed: {0}")]
    Producer(#[from] ProducerError),

    #[error("Config error: {0}")]
    Config(#[from] ConfigError),
}

/// Result type alias for CLAIMCHECK operations.
pub type ClaimResult<T> = Result<T, ClaimError>;

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_producer_error_display_failed() {
        let err = ProducerError::failed("upstream returned 502");
        let msg = format!("{}", err);
        assert!(msg.contains("Producer failed"));
        assert!(msg.contains("upstream returned 502"));
    }

    #[test]
    fn test_producer_error_display_aborted() {
        let msg = format!("{}", ProducerError::Aborted);
        assert!(msg.contains("aborted"));
    }

    #[test]
    fn test_config_error_display_invalid_value() {
        let err = ConfigError::InvalidValue {
            field: "sweep_interval".to_string(),
            value: "0s".to_string(),
            reason: "must be non-zero".to_string(),
        };
        let msg = format!("{}", err);
        assert!(msg.contains("sweep_interval"));
        assert!(msg.contains("0s"));
        assert!(msg.contains("must be non-zero"));
    }

    #[test]
    fn test_claim_error_not_found_display() {
        let err = ClaimError::NotFound {
            id: "op-42".to_string(),
        };
        assert_eq!(format!("{}", err), "Operation not found: op-42");
    }

    #[test]
    fn test_claim_error_from_producer_error() {
        let err: ClaimError = ProducerError::failed("boom").into();
        assert_eq!(err, ClaimError::Producer(ProducerError::failed("boom")));
        assert!(format!("{}", err).contains("boom"));
    }

    #[test]
    fn test_claim_error_from_config_error() {
        let err: ClaimError = ConfigError::InvalidValue {
            field: "retention".to_string(),
            value: "x".to_string(),
            reason: "not a number".to_string(),
        }
        .into();
        assert!(matches!(err, ClaimError::Config(_)));
    }
}
