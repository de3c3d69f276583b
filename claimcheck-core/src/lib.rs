//! CLAIMCHECK Core - Shared Types
//!
//! Identifiers, timestamps, the clock abstraction, producer outcome types,
//! the error hierarchy and store configuration. Every other crate in the
//! workspace depends on this one; it contains no store logic.

pub mod clock;
pub mod config;
pub mod constants;
pub mod error;

use bytes::Bytes;
use chrono::{DateTime, Utc};
use uuid::Uuid;

pub use clock::{Clock, ManualClock, SystemClock};
pub use config::StoreConfig;
pub use error::{ClaimError, ClaimResult, ConfigError, ProducerError};

// ============================================================================
// IDENTITY TYPES
// ============================================================================

/// Caller-supplied operation identifier.
///
/// Opaque to the store: no format is enforced and any string is a valid key.
pub type OperationId = String;

/// Timestamp type using UTC timezone.
pub type Timestamp = DateTime<Utc>;

/// Generate a new UUIDv7 operation id (timestamp-sortable).
///
/// Hosts are free to use any other identifier scheme.
pub fn new_operation_id() -> OperationId {
    Uuid::now_v7().to_string()
}

// ============================================================================
// PRODUCER OUTCOMES
// ============================================================================

/// Resolved payload of a producer.
///
/// `Bytes` is reference counted, so every observer of an operation receives a
/// handle to the same buffer.
pub type Payload = Bytes;

/// What a producer resolves to. Cloned to every observer.
pub type ProducerResult = Result<Payload, ProducerError>;
