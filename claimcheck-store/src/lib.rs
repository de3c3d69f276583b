//! CLAIMCHECK Store - Correlation Store for Deferred Operations
//!
//! A caller registers a producer under an opaque id and returns at once;
//! pollers later retrieve the outcome by id, suspending until it is ready.
//! Completed entries are evicted by [`OperationStore::sweep`] once they
//! have aged past the configured retention window.
//!
//! # Lifecycle
//!
//! ```text
//! Pending --(first observed resolution)--> Completed --(sweep after retention)--> Evicted
//!    \
//!     +--(create with same id)--> Replaced
//! ```
//!
//! Entries whose completion is never observed are never evicted, and an
//! evicted id is indistinguishable from one that never existed.

pub mod entry;
pub mod metrics;
pub mod producer;
pub mod store;
pub mod sweep;

pub use entry::{Entry, EntrySnapshot, EntryStatus};
pub use metrics::{StoreMetrics, StoreMetricsSnapshot};
pub use producer::SharedProducer;
pub use store::{OperationStore, Peek};
pub use sweep::SweepReport;
