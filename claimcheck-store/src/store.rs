//! The operation store.
//!
//! [`OperationStore`] maps caller-supplied ids to [`Entry`] values in a
//! sharded concurrent map. Table access never spans an await: lookups clone
//! the entry's `Arc` out of the map and release the shard before waiting on
//! the producer, so a slow producer only ever suspends its own pollers.

use std::future::Future;
use std::sync::Arc;

use claimcheck_core::{
    ClaimError, ClaimResult, Clock, OperationId, Payload, ProducerResult, StoreConfig,
    SystemClock,
};
use dashmap::DashMap;
use tokio::runtime::Handle;

use crate::entry::{Entry, EntrySnapshot};
use crate::metrics::StoreMetrics;
use crate::producer::SharedProducer;

/// Non-suspending view of an operation's outcome.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Peek {
    /// No entry under the id.
    NotFound,
    /// The producer has not resolved yet.
    Pending,
    /// The producer has resolved.
    Ready(ProducerResult),
}

/// Correlation store for deferred operations.
///
/// Construct once and share behind an `Arc`; all operations take `&self`
/// and are safe to call concurrently, from runtime workers and plain
/// threads alike. Producers are spawned on the runtime captured at
/// construction.
///
/// # Example
///
/// ```ignore
/// let store = Arc::new(OperationStore::new(StoreConfig::default()));
/// store.create("report-17", async { Ok(Bytes::from_static(b"done")) });
///
/// // Later, possibly from another connection:
/// match store.get_result("report-17").await {
///     Some(Ok(payload)) => respond(payload),
///     Some(Err(e)) => respond_error(e),
///     None => respond_not_found(),
/// }
/// ```
#[derive(Debug)]
pub struct OperationStore {
    pub(crate) entries: DashMap<OperationId, Arc<Entry>>,
    pub(crate) config: StoreConfig,
    pub(crate) clock: Arc<dyn Clock>,
    pub(crate) metrics: StoreMetrics,
    runtime: Option<Handle>,
}

impl OperationStore {
    /// Create a store using wall-clock time.
    pub fn new(config: StoreConfig) -> Self {
        Self::with_clock(config, Arc::new(SystemClock))
    }

    /// Create a store with default configuration.
    pub fn with_defaults() -> Self {
        Self::new(StoreConfig::default())
    }

    /// Create a store that reads time from `clock`.
    ///
    /// Captures the current Tokio runtime, if any, for spawning producers.
    pub fn with_clock(config: StoreConfig, clock: Arc<dyn Clock>) -> Self {
        Self::build(config, clock, Handle::try_current().ok())
    }

    /// Create a store that spawns producers on `runtime`.
    pub fn with_handle(config: StoreConfig, clock: Arc<dyn Clock>, runtime: Handle) -> Self {
        Self::build(config, clock, Some(runtime))
    }

    fn build(config: StoreConfig, clock: Arc<dyn Clock>, runtime: Option<Handle>) -> Self {
        Self {
            entries: DashMap::new(),
            config,
            clock,
            metrics: StoreMetrics::new(),
            runtime,
        }
    }

    /// Get the store configuration.
    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    /// Get the store's activity counters.
    pub fn metrics(&self) -> &StoreMetrics {
        &self.metrics
    }

    /// Number of registered entries, pending and completed.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Register `producer` under `id`, replacing any existing entry.
    ///
    /// The producer is spawned immediately on the store's runtime, or on the
    /// caller's if the store was built outside one. With no runtime at all it
    /// is deferred until first polled. Never panics. A replaced producer
    /// keeps running but can no longer be looked up.
    pub fn create<F>(&self, id: impl Into<OperationId>, producer: F)
    where
        F: Future<Output = ProducerResult> + Send + 'static,
    {
        let id = id.into();
        let producer = match &self.runtime {
            Some(runtime) => SharedProducer::spawn_on(runtime, producer),
            None => SharedProducer::spawn(producer),
        };
        let entry = Arc::new(Entry::new(id.clone(), self.clock.now(), producer));

        StoreMetrics::incr(&self.metrics.created);
        match self.entries.insert(id, Arc::clone(&entry)) {
            Some(previous) => {
                StoreMetrics::incr(&self.metrics.replaced);
                tracing::debug!(
                    operation_id = %entry.id(),
                    previous_status = ?previous.status(),
                    "Replaced existing operation"
                );
            }
            None => {
                tracing::debug!(operation_id = %entry.id(), "Registered operation");
            }
        }
    }

    /// Whether an entry is registered under `id`. Never suspends.
    pub fn exists(&self, id: &str) -> bool {
        self.entries.contains_key(id)
    }

    /// Wait for the operation's outcome.
    ///
    /// Returns `None` immediately when nothing is registered under `id`.
    /// Otherwise suspends until the producer resolves and returns the same
    /// outcome every observer sees. The first observer stamps completion.
    pub async fn get_result(&self, id: &str) -> Option<ProducerResult> {
        let entry = self.lookup(id)?;

        let result = entry.producer().resolve().await;
        self.observe_completion(&entry);
        Some(result)
    }

    /// Check the operation's outcome without suspending.
    ///
    /// A `Ready` answer counts as an observation and stamps completion just
    /// like [`get_result`](Self::get_result).
    pub fn try_get_result(&self, id: &str) -> Peek {
        let Some(entry) = self.lookup(id) else {
            return Peek::NotFound;
        };

        match entry.producer().peek() {
            Some(result) => {
                self.observe_completion(&entry);
                Peek::Ready(result)
            }
            None => Peek::Pending,
        }
    }

    /// Wait for the operation and flatten the outcome into [`ClaimResult`].
    pub async fn redeem(&self, id: &str) -> ClaimResult<Payload> {
        match self.get_result(id).await {
            Some(result) => result.map_err(ClaimError::from),
            None => Err(ClaimError::NotFound { id: id.to_string() }),
        }
    }

    /// Diagnostic view of the entry under `id`.
    pub fn snapshot(&self, id: &str) -> Option<EntrySnapshot> {
        self.entries.get(id).map(|entry| entry.snapshot())
    }

    /// Clone the entry out of the map so the shard lock is released
    /// before any await.
    fn lookup(&self, id: &str) -> Option<Arc<Entry>> {
        let entry = self.entries.get(id).map(|entry| Arc::clone(entry.value()));
        if entry.is_none() {
            StoreMetrics::incr(&self.metrics.not_found);
            tracing::trace!(operation_id = %id, "Operation not found");
        }
        entry
    }

    fn observe_completion(&self, entry: &Entry) {
        let now = self.clock.now();
        if entry.mark_completed(now) {
            StoreMetrics::incr(&self.metrics.completions_observed);
            tracing::debug!(
                operation_id = %entry.id(),
                elapsed_ms = now.signed_duration_since(entry.created_at()).num_milliseconds(),
                "Operation completion observed"
            );
        }
    }
}

impl Default for OperationStore {
    fn default() -> Self {
        Self::with_defaults()
    }
}
