//! CLAIMCHECK Test Utilities
//!
//! Shared test infrastructure for the CLAIMCHECK workspace:
//! - Producer fixtures (ready, delayed, failing, gated, run-counting)
//! - A fixed-epoch manual clock
//! - Proptest generators for ids, payloads and durations

pub use claimcheck_core::{
    ClaimError, ClaimResult, Clock, ManualClock, OperationId, Payload, ProducerError,
    ProducerResult, StoreConfig,
};

use std::future::Future;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use chrono::DateTime;
use futures_util::future::{BoxFuture, FutureExt};
use proptest::prelude::*;
use tokio::sync::oneshot;

// ============================================================================
// PAYLOADS AND CLOCKS
// ============================================================================

/// Build a payload from a string.
pub fn payload(s: &str) -> Payload {
    Bytes::copy_from_slice(s.as_bytes())
}

/// Manual clock frozen at 2023-11-14T22:13:20Z.
pub fn fixed_clock() -> ManualClock {
    ManualClock::new(DateTime::from_timestamp(1_700_000_000, 0).unwrap_or(DateTime::UNIX_EPOCH))
}

// ============================================================================
// PRODUCER FIXTURES
// ============================================================================

/// Producer that resolves to `payload` as soon as it runs.
pub fn ready(payload: Payload) -> impl Future<Output = ProducerResult> + Send + 'static {
    async move { Ok(payload) }
}

/// Producer that resolves to `payload` after `delay`.
pub fn delayed(
    payload: Payload,
    delay: Duration,
) -> impl Future<Output = ProducerResult> + Send + 'static {
    async move {
        tokio::time::sleep(delay).await;
        Ok(payload)
    }
}

/// Producer that fails with `reason`.
pub fn failing(reason: &str) -> impl Future<Output = ProducerResult> + Send + 'static {
    let err = ProducerError::failed(reason);
    async move { Err(err) }
}

/// Test-controlled release for a gated producer.
///
/// Dropping the gate without resolving makes the producer fail, so tests
/// never hang on a forgotten gate.
#[derive(Debug)]
pub struct ProducerGate {
    tx: oneshot::Sender<ProducerResult>,
}

impl ProducerGate {
    /// Resolve the producer with `result`.
    pub fn resolve(self, result: ProducerResult) {
        let _ = self.tx.send(result);
    }

    /// Resolve the producer successfully.
    pub fn succeed(self, payload: Payload) {
        self.resolve(Ok(payload));
    }

    /// Resolve the producer with a failure.
    pub fn fail(self, reason: &str) {
        self.resolve(Err(ProducerError::failed(reason)));
    }
}

/// Producer that stays pending until its gate is released.
pub fn gated() -> (ProducerGate, BoxFuture<'static, ProducerResult>) {
    let (tx, rx) = oneshot::channel();
    let producer = async move {
        rx.await
            .unwrap_or_else(|_| Err(ProducerError::failed("gate dropped before release")))
    }
    .boxed();
    (ProducerGate { tx }, producer)
}

/// Counts how many times wrapped producers actually start running.
#[derive(Debug, Clone, Default)]
pub struct RunCounter {
    runs: Arc<AtomicUsize>,
}

impl RunCounter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wrap `producer` so each time its body starts, the counter ticks.
    pub fn wrap<F>(&self, producer: F) -> impl Future<Output = ProducerResult> + Send + 'static
    where
        F: Future<Output = ProducerResult> + Send + 'static,
    {
        let runs = Arc::clone(&self.runs);
        async move {
            runs.fetch_add(1, Ordering::SeqCst);
            producer.await
        }
    }

    pub fn runs(&self) -> usize {
        self.runs.load(Ordering::SeqCst)
    }
}

// ============================================================================
// PROPTEST GENERATORS
// ============================================================================

/// Arbitrary operation ids, including empty and non-ASCII strings.
pub fn operation_id_strategy() -> impl Strategy<Value = OperationId> {
    prop_oneof![
        "[a-z0-9-]{1,24}",
        any::<String>(),
        Just(String::new()),
    ]
}

/// A set of distinct, readable ids.
pub fn distinct_ids_strategy(max: usize) -> impl Strategy<Value = Vec<OperationId>> {
    prop::collection::hash_set("[a-z]{1,8}", 1..=max.max(1))
        .prop_map(|ids| ids.into_iter().collect())
}

/// Arbitrary payload bytes.
pub fn payload_strategy() -> impl Strategy<Value = Payload> {
    prop::collection::vec(any::<u8>(), 0..256).prop_map(Bytes::from)
}

/// Either a payload or a producer failure.
pub fn producer_result_strategy() -> impl Strategy<Value = ProducerResult> {
    prop_oneof![
        payload_strategy().prop_map(Ok::<Payload, ProducerError>),
        "[a-z ]{1,32}".prop_map(|reason| Err(ProducerError::Failed { reason })),
    ]
}

/// Retention windows from zero to one minute, in milliseconds.
pub fn retention_strategy() -> impl Strategy<Value = Duration> {
    (0u64..60_000).prop_map(Duration::from_millis)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_gate_releases_producer() {
        let (gate, producer) = gated();
        gate.succeed(payload("go"));
        assert_eq!(producer.await, Ok(payload("go")));
    }

    #[tokio::test]
    async fn test_dropped_gate_fails_producer() {
        let (gate, producer) = gated();
        drop(gate);
        assert!(matches!(producer.await, Err(ProducerError::Failed { .. })));
    }

    #[tokio::test]
    async fn test_run_counter_counts_starts() {
        let counter = RunCounter::new();
        let a = counter.wrap(ready(payload("a")));
        let b = counter.wrap(ready(payload("b")));
        assert_eq!(counter.runs(), 0);

        let _ = a.await;
        let _ = b.await;
        assert_eq!(counter.runs(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_delayed_waits() {
        let start = tokio::time::Instant::now();
        assert_eq!(
            delayed(payload("later"), Duration::from_millis(50)).await,
            Ok(payload("later"))
        );
        assert!(start.elapsed() >= Duration::from_millis(50));
    }

    #[test]
    fn test_fixed_clock_is_deterministic() {
        assert_eq!(fixed_clock().now(), fixed_clock().now());
        assert_eq!(fixed_clock().now().timestamp(), 1_700_000_000);
    }

    proptest! {
        #[test]
        fn prop_distinct_ids_are_distinct(ids in distinct_ids_strategy(16)) {
            let unique: std::collections::HashSet<_> = ids.iter().collect();
            prop_assert_eq!(unique.len(), ids.len());
        }
    }
}
