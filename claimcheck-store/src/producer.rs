//! Memoized one-shot producers.
//!
//! A producer is normally spawned onto a Tokio runtime the moment it is
//! registered and runs to completion on its own, whether or not anyone is
//! polling. The outcome is wrapped in a [`Shared`] future so the first
//! resolution is cached and every later observer gets a clone of it.
//!
//! When no runtime is reachable the producer is deferred instead: it runs
//! inside the first observer's poll, still exactly once.

use std::any::Any;
use std::fmt;
use std::future::Future;
use std::panic::AssertUnwindSafe;

use claimcheck_core::{ProducerError, ProducerResult};
use futures_util::future::{BoxFuture, FutureExt, Shared};
use tokio::runtime::Handle;
use tokio::task::JoinError;

/// Cloneable handle to a producer and its cached outcome.
#[derive(Clone)]
pub struct SharedProducer {
    inner: Shared<BoxFuture<'static, ProducerResult>>,
}

impl SharedProducer {
    /// Spawn `producer` on the current runtime, or defer it if the calling
    /// thread has none. Never panics.
    pub fn spawn<F>(producer: F) -> Self
    where
        F: Future<Output = ProducerResult> + Send + 'static,
    {
        match Handle::try_current() {
            Ok(handle) => Self::spawn_on(&handle, producer),
            Err(_) => Self::deferred(producer),
        }
    }

    /// Spawn `producer` onto `handle`'s runtime.
    ///
    /// Works from any thread. Dropping every handle detaches the task; it
    /// is never cancelled.
    pub fn spawn_on<F>(handle: &Handle, producer: F) -> Self
    where
        F: Future<Output = ProducerResult> + Send + 'static,
    {
        let task = handle.spawn(producer);
        let inner = async move { task.await.unwrap_or_else(|e| Err(join_error(e))) }
            .boxed()
            .shared();
        Self { inner }
    }

    /// Wrap `producer` without spawning it.
    ///
    /// The body runs when the outcome is first polled, on the polling task.
    /// A panic is caught and cached as [`ProducerError::Panicked`].
    pub fn deferred<F>(producer: F) -> Self
    where
        F: Future<Output = ProducerResult> + Send + 'static,
    {
        tracing::debug!("No Tokio runtime in scope, deferring producer until first poll");
        let inner = AssertUnwindSafe(producer)
            .catch_unwind()
            .map(|outcome| {
                outcome.unwrap_or_else(|payload| {
                    Err(ProducerError::Panicked {
                        reason: panic_reason(payload.as_ref()),
                    })
                })
            })
            .boxed()
            .shared();
        Self { inner }
    }

    /// Wait for the producer and return its outcome.
    ///
    /// Cancel-safe: dropping the returned future leaves the producer and
    /// any other observers unaffected.
    pub async fn resolve(&self) -> ProducerResult {
        self.inner.clone().await
    }

    /// Return the outcome if the producer has already finished.
    ///
    /// Polls the shared future once without registering interest, so a
    /// producer that finished while nobody was waiting is still observed.
    pub fn peek(&self) -> Option<ProducerResult> {
        if let Some(result) = self.inner.peek() {
            return Some(result.clone());
        }
        self.inner.clone().now_or_never()
    }
}

impl fmt::Debug for SharedProducer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SharedProducer")
            .field("resolved", &self.inner.peek().is_some())
            .finish()
    }
}

fn join_error(err: JoinError) -> ProducerError {
    if err.is_panic() {
        let payload = err.into_panic();
        ProducerError::Panicked {
            reason: panic_reason(payload.as_ref()),
        }
    } else {
        ProducerError::Aborted
    }
}

fn panic_reason(payload: &(dyn Any + Send)) -> String {
    payload
        .downcast_ref::<&str>()
        .map(|s| s.to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "unknown panic payload".to_string())
}
