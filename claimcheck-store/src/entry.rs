//! Per-operation entries.
//!
//! An [`Entry`] pairs a memoized producer with its registration time and
//! the time its completion was first observed. The completion stamp is an
//! `AtomicI64` of UTC microseconds written with compare-and-set, so racing
//! observers never tear it and the first writer wins.

use std::sync::atomic::{AtomicI64, Ordering};

use chrono::DateTime;
use claimcheck_core::{OperationId, Timestamp};
use serde::{Deserialize, Serialize};

use crate::producer::SharedProducer;

/// Sentinel for "completion not yet observed".
const UNSET: i64 = i64::MIN;

/// Lifecycle status of an entry still present in the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntryStatus {
    /// No observer has seen the producer resolve yet.
    Pending,
    /// The producer's resolution has been observed and stamped.
    Completed,
}

/// Point-in-time view of an entry, for diagnostics.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntrySnapshot {
    pub id: OperationId,
    pub created_at: Timestamp,
    pub completed_at: Option<Timestamp>,
    pub status: EntryStatus,
}

/// A registered operation.
#[derive(Debug)]
pub struct Entry {
    id: OperationId,
    created_at: Timestamp,
    completed_at: AtomicI64,
    producer: SharedProducer,
}

impl Entry {
    pub fn new(id: OperationId, created_at: Timestamp, producer: SharedProducer) -> Self {
        Self {
            id,
            created_at,
            completed_at: AtomicI64::new(UNSET),
            producer,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn created_at(&self) -> Timestamp {
        self.created_at
    }

    pub fn producer(&self) -> &SharedProducer {
        &self.producer
    }

    /// When completion was first observed, if it has been.
    pub fn completed_at(&self) -> Option<Timestamp> {
        match self.completed_at.load(Ordering::Acquire) {
            UNSET => None,
            micros => DateTime::from_timestamp_micros(micros),
        }
    }

    pub fn status(&self) -> EntryStatus {
        if self.completed_at().is_some() {
            EntryStatus::Completed
        } else {
            EntryStatus::Pending
        }
    }

    /// Stamp `completed_at` if it is still unset.
    ///
    /// Returns `true` only for the call that actually wrote the stamp.
    pub fn mark_completed(&self, now: Timestamp) -> bool {
        self.completed_at
            .compare_exchange(
                UNSET,
                now.timestamp_micros(),
                Ordering::AcqRel,
                Ordering::Acquire,
            )
            .is_ok()
    }

    /// Whether a sweep at `now` should remove this entry.
    ///
    /// Pending entries are never expired. Completed ones expire once
    /// strictly more than `retention` has elapsed since completion.
    pub fn is_expired(&self, now: Timestamp, retention: chrono::Duration) -> bool {
        match self.completed_at() {
            Some(completed_at) => now.signed_duration_since(completed_at) > retention,
            None => false,
        }
    }

    pub fn snapshot(&self) -> EntrySnapshot {
        let completed_at = self.completed_at();
        EntrySnapshot {
            id: self.id.clone(),
            created_at: self.created_at,
            completed_at,
            status: if completed_at.is_some() {
                EntryStatus::Completed
            } else {
                EntryStatus::Pending
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;
    use std::sync::Arc;

    fn ts(secs: i64) -> Timestamp {
        DateTime::from_timestamp(secs, 0).unwrap()
    }

    fn entry_at(created: Timestamp) -> Entry {
        let producer = SharedProducer::spawn(async { Ok(Bytes::from_static(b"x")) });
        Entry::new("op".to_string(), created, producer)
    }

    #[tokio::test]
    async fn test_new_entry_is_pending() {
        let entry = entry_at(ts(1_000));
        assert_eq!(entry.id(), "op");
        assert_eq!(entry.created_at(), ts(1_000));
        assert_eq!(entry.completed_at(), None);
        assert_eq!(entry.status(), EntryStatus::Pending);
    }

    #[tokio::test]
    async fn test_first_stamp_wins() {
        let entry = entry_at(ts(1_000));
        assert!(entry.mark_completed(ts(1_010)));
        assert!(!entry.mark_completed(ts(1_020)));
        assert_eq!(entry.completed_at(), Some(ts(1_010)));
        assert_eq!(entry.status(), EntryStatus::Completed);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_racing_stamps_write_exactly_once() {
        let entry = Arc::new(entry_at(ts(1_000)));
        let mut handles = Vec::new();
        for i in 0..16 {
            let entry = Arc::clone(&entry);
            handles.push(tokio::spawn(async move { entry.mark_completed(ts(2_000 + i)) }));
        }

        let mut winners = 0;
        for handle in handles {
            if handle.await.unwrap() {
                winners += 1;
            }
        }

        assert_eq!(winners, 1);
        let stamped = entry.completed_at().unwrap();
        assert!(stamped >= ts(2_000) && stamped < ts(2_016));
    }

    #[tokio::test]
    async fn test_pending_entry_never_expires() {
        let entry = entry_at(ts(0));
        assert!(!entry.is_expired(ts(i32::MAX as i64), chrono::Duration::zero()));
    }

    #[tokio::test]
    async fn test_expiry_is_strictly_after_retention() {
        let entry = entry_at(ts(1_000));
        entry.mark_completed(ts(1_000));
        let retention = chrono::Duration::seconds(100);

        assert!(!entry.is_expired(ts(1_050), retention));
        assert!(!entry.is_expired(ts(1_100), retention));
        assert!(entry.is_expired(ts(1_101), retention));
    }

    #[tokio::test]
    async fn test_snapshot_reflects_state() {
        let entry = entry_at(ts(1_000));
        let before = entry.snapshot();
        assert_eq!(before.status, EntryStatus::Pending);
        assert_eq!(before.completed_at, None);

        entry.mark_completed(ts(1_005));
        let after = entry.snapshot();
        assert_eq!(after.status, EntryStatus::Completed);
        assert_eq!(after.completed_at, Some(ts(1_005)));
        assert_eq!(after.created_at, ts(1_000));

        let json = serde_json::to_value(&after).unwrap();
        assert_eq!(json["status"], "Completed");
        assert_eq!(json["id"], "op");
    }
}
