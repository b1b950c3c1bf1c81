//! Pending missing keys, grouped per (language, namespace) bucket

use indexmap::IndexMap;
use ondemand_common::BucketKey;
use std::collections::HashMap;

/// Missing keys of one bucket mapped to their default values, in first-report order
pub type PendingKeys = IndexMap<String, String>;

/// Keys taken out of a bucket by one flush
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot {
    seq: u64,
    keys: PendingKeys,
}

impl Snapshot {
    /// Keys and default values handed to the resolver
    pub const fn keys(&self) -> &PendingKeys {
        &self.keys
    }

    /// Number of keys in the snapshot
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    /// Whether the bucket had nothing pending
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}

#[derive(Debug, Default)]
struct Bucket {
    pending: PendingKeys,
    next_seq: u64,
    in_flight: usize,
    /// Keys resolved while other flushes were in flight, with the sequence
    /// of the flush that resolved them
    resolved: HashMap<String, u64>,
}

impl Bucket {
    fn settle(&mut self) {
        self.in_flight = self.in_flight.saturating_sub(1);
        if self.in_flight == 0 {
            self.resolved.clear();
        }
    }
}

/// Accumulates missing keys until their bucket is flushed
///
/// Buckets are created on first use and emptied, never removed. Several
/// flushes of one bucket may be in flight at once; each settles with either
/// [`complete`](Self::complete) or [`restore`](Self::restore).
#[derive(Debug, Default)]
pub struct PendingQueue {
    buckets: HashMap<BucketKey, Bucket>,
}

impl PendingQueue {
    /// Create an empty queue
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a missing key; a repeated key keeps its position and takes the new default value
    ///
    /// Returns `true` when the key was not pending before.
    pub fn enqueue(&mut self, bucket: &BucketKey, key: &str, default_value: &str) -> bool {
        self.buckets
            .entry(bucket.clone())
            .or_default()
            .pending
            .insert(key.to_string(), default_value.to_string())
            .is_none()
    }

    /// Swap the bucket's keys out for an empty set
    ///
    /// A non-empty snapshot counts as in flight until it is settled.
    pub fn take(&mut self, bucket: &BucketKey) -> Snapshot {
        let Some(state) = self.buckets.get_mut(bucket) else {
            return Snapshot {
                seq: 0,
                keys: PendingKeys::new(),
            };
        };

        let keys = std::mem::take(&mut state.pending);
        let seq = state.next_seq;
        if !keys.is_empty() {
            state.next_seq += 1;
            state.in_flight += 1;
        }
        Snapshot { seq, keys }
    }

    /// Settle a snapshot whose flush succeeded
    pub fn complete(&mut self, bucket: &BucketKey, snapshot: &Snapshot) {
        let Some(state) = self.buckets.get_mut(bucket) else {
            return;
        };
        if state.in_flight > 1 {
            for key in snapshot.keys.keys() {
                let seq = state.resolved.entry(key.clone()).or_insert(snapshot.seq);
                *seq = (*seq).max(snapshot.seq);
            }
        }
        state.settle();
    }

    /// Put back keys whose flush failed
    ///
    /// Keys resolved by a flush taken after this snapshot are dropped. Keys
    /// reported again since `take` keep their newer default value. Restored
    /// keys go first so that report order is preserved.
    pub fn restore(&mut self, bucket: &BucketKey, snapshot: Snapshot) {
        let state = self.buckets.entry(bucket.clone()).or_default();
        let Snapshot { seq, mut keys } = snapshot;
        keys.retain(|key, _| state.resolved.get(key).map_or(true, |&resolved| resolved < seq));

        let newer = std::mem::replace(&mut state.pending, keys);
        state.pending.extend(newer);
        state.settle();
    }

    /// Keys currently pending for a bucket, in report order
    pub fn keys(&self, bucket: &BucketKey) -> Vec<String> {
        self.buckets
            .get(bucket)
            .map(|state| state.pending.keys().cloned().collect())
            .unwrap_or_default()
    }

    /// Buckets that currently hold keys
    pub fn non_empty_buckets(&self) -> Vec<BucketKey> {
        let mut buckets: Vec<BucketKey> = self
            .buckets
            .iter()
            .filter(|(_, state)| !state.pending.is_empty())
            .map(|(bucket, _)| bucket.clone())
            .collect();
        buckets.sort();
        buckets
    }

    /// Number of buckets ever seen
    pub fn bucket_count(&self) -> usize {
        self.buckets.len()
    }

    /// Total number of pending keys across all buckets
    pub fn pending_count(&self) -> usize {
        self.buckets.values().map(|state| state.pending.len()).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn bucket() -> BucketKey {
        BucketKey::new("en", "common")
    }

    fn entries(snapshot: &Snapshot) -> Vec<(&str, &str)> {
        snapshot
            .keys()
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_str()))
            .collect()
    }

    #[test]
    fn test_enqueue_creates_bucket_lazily() {
        let mut queue = PendingQueue::new();
        assert_eq!(queue.bucket_count(), 0);

        assert!(queue.enqueue(&bucket(), "greeting", "Hello"));
        assert_eq!(queue.bucket_count(), 1);
        assert_eq!(queue.keys(&bucket()), vec!["greeting"]);
    }

    #[test]
    fn test_repeated_key_is_last_write_wins() {
        let mut queue = PendingQueue::new();
        queue.enqueue(&bucket(), "a", "first");
        queue.enqueue(&bucket(), "b", "B");
        assert!(!queue.enqueue(&bucket(), "a", "second"));

        let snapshot = queue.take(&bucket());
        assert_eq!(entries(&snapshot), vec![("a", "second"), ("b", "B")]);
    }

    #[test]
    fn test_take_empties_but_keeps_bucket() {
        let mut queue = PendingQueue::new();
        queue.enqueue(&bucket(), "a", "A");

        let taken = queue.take(&bucket());
        assert_eq!(taken.len(), 1);
        assert_eq!(queue.bucket_count(), 1);
        assert_eq!(queue.pending_count(), 0);
        assert!(queue.non_empty_buckets().is_empty());

        assert!(queue.take(&BucketKey::new("xx", "none")).is_empty());
    }

    #[test]
    fn test_restore_keeps_newer_values_and_original_order() {
        let mut queue = PendingQueue::new();
        queue.enqueue(&bucket(), "a", "A1");
        queue.enqueue(&bucket(), "b", "B1");
        let snapshot = queue.take(&bucket());

        queue.enqueue(&bucket(), "c", "C1");
        queue.enqueue(&bucket(), "a", "A2");
        queue.restore(&bucket(), snapshot);

        let pending = queue.take(&bucket());
        assert_eq!(entries(&pending), vec![("a", "A2"), ("b", "B1"), ("c", "C1")]);
    }

    #[test]
    fn test_restore_skips_keys_resolved_by_later_flush() {
        let mut queue = PendingQueue::new();
        queue.enqueue(&bucket(), "a", "A");
        queue.enqueue(&bucket(), "b", "B");
        let slow = queue.take(&bucket());

        queue.enqueue(&bucket(), "a", "A");
        let fast = queue.take(&bucket());
        queue.complete(&bucket(), &fast);

        queue.restore(&bucket(), slow);
        assert_eq!(queue.keys(&bucket()), vec!["b"]);
    }

    #[test]
    fn test_restore_keeps_keys_resolved_by_earlier_flush() {
        let mut queue = PendingQueue::new();
        queue.enqueue(&bucket(), "a", "A1");
        let early = queue.take(&bucket());

        queue.enqueue(&bucket(), "a", "A2");
        let late = queue.take(&bucket());

        queue.complete(&bucket(), &early);
        queue.restore(&bucket(), late);
        assert_eq!(queue.keys(&bucket()), vec!["a"]);
    }

    #[test]
    fn test_resolved_bookkeeping_resets_once_idle() {
        let mut queue = PendingQueue::new();
        queue.enqueue(&bucket(), "a", "A");
        let first = queue.take(&bucket());
        queue.enqueue(&bucket(), "a", "A");
        let second = queue.take(&bucket());

        queue.complete(&bucket(), &second);
        queue.complete(&bucket(), &first);

        // nothing in flight anymore, a later failure restores everything
        queue.enqueue(&bucket(), "a", "A");
        let third = queue.take(&bucket());
        queue.restore(&bucket(), third);
        assert_eq!(queue.keys(&bucket()), vec!["a"]);
    }

    #[test]
    fn test_buckets_are_independent() {
        let mut queue = PendingQueue::new();
        let en = BucketKey::new("en", "common");
        let fr = BucketKey::new("fr", "common");
        queue.enqueue(&en, "a", "A");
        queue.enqueue(&fr, "b", "B");

        let _ = queue.take(&en);
        assert_eq!(queue.non_empty_buckets(), vec![fr.clone()]);
        assert_eq!(queue.keys(&fr), vec!["b"]);
    }
}
