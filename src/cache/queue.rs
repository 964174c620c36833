//! TTL Priority Queue
//!
//! An indexed binary min-heap over expiration deadlines. Every swap
//! updates a key→slot index, which keeps deadline updates and in-place
//! removals O(log n) and key lookups O(1).

use std::collections::HashMap;

use chrono::{DateTime, Utc};

/// Sentinel deadline written into a cancelled record. A record carrying
/// this instant must never be acted upon when peeked.
pub(crate) const TOMBSTONE: DateTime<Utc> = DateTime::<Utc>::UNIX_EPOCH;

// == TTL Record ==
/// One tracked deadline: a key and the UTC instant it expires.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TtlRecord {
    /// Key of the entry this deadline belongs to
    pub key: String,
    /// The instant the entry becomes eligible for eviction
    pub expire_at: DateTime<Utc>,
}

impl TtlRecord {
    /// True when the deadline carries the cancelled sentinel.
    pub fn is_tombstone(&self) -> bool {
        self.expire_at == TOMBSTONE
    }
}

// == TTL Queue ==
/// Min-heap of [`TtlRecord`]s ordered by `expire_at`, with a key index.
///
/// The index always mirrors the heap: for every indexed key there is a
/// record at the indexed slot whose key matches.
#[derive(Debug, Default)]
pub struct TtlQueue {
    heap: Vec<TtlRecord>,
    slots: HashMap<String, usize>,
}

impl TtlQueue {
    /// Creates an empty queue.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of tracked records.
    pub fn len(&self) -> usize {
        self.heap.len()
    }

    /// True when no records are tracked.
    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    /// True when `key` has a tracked deadline.
    pub fn contains(&self, key: &str) -> bool {
        self.slots.contains_key(key)
    }

    /// The deadline tracked for `key`, if any.
    pub fn expire_at(&self, key: &str) -> Option<DateTime<Utc>> {
        self.slots.get(key).map(|&at| self.heap[at].expire_at)
    }

    /// The record with the earliest deadline.
    pub fn peek(&self) -> Option<&TtlRecord> {
        self.heap.first()
    }

    /// Inserts `key` with `expire_at`, or moves an existing record to the
    /// new deadline. The new deadline may be earlier or later, so the
    /// record is re-fixed in both directions.
    pub fn upsert(&mut self, key: &str, expire_at: DateTime<Utc>) {
        if let Some(&at) = self.slots.get(key) {
            self.heap[at].expire_at = expire_at;
            self.fix(at);
        } else {
            let at = self.heap.len();
            self.heap.push(TtlRecord {
                key: key.to_string(),
                expire_at,
            });
            self.slots.insert(key.to_string(), at);
            self.sift_up(at);
        }
    }

    /// Pops the earliest record, dropping it from the index as well.
    pub fn pop(&mut self) -> Option<TtlRecord> {
        if self.heap.is_empty() {
            return None;
        }
        let last = self.heap.len() - 1;
        self.swap(0, last);
        let record = self.heap.pop()?;
        self.slots.remove(&record.key);
        if !self.heap.is_empty() {
            self.sift_down(0);
        }
        Some(record)
    }

    /// Removes `key`'s record in place. The returned record carries the
    /// tombstone sentinel so a copy extracted concurrently is recognizably
    /// dead.
    pub fn remove(&mut self, key: &str) -> Option<TtlRecord> {
        let at = *self.slots.get(key)?;
        self.heap[at].expire_at = TOMBSTONE;
        let last = self.heap.len() - 1;
        self.swap(at, last);
        let record = self.heap.pop()?;
        self.slots.remove(key);
        if at < self.heap.len() {
            self.fix(at);
        }
        Some(record)
    }

    /// Drops every record.
    pub fn clear(&mut self) {
        self.heap.clear();
        self.slots.clear();
    }

    /// Swaps two slots, keeping the index in step.
    fn swap(&mut self, a: usize, b: usize) {
        self.heap.swap(a, b);
        self.slots.insert(self.heap[a].key.clone(), a);
        self.slots.insert(self.heap[b].key.clone(), b);
    }

    /// Restores the heap property at `at` in whichever direction it is
    /// violated.
    fn fix(&mut self, at: usize) {
        let at = self.sift_up(at);
        self.sift_down(at);
    }

    fn sift_up(&mut self, mut at: usize) -> usize {
        while at > 0 {
            let parent = (at - 1) / 2;
            if self.heap[at].expire_at >= self.heap[parent].expire_at {
                break;
            }
            self.swap(at, parent);
            at = parent;
        }
        at
    }

    fn sift_down(&mut self, mut at: usize) {
        loop {
            let mut smallest = at;
            for child in [2 * at + 1, 2 * at + 2] {
                if child < self.heap.len()
                    && self.heap[child].expire_at < self.heap[smallest].expire_at
                {
                    smallest = child;
                }
            }
            if smallest == at {
                break;
            }
            self.swap(at, smallest);
            at = smallest;
        }
    }

    /// Checks the index↔heap mirror and the heap ordering.
    #[cfg(test)]
    pub(crate) fn assert_consistent(&self) {
        assert_eq!(self.heap.len(), self.slots.len());
        for (key, &at) in &self.slots {
            assert_eq!(self.heap[at].key.as_str(), key.as_str());
        }
        for at in 1..self.heap.len() {
            let parent = (at - 1) / 2;
            assert!(self.heap[parent].expire_at <= self.heap[at].expire_at);
        }
    }
}
