//! Hash Table Module
//!
//! Authoritative key→entry storage behind the [`Table`] seam.

use std::collections::HashMap;

use chrono::Utc;

use crate::cache::{Entry, Outcome};
use crate::error::{CacheError, Result};

// == Table Seam ==
/// What a store must do to back the cache.
///
/// One production implementation exists ([`MemTable`]); the seam admits
/// alternative stores under test. Callers wrap the table in a
/// reader/writer lock, so the methods themselves are lock-free.
pub trait Table: Send + Sync + 'static {
    /// Inserts or overwrites `key`, returning a snapshot of the stored
    /// entry. An overwrite refreshes `created_at`.
    fn set(&mut self, key: &str, value: &str) -> Result<Outcome>;

    /// Removes `key`, returning a snapshot of the removed entry.
    fn unset(&mut self, key: &str) -> Result<Outcome>;

    /// Looks up `key`, returning a snapshot of the entry.
    fn get(&self, key: &str) -> Result<Outcome>;

    /// Drops every entry.
    fn clear(&mut self);
}

// == Mem Table ==
/// HashMap-backed production table.
#[derive(Debug, Default)]
pub struct MemTable {
    entries: HashMap<String, Entry>,
}

impl MemTable {
    /// Creates an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when no entries are stored.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Table for MemTable {
    fn set(&mut self, key: &str, value: &str) -> Result<Outcome> {
        match self.entries.get_mut(key) {
            Some(entry) => {
                entry.value = value.to_string();
                entry.created_at = Utc::now();
                Ok(Outcome::Updated(entry.clone()))
            }
            None => {
                let entry = Entry::new(key, value);
                self.entries.insert(key.to_string(), entry.clone());
                Ok(Outcome::Created(entry))
            }
        }
    }

    fn unset(&mut self, key: &str) -> Result<Outcome> {
        match self.entries.remove(key) {
            Some(entry) => Ok(Outcome::Deleted(entry)),
            None => Err(CacheError::KeyNotFound(key.to_string())),
        }
    }

    fn get(&self, key: &str) -> Result<Outcome> {
        self.entries
            .get(key)
            .map(|entry| Outcome::Retrieved(entry.clone()))
            .ok_or_else(|| CacheError::KeyNotFound(key.to_string()))
    }

    fn clear(&mut self) {
        self.entries.clear();
    }
}
