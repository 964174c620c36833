//! Cache Entry Module
//!
//! Defines the stored unit: an owned snapshot of key, value and creation
//! time.

use chrono::{DateTime, Utc};

// == Entry ==
/// A single stored (key, value, created_at) triple.
///
/// Every `Entry` handed out by the table is a value copy, so callers may
/// read it without holding any table lock.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    /// The key, unique within the cache
    pub key: String,
    /// The stored value
    pub value: String,
    /// UTC instant of creation, refreshed on every overwrite
    pub created_at: DateTime<Utc>,
}

impl Entry {
    /// Creates an entry stamped with the current UTC time.
    pub(crate) fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
            created_at: Utc::now(),
        }
    }
}
