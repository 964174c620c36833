//! Cache Facade Module
//!
//! Composes the hash table and the TTL registry behind the client-facing
//! API. A facade-level reader/writer lock keeps compound operations (set
//! value + register TTL, and their rollbacks) atomic as observed by any
//! concurrent read.

use std::sync::Arc;

use chrono::Duration;
use tokio::sync::RwLock;

use crate::cache::registry::TtlRegistry;
use crate::cache::table::{MemTable, Table};
use crate::cache::Outcome;
use crate::error::{CacheError, Result};

// == Cache ==
/// The composed cache.
///
/// Lock order is facade → registry → table. No code path takes the table
/// lock before the registry lock; facade operations take the facade lock
/// first and then call the subsystems in sequence.
pub struct Cache<T: Table = MemTable> {
    table: Arc<RwLock<T>>,
    registry: TtlRegistry<T>,
    guard: RwLock<()>,
}

impl Cache<MemTable> {
    /// Creates a cache backed by the in-memory table.
    pub fn new() -> Self {
        Self::with_table(MemTable::new())
    }
}

impl Default for Cache<MemTable> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Table> Cache<T> {
    /// Creates a cache over a custom table implementation.
    pub fn with_table(table: T) -> Self {
        let table = Arc::new(RwLock::new(table));
        let registry = TtlRegistry::new(Arc::clone(&table));
        Self {
            table,
            registry,
            guard: RwLock::new(()),
        }
    }

    /// Stores `value` under `key`. A positive `ttl` also registers an
    /// expiration deadline; zero or negative means the entry never
    /// expires. If the deadline cannot be registered the insert is rolled
    /// back, so the compound operation is atomic for the caller.
    pub async fn set(&self, key: &str, value: &str, ttl: Duration) -> Result<Outcome> {
        let _guard = self.guard.write().await;
        let outcome = self.table.write().await.set(key, value)?;

        if ttl > Duration::zero() {
            if let Outcome::Created(entry) | Outcome::Updated(entry) = &outcome {
                if let Err(err) = self.registry.register(key, entry.created_at, ttl).await {
                    let _ = self.table.write().await.unset(key);
                    return Err(err);
                }
            }
        }

        Ok(outcome)
    }

    /// Removes `key` along with any deadline registered for it. A registry
    /// miss is expected (the entry may have had no TTL) and suppressed.
    pub async fn unset(&self, key: &str) -> Result<Outcome> {
        let _guard = self.guard.write().await;
        let outcome = self.table.write().await.unset(key)?;

        match self.registry.unregister(key).await {
            Ok(()) | Err(CacheError::KeyNotFound(_)) => Ok(outcome),
            Err(err) => Err(err),
        }
    }

    /// Looks up `key`.
    pub async fn get(&self, key: &str) -> Result<Outcome> {
        let _guard = self.guard.read().await;
        self.table.read().await.get(key)
    }

    /// Registers `ttl` for an existing key. The deadline is computed from
    /// the entry's creation time, not from now, so repeating the same call
    /// is idempotent.
    pub async fn set_ttl(&self, key: &str, ttl: Duration) -> Result<Outcome> {
        let _guard = self.guard.write().await;
        match self.table.read().await.get(key)? {
            Outcome::Retrieved(entry) => {
                self.registry.register(key, entry.created_at, ttl).await?;
                Ok(Outcome::Updated(entry))
            }
            other => Ok(other),
        }
    }

    /// Drops `key`'s deadline without removing the entry. Reports
    /// TtlNotFound when the key exists but carries no deadline.
    pub async fn unset_ttl(&self, key: &str) -> Result<Outcome> {
        let _guard = self.guard.write().await;
        match self.table.read().await.get(key)? {
            Outcome::Retrieved(entry) => match self.registry.unregister(key).await {
                Ok(()) => Ok(Outcome::Updated(entry)),
                Err(CacheError::KeyNotFound(key)) => Err(CacheError::TtlNotFound(key)),
                Err(err) => Err(err),
            },
            other => Ok(other),
        }
    }

    /// Remaining TTL for `key`.
    pub async fn get_ttl(&self, key: &str) -> Result<Outcome> {
        let _guard = self.guard.read().await;
        let ttl = self.registry.get_ttl(key).await?;
        Ok(Outcome::RetrievedTtl(ttl))
    }

    /// Unsets every key and forgets every deadline.
    pub async fn unset_all(&self) -> Result<Outcome> {
        let _guard = self.guard.write().await;
        self.table.write().await.clear();
        self.registry.reset().await;
        Ok(Outcome::Cleared)
    }
}
