//! TTL Registry Module
//!
//! Tracks per-key expiration deadlines, arms the single expiration timer,
//! and evicts expired keys from the table when their deadlines pass.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::cache::queue::TtlQueue;
use crate::cache::table::Table;
use crate::error::{CacheError, Result};

// == Pending Timer ==
/// The at-most-one armed expiration timer.
struct PendingTimer {
    /// Deadline the worker is currently sleeping toward
    deadline: DateTime<Utc>,
    /// The worker task; aborted on reschedule, reset and teardown
    handle: JoinHandle<()>,
}

struct RegistryInner {
    queue: TtlQueue,
    timer: Option<PendingTimer>,
}

// == TTL Registry ==
/// Deadline registry for the cache.
///
/// Holds the earliest-deadline queue and re-arms one timer worker whenever
/// the queue minimum moves. The expiration sweep runs on the worker task
/// and unsets expired keys through the shared table, so the registry lock
/// is always taken before the table lock and never the other way around.
pub struct TtlRegistry<T: Table> {
    inner: Arc<RwLock<RegistryInner>>,
    table: Arc<RwLock<T>>,
}

impl<T: Table> TtlRegistry<T> {
    /// Creates a registry that evicts through `table`.
    pub fn new(table: Arc<RwLock<T>>) -> Self {
        Self {
            inner: Arc::new(RwLock::new(RegistryInner {
                queue: TtlQueue::new(),
                timer: None,
            })),
            table,
        }
    }

    /// Registers (or re-registers) a deadline of `created_at + ttl` for
    /// `key`. Non-positive TTLs are rejected; callers that want "no TTL"
    /// simply do not register one.
    pub async fn register(&self, key: &str, created_at: DateTime<Utc>, ttl: Duration) -> Result<()> {
        if ttl <= Duration::zero() {
            return Err(CacheError::InvalidTtl(ttl));
        }
        let expire_at = created_at + ttl;

        let mut inner = self.inner.write().await;
        inner.queue.upsert(key, expire_at);
        self.rearm(&mut inner);
        Ok(())
    }

    /// Drops `key`'s deadline without touching the stored entry.
    pub async fn unregister(&self, key: &str) -> Result<()> {
        let mut inner = self.inner.write().await;
        inner
            .queue
            .remove(key)
            .map(|_| ())
            .ok_or_else(|| CacheError::KeyNotFound(key.to_string()))
    }

    /// Remaining time until `key` expires. May be negative when a firing
    /// is imminent; callers treat any non-positive value as "about to
    /// expire".
    pub async fn get_ttl(&self, key: &str) -> Result<Duration> {
        let inner = self.inner.read().await;
        let expire_at = inner
            .queue
            .expire_at(key)
            .ok_or_else(|| CacheError::TtlNotFound(key.to_string()))?;
        Ok(expire_at - Utc::now())
    }

    /// Forgets every deadline and disarms the timer.
    pub async fn reset(&self) {
        let mut inner = self.inner.write().await;
        inner.queue.clear();
        if let Some(timer) = inner.timer.take() {
            timer.handle.abort();
        }
    }

    /// Re-arms the worker at the queue minimum unless it is already armed
    /// there. Called with the registry lock held.
    fn rearm(&self, inner: &mut RegistryInner) {
        let Some(root) = inner.queue.peek() else {
            if let Some(timer) = inner.timer.take() {
                timer.handle.abort();
            }
            return;
        };
        let deadline = root.expire_at;
        if inner.timer.as_ref().is_some_and(|t| t.deadline == deadline) {
            return;
        }
        if let Some(timer) = inner.timer.take() {
            timer.handle.abort();
        }
        let handle = spawn_timer(Arc::clone(&self.inner), Arc::clone(&self.table), deadline);
        inner.timer = Some(PendingTimer { deadline, handle });
    }
}

impl<T: Table> Drop for TtlRegistry<T> {
    /// Cancels the worker so it cannot outlive the registry.
    fn drop(&mut self) {
        if let Ok(mut inner) = self.inner.try_write() {
            if let Some(timer) = inner.timer.take() {
                timer.handle.abort();
            }
        }
    }
}

// == Expiration Worker ==
/// Sleeps until `deadline`, then sweeps expired records. Keeps looping
/// while live deadlines remain, re-arming in place; exits when the queue
/// drains.
fn spawn_timer<T: Table>(
    inner: Arc<RwLock<RegistryInner>>,
    table: Arc<RwLock<T>>,
    deadline: DateTime<Utc>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut next = deadline;
        loop {
            let delay = (next - Utc::now()).to_std().unwrap_or_default();
            tokio::time::sleep(delay).await;
            match sweep(&inner, &table).await {
                Some(later) => next = later,
                None => return,
            }
        }
    })
}

/// One pass of the expiration protocol. Pops and evicts everything at or
/// past `now`, discarding tombstones. Returns the next deadline to sleep
/// toward, or `None` when no live deadline remains.
async fn sweep<T: Table>(
    inner: &Arc<RwLock<RegistryInner>>,
    table: &Arc<RwLock<T>>,
) -> Option<DateTime<Utc>> {
    let mut inner = inner.write().await;
    let now = Utc::now();
    loop {
        let (expire_at, tombstone) = match inner.queue.peek() {
            None => {
                inner.timer = None;
                return None;
            }
            Some(root) => (root.expire_at, root.is_tombstone()),
        };

        // stale leftover from a concurrent cancellation
        if tombstone {
            inner.queue.pop();
            continue;
        }

        if expire_at > now {
            if let Some(timer) = inner.timer.as_mut() {
                timer.deadline = expire_at;
            }
            return Some(expire_at);
        }

        if let Some(record) = inner.queue.pop() {
            debug!(key = %record.key, "evicting expired key");
            match table.write().await.unset(&record.key) {
                Ok(_) => {}
                // the entry may have been unset explicitly in the meantime
                Err(CacheError::KeyNotFound(_)) => {}
                Err(err) => {
                    warn!(key = %record.key, error = %err, "couldn't unset key while expiring");
                }
            }
        }
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::table::MemTable;
    use crate::cache::Outcome;
    use std::time::Duration as StdDuration;

    fn table_with(keys: &[(&str, &str)]) -> Arc<RwLock<MemTable>> {
        let mut table = MemTable::new();
        for (key, value) in keys {
            table.set(key, value).unwrap();
        }
        Arc::new(RwLock::new(table))
    }

    #[tokio::test]
    async fn test_register_rejects_non_positive_ttl() {
        let table = table_with(&[("a", "1")]);
        let registry = TtlRegistry::new(table);

        let zero = registry.register("a", Utc::now(), Duration::zero()).await;
        assert!(matches!(zero, Err(CacheError::InvalidTtl(_))));

        let negative = registry
            .register("a", Utc::now(), Duration::seconds(-3))
            .await;
        assert!(matches!(negative, Err(CacheError::InvalidTtl(_))));

        assert!(registry.inner.read().await.queue.is_empty());
    }

    #[tokio::test]
    async fn test_get_ttl_tracks_remaining_time() {
        let table = table_with(&[("a", "1")]);
        let registry = TtlRegistry::new(table);

        registry
            .register("a", Utc::now(), Duration::seconds(5))
            .await
            .unwrap();

        let remaining = registry.get_ttl("a").await.unwrap();
        assert!(remaining <= Duration::seconds(5));
        assert!(remaining > Duration::seconds(4));
    }

    #[tokio::test]
    async fn test_get_ttl_missing() {
        let table = table_with(&[]);
        let registry = TtlRegistry::new(table);

        let result = registry.get_ttl("a").await;
        assert!(matches!(result, Err(CacheError::TtlNotFound(key)) if key == "a"));
    }

    #[tokio::test]
    async fn test_unregister_missing() {
        let table = table_with(&[]);
        let registry = TtlRegistry::new(table);

        let result = registry.unregister("a").await;
        assert!(matches!(result, Err(CacheError::KeyNotFound(_))));
    }

    #[tokio::test]
    async fn test_unregister_leaves_entry_in_table() {
        let table = table_with(&[("a", "1")]);
        let registry = TtlRegistry::new(Arc::clone(&table));

        registry
            .register("a", Utc::now(), Duration::milliseconds(100))
            .await
            .unwrap();
        registry.unregister("a").await.unwrap();

        tokio::time::sleep(StdDuration::from_millis(300)).await;

        let outcome = table.read().await.get("a").unwrap();
        assert!(matches!(outcome, Outcome::Retrieved(_)));
        assert!(matches!(
            registry.get_ttl("a").await,
            Err(CacheError::TtlNotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_expiration_evicts_from_table_and_index() {
        let table = table_with(&[("a", "1")]);
        let registry = TtlRegistry::new(Arc::clone(&table));

        registry
            .register("a", Utc::now(), Duration::milliseconds(200))
            .await
            .unwrap();

        tokio::time::sleep(StdDuration::from_millis(500)).await;

        assert!(table.read().await.get("a").is_err());
        assert!(!registry.inner.read().await.queue.contains("a"));
        assert!(registry.inner.read().await.timer.is_none());
    }

    #[tokio::test]
    async fn test_earliest_deadline_fires_first() {
        let table = table_with(&[("soon", "1"), ("later", "2")]);
        let registry = TtlRegistry::new(Arc::clone(&table));

        let now = Utc::now();
        registry
            .register("later", now, Duration::seconds(60))
            .await
            .unwrap();
        registry
            .register("soon", now, Duration::milliseconds(150))
            .await
            .unwrap();

        tokio::time::sleep(StdDuration::from_millis(400)).await;

        assert!(table.read().await.get("soon").is_err());
        assert!(table.read().await.get("later").is_ok());
        assert!(registry.inner.read().await.queue.contains("later"));
    }

    #[tokio::test]
    async fn test_re_registration_extends_deadline() {
        let table = table_with(&[("a", "1")]);
        let registry = TtlRegistry::new(Arc::clone(&table));

        let now = Utc::now();
        registry
            .register("a", now, Duration::milliseconds(150))
            .await
            .unwrap();
        registry
            .register("a", now, Duration::seconds(60))
            .await
            .unwrap();

        tokio::time::sleep(StdDuration::from_millis(400)).await;

        assert!(table.read().await.get("a").is_ok());
        assert_eq!(registry.inner.read().await.queue.len(), 1);
    }

    #[tokio::test]
    async fn test_reset_disarms_timer() {
        let table = table_with(&[("a", "1")]);
        let registry = TtlRegistry::new(Arc::clone(&table));

        registry
            .register("a", Utc::now(), Duration::milliseconds(100))
            .await
            .unwrap();
        registry.reset().await;

        tokio::time::sleep(StdDuration::from_millis(300)).await;

        assert!(table.read().await.get("a").is_ok());
        assert!(registry.inner.read().await.queue.is_empty());
        assert!(registry.inner.read().await.timer.is_none());
    }

    #[tokio::test]
    async fn test_sweep_ignores_already_unset_key() {
        let table = table_with(&[("a", "1")]);
        let registry = TtlRegistry::new(Arc::clone(&table));

        registry
            .register("a", Utc::now(), Duration::milliseconds(150))
            .await
            .unwrap();
        table.write().await.unset("a").unwrap();

        tokio::time::sleep(StdDuration::from_millis(400)).await;

        assert!(registry.inner.read().await.queue.is_empty());
    }

    /// A store whose unset always fails, to show the sweep logs and moves
    /// on instead of aborting.
    struct FlakyTable;

    impl Table for FlakyTable {
        fn set(&mut self, key: &str, value: &str) -> crate::error::Result<Outcome> {
            Ok(Outcome::Created(crate::cache::Entry::new(key, value)))
        }

        fn unset(&mut self, _key: &str) -> crate::error::Result<Outcome> {
            Err(CacheError::Tokenize(shell_words::ParseError))
        }

        fn get(&self, key: &str) -> crate::error::Result<Outcome> {
            Err(CacheError::KeyNotFound(key.to_string()))
        }

        fn clear(&mut self) {}
    }

    #[tokio::test]
    async fn test_sweep_continues_past_unset_failure() {
        let table = Arc::new(RwLock::new(FlakyTable));
        let registry = TtlRegistry::new(table);

        let now = Utc::now();
        registry
            .register("a", now, Duration::milliseconds(100))
            .await
            .unwrap();
        registry
            .register("b", now, Duration::milliseconds(120))
            .await
            .unwrap();

        tokio::time::sleep(StdDuration::from_millis(400)).await;

        // both records drained despite the failing unsets
        assert!(registry.inner.read().await.queue.is_empty());
    }
}
