//! Generic key/value store with per-entry expiry
//!
//! Reads never remove expired entries; removal happens in the periodic
//! sweep or through explicit deletes, so the hot read path only ever takes
//! the shared lock.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use std::time::{Duration, Instant};

/// A cached value with its expiration time
#[derive(Debug, Clone)]
struct CacheEntry<V> {
    value: V,
    expires_at: Instant,
}

impl<V> CacheEntry<V> {
    fn is_expired(&self, now: Instant) -> bool {
        now >= self.expires_at
    }
}

/// In-memory cache with TTL support
///
/// Safe for concurrent access from the input thread and the sweeper task.
/// Key cardinality is low (tens of keys) and every operation is a single
/// map access, so a shared-read/exclusive-write lock over the whole map is
/// sufficient.
#[derive(Debug, Default)]
pub struct TtlCache<V> {
    entries: RwLock<HashMap<String, CacheEntry<V>>>,
}

impl<V: Clone> TtlCache<V> {
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
        }
    }

    /// Retrieve a value, treating expired entries as absent.
    ///
    /// An expired-but-present entry is left in place; deleting here would
    /// need the write lock on the read path. The sweeper reclaims it.
    pub fn get(&self, key: &str) -> Option<V> {
        let entries = self.entries.read().unwrap();
        let entry = entries.get(key)?;
        if entry.is_expired(Instant::now()) {
            return None;
        }
        Some(entry.value.clone())
    }

    /// Store a value, unconditionally overwriting any previous entry.
    pub fn set(&self, key: &str, value: V, ttl: Duration) {
        let mut entries = self.entries.write().unwrap();
        entries.insert(
            key.to_string(),
            CacheEntry {
                value,
                expires_at: Instant::now() + ttl,
            },
        );
    }

    /// Remove a key. Removing an absent key is not an error.
    pub fn delete(&self, key: &str) {
        let mut entries = self.entries.write().unwrap();
        entries.remove(key);
    }

    /// Remove every entry.
    pub fn clear(&self) {
        let mut entries = self.entries.write().unwrap();
        entries.clear();
    }

    /// Remove entries whose key matches the predicate, returning the count.
    pub fn remove_where<F>(&self, mut pred: F) -> usize
    where
        F: FnMut(&str) -> bool,
    {
        let mut entries = self.entries.write().unwrap();
        let before = entries.len();
        entries.retain(|key, _| !pred(key));
        before - entries.len()
    }

    /// Remove all entries whose expiry has passed, returning the count.
    pub fn remove_expired(&self) -> usize {
        let now = Instant::now();
        let mut entries = self.entries.write().unwrap();
        let before = entries.len();
        entries.retain(|_, entry| !entry.is_expired(now));
        before - entries.len()
    }

    /// Number of stored entries, expired ones included.
    pub fn len(&self) -> usize {
        self.entries.read().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<V: Clone + Send + Sync + 'static> TtlCache<V> {
    /// Spawn the background sweep task.
    ///
    /// The sweep interval is independent of any individual TTL. The handle
    /// is returned so the caller controls the task's lifetime; dropping it
    /// detaches the sweeper for the remainder of the process.
    pub fn spawn_sweeper(self: &Arc<Self>, interval: Duration) -> tokio::task::JoinHandle<()> {
        let cache = Arc::clone(self);
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                let removed = cache.remove_expired();
                if removed > 0 {
                    tracing::debug!("cache sweep removed {} expired entr(ies)", removed);
                }
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_and_get() {
        let cache = TtlCache::new();
        cache.set("key", "value".to_string(), Duration::from_secs(60));
        assert_eq!(cache.get("key"), Some("value".to_string()));
        assert_eq!(cache.get("missing"), None);
    }

    #[test]
    fn test_get_reports_expired_as_absent_without_removing() {
        let cache = TtlCache::new();
        cache.set("key", 1u32, Duration::from_millis(10));
        std::thread::sleep(Duration::from_millis(30));

        assert_eq!(cache.get("key"), None);
        // The entry is still physically present until a sweep runs.
        assert_eq!(cache.len(), 1);

        assert_eq!(cache.remove_expired(), 1);
        assert!(cache.is_empty());
    }

    #[test]
    fn test_set_overwrites() {
        let cache = TtlCache::new();
        cache.set("key", 1u32, Duration::from_secs(60));
        cache.set("key", 2u32, Duration::from_secs(60));
        assert_eq!(cache.get("key"), Some(2));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_delete_and_clear() {
        let cache = TtlCache::new();
        cache.set("a", 1u32, Duration::from_secs(60));
        cache.set("b", 2u32, Duration::from_secs(60));

        cache.delete("a");
        cache.delete("a"); // absent key is fine
        assert_eq!(cache.get("a"), None);
        assert_eq!(cache.get("b"), Some(2));

        cache.clear();
        assert!(cache.is_empty());
    }

    #[test]
    fn test_remove_where() {
        let cache = TtlCache::new();
        cache.set("vms:sub1:rg1", 1u32, Duration::from_secs(60));
        cache.set("vms:sub1:rg2", 2u32, Duration::from_secs(60));
        cache.set("aks:sub1:rg1", 3u32, Duration::from_secs(60));

        let removed = cache.remove_where(|key| key.starts_with("vms:"));
        assert_eq!(removed, 2);
        assert_eq!(cache.get("aks:sub1:rg1"), Some(3));
    }
}
