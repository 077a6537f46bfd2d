//! Keyed result cache with size cap and optional TTL (spec §4.1 C3, §8
//! invariant 4).
//!
//! Grounded on `original_source/stockx/cache.py`'s `_CacheDecorator`.
//! Rust has no runtime signature introspection, so callers supply an
//! explicit, hashable key type per cached function rather than a parameter
//! name list (design note §9).

use std::collections::{HashMap, VecDeque};
use std::hash::Hash;
use std::time::{Duration, Instant};

use tokio::sync::Mutex;

struct Entry<V> {
    value: V,
    inserted_at: Instant,
}

/// A cache never stores an error outcome: callers only insert on success.
pub struct Cache<K, V> {
    max_size: usize,
    ttl: Option<Duration>,
    entries: Mutex<HashMap<K, Entry<V>>>,
    order: Mutex<VecDeque<K>>,
}

impl<K, V> Cache<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    pub fn new(max_size: usize, ttl: Option<Duration>) -> Self {
        Self {
            max_size,
            ttl,
            entries: Mutex::new(HashMap::new()),
            order: Mutex::new(VecDeque::new()),
        }
    }

    pub fn unbounded(ttl: Option<Duration>) -> Self {
        Self::new(usize::MAX, ttl)
    }

    /// Return the cached value for `key` if present and not expired.
    pub async fn get(&self, key: &K) -> Option<V> {
        let entries = self.entries.lock().await;
        let entry = entries.get(key)?;
        if let Some(ttl) = self.ttl {
            if entry.inserted_at.elapsed() > ttl {
                return None;
            }
        }
        Some(entry.value.clone())
    }

    /// Insert `value` for `key`, evicting the oldest-inserted entry if the
    /// cache is at capacity. Insertion-order eviction, not strict LRU, per
    /// spec §4.1 ("acceptable; strict LRU is not required").
    pub async fn insert(&self, key: K, value: V) {
        let mut entries = self.entries.lock().await;
        let mut order = self.order.lock().await;

        if !entries.contains_key(&key) {
            order.push_back(key.clone());
        }
        entries.insert(
            key,
            Entry {
                value,
                inserted_at: Instant::now(),
            },
        );

        while entries.len() > self.max_size {
            if let Some(oldest) = order.pop_front() {
                entries.remove(&oldest);
            } else {
                break;
            }
        }
    }

    /// Fetch-or-compute: returns the cached value, or runs `f`, caches its
    /// success, and returns it. Errors are never cached (spec §4.1).
    pub async fn get_or_insert_with<F, Fut, E>(&self, key: K, f: F) -> Result<V, E>
    where
        F: FnOnce() -> Fut,
        Fut: std::future::Future<Output = Result<V, E>>,
    {
        if let Some(value) = self.get(&key).await {
            return Ok(value);
        }
        let value = f().await?;
        self.insert(key, value.clone()).await;
        Ok(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn returns_cached_value_without_recomputing() {
        let cache: Cache<&str, u32> = Cache::unbounded(None);
        let calls = std::sync::atomic::AtomicU32::new(0);

        for _ in 0..3 {
            cache
                .get_or_insert_with("k", || {
                    calls.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
                    async { Ok::<_, ()>(7) }
                })
                .await
                .unwrap();
        }

        assert_eq!(calls.load(std::sync::atomic::Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn expires_entries_past_ttl() {
        let cache: Cache<&str, u32> = Cache::unbounded(Some(Duration::from_millis(10)));
        cache.insert("k", 1).await;
        assert_eq!(cache.get(&"k").await, Some(1));
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert_eq!(cache.get(&"k").await, None);
    }

    #[tokio::test]
    async fn evicts_oldest_inserted_when_full() {
        let cache: Cache<&str, u32> = Cache::new(2, None);
        cache.insert("a", 1).await;
        cache.insert("b", 2).await;
        cache.insert("c", 3).await;

        assert_eq!(cache.get(&"a").await, None);
        assert_eq!(cache.get(&"b").await, Some(2));
        assert_eq!(cache.get(&"c").await, Some(3));
    }

    #[tokio::test]
    async fn never_caches_an_error() {
        let cache: Cache<&str, u32> = Cache::unbounded(None);
        let first: Result<u32, &str> = cache.get_or_insert_with("k", || async { Err("boom") }).await;
        assert!(first.is_err());
        assert_eq!(cache.get(&"k").await, None);
    }
}
