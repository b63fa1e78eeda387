//! In-memory read-through cache.
//!
//! A [`ReadThroughCache`] memoizes the result of an async loader. The cache
//! key is derived from the operation input by the [`CachePolicy`], and the
//! policy's `store_if` predicate decides whether a freshly loaded value is
//! kept. Failed loads are never stored.
//!
//! Entries live in a sharded `DashMap`; no shard lock is held across an
//! `.await`. Two concurrent misses on the same key both run the loader.

use std::future::Future;
use std::hash::Hash;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

use dashmap::DashMap;

/// How a cache derives its key and which loaded values it keeps.
pub struct CachePolicy<I: ?Sized, K, V> {
    pub key: fn(&I) -> K,
    pub store_if: fn(&V) -> bool,
}

impl<I: ?Sized, K, V> Clone for CachePolicy<I, K, V> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<I: ?Sized, K, V> Copy for CachePolicy<I, K, V> {}

/// Cache statistics for monitoring.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub size: usize,
    pub hits: u64,
    pub misses: u64,
    pub evictions: u64,
}

struct CachedEntry<V> {
    value: V,
    expires_at: Instant,
}

pub struct ReadThroughCache<I: ?Sized, K, V> {
    name: &'static str,
    entries: DashMap<K, CachedEntry<V>>,
    policy: CachePolicy<I, K, V>,
    ttl: Duration,
    hits: AtomicU64,
    misses: AtomicU64,
    evictions: AtomicU64,
}

impl<I, K, V> ReadThroughCache<I, K, V>
where
    I: ?Sized,
    K: Eq + Hash + Clone + std::fmt::Debug,
    V: Clone,
{
    pub fn new(name: &'static str, policy: CachePolicy<I, K, V>, ttl: Duration) -> Self {
        Self {
            name,
            entries: DashMap::new(),
            policy,
            ttl,
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
            evictions: AtomicU64::new(0),
        }
    }

    /// Return the cached value for `input`, or run `load` and store its
    /// result when the policy allows it.
    pub async fn get_or_load<F, Fut, E>(&self, input: &I, load: F) -> Result<V, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<V, E>>,
    {
        let key = (self.policy.key)(input);

        if let Some(value) = self.get(&key) {
            tracing::debug!(cache = self.name, key = ?key, "Cache hit");
            return Ok(value);
        }
        tracing::debug!(cache = self.name, key = ?key, "Cache miss");

        let value = load().await?;

        if (self.policy.store_if)(&value) {
            self.entries.insert(
                key,
                CachedEntry {
                    value: value.clone(),
                    expires_at: Instant::now() + self.ttl,
                },
            );
        }

        Ok(value)
    }

    /// Fresh cached value for `key`, counting the hit or miss.
    pub fn get(&self, key: &K) -> Option<V> {
        let now = Instant::now();

        if let Some(entry) = self.entries.get(key) {
            if entry.expires_at > now {
                self.hits.fetch_add(1, Ordering::Relaxed);
                return Some(entry.value.clone());
            }
            drop(entry);
            self.entries.remove_if(key, |_, entry| entry.expires_at <= now);
            self.evictions.fetch_add(1, Ordering::Relaxed);
        }

        self.misses.fetch_add(1, Ordering::Relaxed);
        None
    }

    pub fn invalidate_all(&self) {
        let stats = self.stats();
        self.entries.clear();
        if stats.size > 0 {
            tracing::debug!(
                cache = self.name,
                removed = stats.size,
                hits = stats.hits,
                misses = stats.misses,
                evictions = stats.evictions,
                "Cache cleared"
            );
        }
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            size: self.entries.len(),
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            evictions: self.evictions.load(Ordering::Relaxed),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;
    use std::sync::Arc;

    fn identity(input: &str) -> String {
        input.to_string()
    }

    fn always(_: &Option<u32>) -> bool {
        true
    }

    fn non_empty(value: &Vec<u32>) -> bool {
        !value.is_empty()
    }

    #[tokio::test]
    async fn test_second_lookup_is_served_from_cache() {
        let cache = ReadThroughCache::new(
            "test",
            CachePolicy {
                key: identity,
                store_if: always,
            },
            Duration::from_secs(60),
        );
        let loads = AtomicUsize::new(0);

        for _ in 0..3 {
            let value: Result<Option<u32>, ()> = cache
                .get_or_load("a", || async {
                    loads.fetch_add(1, Ordering::SeqCst);
                    Ok(Some(7))
                })
                .await;
            assert_eq!(value, Ok(Some(7)));
        }

        assert_eq!(loads.load(Ordering::SeqCst), 1);
        let stats = cache.stats();
        assert_eq!(stats.hits, 2);
        assert_eq!(stats.misses, 1);
        assert_eq!(stats.size, 1);
    }

    #[tokio::test]
    async fn test_absent_values_are_cached() {
        let cache = ReadThroughCache::new(
            "test",
            CachePolicy {
                key: identity,
                store_if: always,
            },
            Duration::from_secs(60),
        );
        let loads = AtomicUsize::new(0);

        for _ in 0..2 {
            let _: Result<Option<u32>, ()> = cache
                .get_or_load("missing", || async {
                    loads.fetch_add(1, Ordering::SeqCst);
                    Ok(None)
                })
                .await;
        }

        assert_eq!(loads.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_rejected_values_are_reloaded() {
        let cache = ReadThroughCache::new(
            "test",
            CachePolicy {
                key: identity,
                store_if: non_empty,
            },
            Duration::from_secs(60),
        );
        let loads = AtomicUsize::new(0);

        for _ in 0..3 {
            let _: Result<Vec<u32>, ()> = cache
                .get_or_load("empty", || async {
                    loads.fetch_add(1, Ordering::SeqCst);
                    Ok(Vec::new())
                })
                .await;
        }

        assert_eq!(loads.load(Ordering::SeqCst), 3);
        assert_eq!(cache.stats().size, 0);
    }

    #[tokio::test]
    async fn test_failed_loads_are_not_stored() {
        let cache = ReadThroughCache::new(
            "test",
            CachePolicy {
                key: identity,
                store_if: always,
            },
            Duration::from_secs(60),
        );

        let failed: Result<Option<u32>, &str> = cache.get_or_load("k", || async { Err("down") }).await;
        assert_eq!(failed, Err("down"));

        let loaded: Result<Option<u32>, &str> = cache.get_or_load("k", || async { Ok(Some(1)) }).await;
        assert_eq!(loaded, Ok(Some(1)));
    }

    #[tokio::test]
    async fn test_expired_entries_are_evicted() {
        let cache = ReadThroughCache::new(
            "test",
            CachePolicy {
                key: identity,
                store_if: always,
            },
            Duration::ZERO,
        );

        let _: Result<Option<u32>, ()> = cache.get_or_load("k", || async { Ok(Some(1)) }).await;
        let reloaded: Result<Option<u32>, ()> = cache.get_or_load("k", || async { Ok(Some(2)) }).await;

        assert_eq!(reloaded, Ok(Some(2)));
        assert_eq!(cache.stats().evictions, 1);
    }

    #[tokio::test]
    async fn test_invalidate_all_forces_reload() {
        let cache = ReadThroughCache::new(
            "test",
            CachePolicy {
                key: identity,
                store_if: always,
            },
            Duration::from_secs(60),
        );

        let _: Result<Option<u32>, ()> = cache.get_or_load("k", || async { Ok(Some(1)) }).await;
        cache.invalidate_all();
        let reloaded: Result<Option<u32>, ()> = cache.get_or_load("k", || async { Ok(Some(2)) }).await;

        assert_eq!(reloaded, Ok(Some(2)));
    }

    #[tokio::test]
    async fn test_concurrent_lookups_share_entries() {
        let cache = Arc::new(ReadThroughCache::new(
            "test",
            CachePolicy {
                key: identity,
                store_if: always,
            },
            Duration::from_secs(60),
        ));

        let mut tasks = Vec::new();
        for i in 0..32u32 {
            let cache = Arc::clone(&cache);
            tasks.push(tokio::spawn(async move {
                let key = format!("k{}", i % 4);
                let value: Result<Option<u32>, ()> =
                    cache.get_or_load(&key, || async move { Ok(Some(i % 4)) }).await;
                value
            }));
        }

        for task in tasks {
            let value = task.await.unwrap().unwrap();
            assert!(value.is_some());
        }
        assert_eq!(cache.stats().size, 4);
    }
}
