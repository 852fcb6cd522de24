//! Generic request-deduplicating read cache.
//!
//! A thin wrapper over `moka`'s future cache, constructed in `AppState` and
//! handed to the services that need it. Nothing here is process-global: every
//! consumer receives its cache explicitly, which keeps lifecycle and tests
//! under the caller's control.
//!
//! Concurrent readers of one key share a single in-flight fetch, so N
//! simultaneous consumers of an unresolved entry trigger exactly one
//! underlying request.

use std::future::Future;
use std::hash::Hash;
use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache;

/// A key-to-value read cache with request de-duplication.
///
/// Cloning is cheap and clones share the same underlying store.
#[derive(Clone)]
pub struct QueryCache<K, V> {
    inner: Cache<K, V>,
}

impl<K, V> QueryCache<K, V>
where
    K: Hash + Eq + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
{
    /// Create a cache.
    ///
    /// * `time_to_live` - staleness window: after this, the next read
    ///   re-fetches.
    /// * `time_to_idle` - entries unread for this long are evicted.
    #[must_use]
    pub fn new(time_to_live: Duration, time_to_idle: Duration, max_capacity: u64) -> Self {
        Self {
            inner: Cache::builder()
                .max_capacity(max_capacity)
                .time_to_live(time_to_live)
                .time_to_idle(time_to_idle)
                .build(),
        }
    }

    /// Get a fresh cached value, if present.
    pub async fn get(&self, key: &K) -> Option<V> {
        self.inner.get(key).await
    }

    /// Get the cached value, or run `init` to produce it.
    ///
    /// Concurrent callers for the same key share one execution of `init`.
    pub async fn get_with(&self, key: K, init: impl Future<Output = V>) -> V {
        self.inner.get_with(key, init).await
    }

    /// Fallible variant of [`get_with`](Self::get_with). A failed `init` is
    /// not cached; its error is shared (via `Arc`) with every waiter.
    pub async fn try_get_with<E>(
        &self,
        key: K,
        init: impl Future<Output = Result<V, E>>,
    ) -> Result<V, Arc<E>>
    where
        E: Send + Sync + 'static,
    {
        self.inner.try_get_with(key, init).await
    }

    /// Overwrite the cached value without triggering a fetch (optimistic
    /// seed after a mutation).
    pub async fn insert(&self, key: K, value: V) {
        self.inner.insert(key, value).await;
    }

    /// Mark a key stale, forcing the next read to re-fetch.
    pub async fn invalidate(&self, key: &K) {
        self.inner.invalidate(key).await;
    }

    /// Flush every entry.
    pub fn invalidate_all(&self) {
        self.inner.invalidate_all();
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn cache() -> QueryCache<String, i32> {
        QueryCache::new(Duration::from_secs(300), Duration::from_secs(600), 100)
    }

    #[tokio::test]
    async fn test_concurrent_readers_share_one_fetch() {
        let cache = cache();
        let fetches = Arc::new(AtomicUsize::new(0));

        let mut handles = Vec::new();
        for _ in 0..10 {
            let cache = cache.clone();
            let fetches = Arc::clone(&fetches);
            handles.push(tokio::spawn(async move {
                cache
                    .get_with("k".to_owned(), async {
                        fetches.fetch_add(1, Ordering::SeqCst);
                        // Hold the fetch open so other readers pile up on it
                        tokio::time::sleep(Duration::from_millis(20)).await;
                        42
                    })
                    .await
            }));
        }

        for handle in handles {
            assert_eq!(handle.await.unwrap(), 42);
        }
        assert_eq!(fetches.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_insert_overwrites_without_fetch() {
        let cache = cache();
        cache.insert("k".to_owned(), 1).await;
        assert_eq!(cache.get(&"k".to_owned()).await, Some(1));

        cache.insert("k".to_owned(), 2).await;
        let got = cache.get_with("k".to_owned(), async { 99 }).await;
        assert_eq!(got, 2);
    }

    #[tokio::test]
    async fn test_invalidate_forces_refetch() {
        let cache = cache();
        let fetches = Arc::new(AtomicUsize::new(0));

        for _ in 0..2 {
            let fetches = Arc::clone(&fetches);
            cache
                .get_with("k".to_owned(), async move {
                    fetches.fetch_add(1, Ordering::SeqCst);
                    7
                })
                .await;
        }
        assert_eq!(fetches.load(Ordering::SeqCst), 1);

        cache.invalidate(&"k".to_owned()).await;
        let fetches2 = Arc::clone(&fetches);
        cache
            .get_with("k".to_owned(), async move {
                fetches2.fetch_add(1, Ordering::SeqCst);
                7
            })
            .await;
        assert_eq!(fetches.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_failed_fetch_is_not_cached() {
        let cache = cache();

        let err: Result<i32, Arc<String>> = cache
            .try_get_with("k".to_owned(), async { Err("boom".to_owned()) })
            .await;
        assert!(err.is_err());

        let ok = cache
            .try_get_with("k".to_owned(), async { Ok::<_, String>(5) })
            .await;
        assert_eq!(ok.unwrap(), 5);
    }
}
