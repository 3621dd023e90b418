//! Injectable query cache keyed by operation and resolved parameters.

use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, Mutex as SyncMutex, PoisonError};
use std::time::{Duration, Instant};
use tokio::sync::{Mutex, RwLock};

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct QueryKey {
    pub operation: &'static str,
    pub params: Vec<String>,
}

impl QueryKey {
    pub fn new<I, S>(operation: &'static str, params: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            operation,
            params: params.into_iter().map(Into::into).collect(),
        }
    }
}

struct CacheEntry<V> {
    value: V,
    stored_at: Instant,
}

type InFlight = Arc<SyncMutex<HashMap<QueryKey, Arc<Mutex<()>>>>>;

/// A caller's claim on the per-key fetch lock. The last claim to go away removes the
/// map entry, whether the fetch finished or its future was dropped.
struct InFlightSlot {
    key: QueryKey,
    lock: Arc<Mutex<()>>,
    in_flight: InFlight,
}

impl InFlightSlot {
    fn claim(in_flight: &InFlight, key: &QueryKey) -> Self {
        let mut map = in_flight.lock().unwrap_or_else(PoisonError::into_inner);
        let lock = map
            .entry(key.clone())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone();
        Self {
            key: key.clone(),
            lock,
            in_flight: in_flight.clone(),
        }
    }
}

impl Drop for InFlightSlot {
    fn drop(&mut self) {
        let mut map = self.in_flight.lock().unwrap_or_else(PoisonError::into_inner);
        // Two references left: the map's and ours.
        let last_claim = map
            .get(&self.key)
            .is_some_and(|entry| Arc::ptr_eq(entry, &self.lock))
            && Arc::strong_count(&self.lock) <= 2;
        if last_claim {
            map.remove(&self.key);
        }
    }
}

/// Values older than `ttl` are refetched on the next read.
pub struct QueryCache<V> {
    ttl: Duration,
    entries: Arc<RwLock<HashMap<QueryKey, CacheEntry<V>>>>,
    in_flight: InFlight,
}

impl<V> Clone for QueryCache<V> {
    fn clone(&self) -> Self {
        Self {
            ttl: self.ttl,
            entries: self.entries.clone(),
            in_flight: self.in_flight.clone(),
        }
    }
}

impl<V: Clone + Send + Sync> QueryCache<V> {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: Arc::new(RwLock::new(HashMap::new())),
            in_flight: Arc::new(SyncMutex::new(HashMap::new())),
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Stale entries are removed on sight.
    pub async fn get(&self, key: &QueryKey) -> Option<V> {
        {
            let entries = self.entries.read().await;
            match entries.get(key) {
                None => return None,
                Some(entry) if entry.stored_at.elapsed() < self.ttl => {
                    return Some(entry.value.clone())
                }
                Some(_) => {}
            }
        }

        let mut entries = self.entries.write().await;
        if entries
            .get(key)
            .is_some_and(|entry| entry.stored_at.elapsed() >= self.ttl)
        {
            entries.remove(key);
        }
        None
    }

    /// Also sweeps every expired entry, so the map only holds live keys.
    pub async fn insert(&self, key: QueryKey, value: V) {
        let ttl = self.ttl;
        let mut entries = self.entries.write().await;
        entries.retain(|_, entry| entry.stored_at.elapsed() < ttl);
        entries.insert(
            key,
            CacheEntry {
                value,
                stored_at: Instant::now(),
            },
        );
    }

    /// Returns the cached value or runs `fetch`; concurrent callers for the same key
    /// wait on the first fetch instead of issuing their own.
    pub async fn get_or_fetch<F, Fut>(&self, key: QueryKey, fetch: F) -> V
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = V>,
    {
        if let Some(value) = self.get(&key).await {
            return value;
        }

        let slot = InFlightSlot::claim(&self.in_flight, &key);
        let _guard = slot.lock.lock().await;

        if let Some(value) = self.get(&key).await {
            return value;
        }

        let value = fetch().await;
        self.insert(key, value.clone()).await;
        value
    }

    pub async fn invalidate(&self, key: &QueryKey) {
        self.entries.write().await.remove(key);
    }

    pub async fn invalidate_operation(&self, operation: &str) {
        self.entries
            .write()
            .await
            .retain(|key, _| key.operation != operation);
    }

    pub async fn clear(&self) {
        self.entries.write().await.clear();
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    #[cfg(test)]
    fn in_flight_len(&self) -> usize {
        self.in_flight
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[tokio::test]
    async fn fresh_entries_are_served_from_cache() {
        let cache = QueryCache::new(Duration::from_secs(60));
        let counter = AtomicUsize::new(0);
        let calls = &counter;
        let key = QueryKey::new("app-state", ["0xfa", "null"]);

        for _ in 0..3 {
            let value = cache
                .get_or_fetch(key.clone(), move || async move {
                    calls.fetch_add(1, Ordering::SeqCst);
                    7_u32
                })
                .await;
            assert_eq!(value, 7);
        }
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn expired_entries_are_refetched() {
        let cache = QueryCache::new(Duration::from_millis(0));
        let counter = AtomicUsize::new(0);
        let calls = &counter;
        let key = QueryKey::new("app-state", ["0xfa"]);

        for _ in 0..2 {
            cache
                .get_or_fetch(key.clone(), move || async move {
                    calls.fetch_add(1, Ordering::SeqCst)
                })
                .await;
        }
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn invalidation_drops_matching_entries() {
        let cache = QueryCache::new(Duration::from_secs(60));
        cache.insert(QueryKey::new("app-state", ["a"]), 1).await;
        cache.insert(QueryKey::new("app-state", ["b"]), 2).await;
        cache.insert(QueryKey::new("fa-metadata", ["a"]), 3).await;

        cache.invalidate(&QueryKey::new("app-state", ["a"])).await;
        assert_eq!(cache.get(&QueryKey::new("app-state", ["a"])).await, None);
        assert_eq!(cache.len().await, 2);

        cache.invalidate_operation("app-state").await;
        assert_eq!(cache.len().await, 1);

        cache.clear().await;
        assert_eq!(cache.len().await, 0);
    }

    #[tokio::test]
    async fn concurrent_reads_share_one_fetch() {
        let cache = QueryCache::new(Duration::from_secs(60));
        let calls = Arc::new(AtomicUsize::new(0));
        let key = QueryKey::new("app-state", ["0xfa"]);

        let tasks: Vec<_> = (0..4)
            .map(|_| {
                let cache = cache.clone();
                let calls = calls.clone();
                let key = key.clone();
                tokio::spawn(async move {
                    cache
                        .get_or_fetch(key, move || async move {
                            tokio::time::sleep(Duration::from_millis(20)).await;
                            calls.fetch_add(1, Ordering::SeqCst);
                            "snapshot".to_string()
                        })
                        .await
                })
            })
            .collect();

        for task in tasks {
            assert_eq!(task.await.expect("task"), "snapshot");
        }
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(cache.in_flight_len(), 0);
    }

    #[tokio::test]
    async fn expired_keys_do_not_accumulate() {
        let cache = QueryCache::new(Duration::from_millis(0));
        for i in 0..1000 {
            let key = QueryKey::new("app-state", ["0xfa".to_string(), format!("0x{i:x}")]);
            cache.get_or_fetch(key, || async move { i }).await;
        }
        assert!(cache.len().await <= 1);
        assert_eq!(cache.in_flight_len(), 0);
    }

    #[tokio::test]
    async fn stale_entry_is_removed_on_read() {
        let cache = QueryCache::new(Duration::from_millis(0));
        let key = QueryKey::new("app-state", ["0xfa"]);
        cache.insert(key.clone(), 1).await;
        assert_eq!(cache.get(&key).await, None);
        assert_eq!(cache.len().await, 0);
    }

    #[tokio::test]
    async fn abandoned_fetch_releases_its_key() {
        let cache: QueryCache<u32> = QueryCache::new(Duration::from_secs(60));
        let key = QueryKey::new("app-state", ["0xfa"]);

        let abandoned = tokio::time::timeout(
            Duration::from_millis(10),
            cache.get_or_fetch(key.clone(), || async {
                tokio::time::sleep(Duration::from_secs(5)).await;
                1
            }),
        )
        .await;
        assert!(abandoned.is_err());
        assert_eq!(cache.in_flight_len(), 0);

        let value = cache.get_or_fetch(key, || async { 2 }).await;
        assert_eq!(value, 2);
        assert_eq!(cache.in_flight_len(), 0);
    }
}
