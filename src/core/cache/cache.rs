use std::hash::Hash;
use std::num::NonZeroU64;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, RwLock};
use std::time::Duration;

use ttl_cache::TtlCache;

use super::error::{Error, Result};

pub struct InMemoryCache<K: Hash + Eq, V> {
    data: Arc<RwLock<TtlCache<K, V>>>,
    hits: AtomicUsize,
    miss: AtomicUsize,
}

impl<K: Hash + Eq, V: Clone> Default for InMemoryCache<K, V> {
    fn default() -> Self {
        Self::new(100000)
    }
}

impl<K: Hash + Eq, V: Clone> InMemoryCache<K, V> {
    pub fn new(capacity: usize) -> Self {
        InMemoryCache {
            data: Arc::new(RwLock::new(TtlCache::new(capacity))),
            hits: AtomicUsize::new(0),
            miss: AtomicUsize::new(0),
        }
    }
}

fn poisoned<E>(_: E) -> Error {
    Error::Poisoned("in-memory cache".to_string())
}

#[async_trait::async_trait]
impl<K: Hash + Eq + Send + Sync, V: Clone + Send + Sync> crate::core::Cache
    for InMemoryCache<K, V>
{
    type Key = K;
    type Value = V;

    async fn set<'a>(&'a self, key: K, value: V, ttl: NonZeroU64) -> Result<()> {
        let ttl = Duration::from_millis(ttl.get());
        self.data.write().map_err(poisoned)?.insert(key, value, ttl);
        Ok(())
    }

    async fn get<'a>(&'a self, key: &'a K) -> Result<Option<Self::Value>> {
        let val = self.data.read().map_err(poisoned)?.get(key).cloned();
        if val.is_some() {
            self.hits.fetch_add(1, Ordering::Relaxed);
        } else {
            self.miss.fetch_add(1, Ordering::Relaxed);
        }
        Ok(val)
    }

    async fn del<'a>(&'a self, key: &'a K) -> Result<()> {
        self.data.write().map_err(poisoned)?.remove(key);
        Ok(())
    }

    fn hit_rate(&self) -> Option<f64> {
        let hits = self.hits.load(Ordering::Relaxed);
        let misses = self.miss.load(Ordering::Relaxed);

        if hits + misses > 0 {
            return Some(hits as f64 / (hits + misses) as f64);
        }

        None
    }
}
