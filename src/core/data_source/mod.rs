mod error;
mod key;

use std::future::Future;
use std::num::NonZeroU64;
use std::sync::Arc;

use async_graphql_value::ConstValue;
use dashmap::DashMap;
pub use error::FetchError;
pub use key::FetchKey;

use crate::core::cache::{InMemoryCache, NoopCache};
use crate::core::data_loader::DedupeResult;
use crate::core::Cache;

pub type Store<Value> = Arc<dyn Cache<Key = FetchKey, Value = Value>>;

const DEFAULT_CHANNEL_CAPACITY: usize = 256;

/// Invalidations seen by the loads currently running for a key. The entry
/// only lives while at least one load is running.
#[derive(Default)]
struct Generation {
    value: u64,
    loads: usize,
}

/// Unregisters a running load, even when its future is dropped.
struct LoadGuard<'a> {
    generations: &'a DashMap<FetchKey, Generation>,
    key: &'a FetchKey,
}

impl Drop for LoadGuard<'_> {
    fn drop(&mut self) {
        if let Some(mut generation) = self.generations.get_mut(self.key) {
            generation.loads = generation.loads.saturating_sub(1);
        }
        self.generations
            .remove_if(self.key, |_, generation| generation.loads == 0);
    }
}

/// Fetch layer used by resolvers to reach external resources.
///
/// Concurrent fetches of the same [`FetchKey`] share one outbound call and
/// successful results are kept in a pluggable [`Store`] for their TTL.
/// Failures are handed to every caller waiting on the same call but are
/// never stored.
pub struct DataSource<Value = ConstValue> {
    store: Store<Value>,
    in_flight: DedupeResult<FetchKey, Value, FetchError>,
    generations: DashMap<FetchKey, Generation>,
    ttl: NonZeroU64,
    dedupe: bool,
}

impl<Value: Clone + Send + Sync + 'static> DataSource<Value> {
    pub fn new(store: Store<Value>, ttl: NonZeroU64) -> Self {
        Self {
            store,
            in_flight: DedupeResult::new(DEFAULT_CHANNEL_CAPACITY),
            generations: DashMap::new(),
            ttl,
            dedupe: true,
        }
    }

    /// Shares values across every request that holds this data source.
    pub fn in_memory(capacity: usize, ttl: NonZeroU64) -> Self {
        Self::new(Arc::new(InMemoryCache::new(capacity)), ttl)
    }

    /// Coalesces in-flight calls only; nothing outlives the call.
    pub fn request_scoped() -> Self {
        Self::new(Arc::new(NoopCache::default()), NonZeroU64::MIN)
    }

    pub fn dedupe(mut self, dedupe: bool) -> Self {
        self.dedupe = dedupe;
        self
    }

    pub fn channel_capacity(mut self, capacity: usize) -> Self {
        self.in_flight = DedupeResult::new(capacity);
        self
    }

    pub fn ttl(&self) -> NonZeroU64 {
        self.ttl
    }

    /// Returns the value for `key`, running `fetch` only when no stored
    /// value exists and no other caller is already fetching it.
    #[tracing::instrument(skip_all, fields(key = %key))]
    pub async fn fetch<F, Fut>(&self, key: &FetchKey, fetch: F) -> Result<Value, FetchError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Value, FetchError>>,
    {
        if let Some(value) = self.lookup(key).await {
            tracing::debug!("cache hit");
            return Ok(value);
        }

        if self.dedupe {
            self.in_flight.dedupe(key, || self.load(key, fetch)).await
        } else {
            self.load(key, fetch).await
        }
    }

    /// Forces the next fetch of `key` to go upstream. Fetches of `key` that
    /// are still in flight keep serving their current waiters but will not
    /// populate the store.
    pub async fn invalidate(&self, key: &FetchKey) -> Result<(), FetchError> {
        if let Some(mut generation) = self.generations.get_mut(key) {
            generation.value += 1;
        }
        self.in_flight.detach(key);
        self.store.del(key).await?;
        tracing::debug!(key = %key, "invalidated");
        Ok(())
    }

    pub fn hit_rate(&self) -> Option<f64> {
        self.store.hit_rate()
    }

    async fn load<F, Fut>(&self, key: &FetchKey, fetch: F) -> Result<Value, FetchError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Value, FetchError>>,
    {
        // A previous leader may have stored the value between our miss and
        // taking the lead.
        if let Some(value) = self.lookup(key).await {
            return Ok(value);
        }

        let generation = {
            let mut entry = self.generations.entry(key.clone()).or_default();
            entry.loads += 1;
            entry.value
        };
        let _guard = LoadGuard { generations: &self.generations, key };

        let value = fetch().await.inspect_err(|error| {
            tracing::warn!(key = %key, %error, "fetch failed");
        })?;

        if self.generation(key) == generation {
            if let Err(error) = self.store.set(key.clone(), value.clone(), self.ttl).await {
                tracing::warn!(key = %key, %error, "unable to store fetched value");
            }
            // An invalidation may have landed while the value was being stored.
            if self.generation(key) != generation {
                if let Err(error) = self.store.del(key).await {
                    tracing::warn!(key = %key, %error, "unable to drop invalidated value");
                }
            }
        }

        Ok(value)
    }

    async fn lookup(&self, key: &FetchKey) -> Option<Value> {
        match self.store.get(key).await {
            Ok(value) => value,
            Err(error) => {
                tracing::warn!(key = %key, %error, "cache lookup failed");
                None
            }
        }
    }

    fn generation(&self, key: &FetchKey) -> u64 {
        self.generations.get(key).map_or(0, |g| g.value)
    }
}
