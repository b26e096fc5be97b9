use std::hash::Hash;
use std::marker::PhantomData;
use std::num::NonZeroU64;

use super::error::Result;

/// Store that never retains anything. Used for request-scoped data sources
/// where only in-flight deduplication is wanted.
pub struct NoopCache<K, V> {
    _marker: PhantomData<fn() -> (K, V)>,
}

impl<K, V> Default for NoopCache<K, V> {
    fn default() -> Self {
        Self { _marker: PhantomData }
    }
}

#[async_trait::async_trait]
impl<K: Hash + Eq + Send + Sync, V: Send + Sync> crate::core::Cache for NoopCache<K, V> {
    type Key = K;
    type Value = V;

    async fn set<'a>(&'a self, _: K, _: V, _: NonZeroU64) -> Result<()> {
        Ok(())
    }

    async fn get<'a>(&'a self, _: &'a K) -> Result<Option<V>> {
        Ok(None)
    }

    async fn del<'a>(&'a self, _: &'a K) -> Result<()> {
        Ok(())
    }

    fn hit_rate(&self) -> Option<f64> {
        None
    }
}
