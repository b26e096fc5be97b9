#![allow(clippy::module_inception)]
#![allow(clippy::mutable_key_type)]

pub mod app_context;
pub mod blueprint;
pub mod cache;
pub mod config;
pub mod data_loader;
pub mod data_source;
pub mod error;
pub mod http;
pub mod jit;
pub mod json;
pub mod resolver;
pub mod scalar;
pub mod tracing;
pub mod wrapping_type;

use std::hash::Hash;
use std::num::NonZeroU64;

pub use app_context::{AppContext, ContextFactory};
pub use error::{Error, Result};
pub use wrapping_type::Type;

/// Key/value store with per-entry expiry. Backs the data source cache and
/// can be swapped for an external store.
#[async_trait::async_trait]
pub trait Cache: Send + Sync {
    type Key: Hash + Eq;
    type Value;
    async fn set<'a>(
        &'a self,
        key: Self::Key,
        value: Self::Value,
        ttl: NonZeroU64,
    ) -> Result<(), cache::Error>;
    async fn get<'a>(&'a self, key: &'a Self::Key) -> Result<Option<Self::Value>, cache::Error>;
    async fn del<'a>(&'a self, key: &'a Self::Key) -> Result<(), cache::Error>;

    fn hit_rate(&self) -> Option<f64>;
}

pub fn is_default<T: Default + Eq>(val: &T) -> bool {
    *val == T::default()
}
