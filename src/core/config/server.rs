use std::num::NonZeroU64;
use std::time::Duration;

use derive_setters::Setters;
use serde::{Deserialize, Serialize};

use super::Source;
use crate::core::is_default;

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq, Setters)]
#[serde(deny_unknown_fields)]
#[serde(rename_all = "camelCase")]
#[setters(strip_option)]
/// Execution settings shared by every request served from one
/// [`AppContext`](crate::core::AppContext).
pub struct Server {
    #[serde(default, skip_serializing_if = "is_default")]
    /// `dedupe` coalesces concurrent fetches of the same key into one
    /// outbound call. Applies to queries only. @default `true`.
    pub dedupe: Option<bool>,

    #[serde(default, skip_serializing_if = "is_default")]
    /// `sharedCache` keeps fetched values across requests. When disabled,
    /// each request gets a fresh data source that only deduplicates.
    /// @default `false`.
    pub shared_cache: Option<bool>,

    #[serde(default, skip_serializing_if = "is_default")]
    /// `cacheTtl` is how long, in milliseconds, a fetched value stays in the
    /// shared cache. @default `60000`.
    pub cache_ttl: Option<u64>,

    #[serde(default, skip_serializing_if = "is_default")]
    /// `cacheCapacity` bounds the number of entries in the shared cache.
    /// @default `100000`.
    pub cache_capacity: Option<usize>,

    #[serde(default, skip_serializing_if = "is_default")]
    /// `globalResponseTimeout` sets the maximum query duration in
    /// milliseconds. Unresolved fields are reported as timed out. `0` or
    /// absent disables the deadline.
    pub global_response_timeout: Option<u64>,

    #[serde(default, skip_serializing_if = "is_default")]
    /// `allowedHeaders` lists the request headers forwarded to resolvers.
    pub allowed_headers: Option<Vec<String>>,

    #[serde(default, skip_serializing_if = "is_default")]
    /// `dedupeChannelCapacity` sizes the broadcast channel used to hand a
    /// result to waiting callers. @default `256`.
    pub dedupe_channel_capacity: Option<usize>,
}

impl Server {
    pub fn from_source(source: Source, text: &str) -> crate::core::Result<Self> {
        match source {
            Source::Json => Ok(serde_json::from_str(text)?),
            Source::Yml => Ok(serde_yaml::from_str(text)?),
        }
    }

    pub fn enable_dedupe(&self) -> bool {
        self.dedupe.unwrap_or(true)
    }

    pub fn enable_shared_cache(&self) -> bool {
        self.shared_cache.unwrap_or(false)
    }

    pub fn get_cache_ttl(&self) -> NonZeroU64 {
        self.cache_ttl
            .and_then(NonZeroU64::new)
            .unwrap_or(NonZeroU64::new(60_000).unwrap_or(NonZeroU64::MIN))
    }

    pub fn get_cache_capacity(&self) -> usize {
        self.cache_capacity.unwrap_or(100_000)
    }

    pub fn get_global_response_timeout(&self) -> Option<Duration> {
        self.global_response_timeout
            .filter(|ms| *ms > 0)
            .map(Duration::from_millis)
    }

    pub fn get_allowed_headers(&self) -> &[String] {
        self.allowed_headers.as_deref().unwrap_or_default()
    }

    pub fn get_dedupe_channel_capacity(&self) -> usize {
        self.dedupe_channel_capacity.filter(|c| *c > 0).unwrap_or(256)
    }
}
