use std::future::Future;
use std::sync::Arc;

use async_graphql_value::ConstValue;
use derive_getters::Getters;
use derive_setters::Setters;
use http::{Extensions, HeaderMap};
use tokio_util::sync::CancellationToken;

use super::Principal;
use crate::core::config::Server;
use crate::core::data_source::{DataSource, FetchError, FetchKey};
use crate::core::json::JsonLike;
use crate::core::resolver::FieldInfo;

/// Per-request state handed to every resolver. Built once by a
/// [`ContextFactory`](crate::core::ContextFactory) and only ever shared by
/// reference afterwards.
#[derive(Setters, Getters)]
#[setters(prefix = "with_")]
pub struct RequestContext<Value = ConstValue> {
    server: Server,
    // A subset of all the headers received in the request that resolvers may
    // forward upstream.
    allowed_headers: HeaderMap,
    principal: Option<Principal>,
    data_source: Arc<DataSource<Value>>,
    extensions: Extensions,
    cancellation_token: CancellationToken,
}

impl<Value: JsonLike> RequestContext<Value> {
    pub fn new(server: Server, data_source: Arc<DataSource<Value>>) -> Self {
        Self {
            server,
            allowed_headers: HeaderMap::new(),
            principal: None,
            data_source,
            extensions: Extensions::new(),
            cancellation_token: CancellationToken::new(),
        }
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.allowed_headers
            .get(name)
            .and_then(|value| value.to_str().ok())
    }

    pub fn extension<T: Send + Sync + 'static>(&self) -> Option<&T> {
        self.extensions.get::<T>()
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancellation_token.is_cancelled()
    }

    /// Fetches through the request's data source. Mutations always go
    /// upstream: their calls are neither coalesced nor served from the
    /// store.
    pub async fn fetch<F, Fut>(
        &self,
        field: &FieldInfo<'_>,
        key: &FetchKey,
        fetch: F,
    ) -> Result<Value, FetchError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Value, FetchError>>,
    {
        if field.is_query() {
            self.data_source.fetch(key, fetch).await
        } else {
            fetch().await
        }
    }
}

impl<Value: JsonLike> Default for RequestContext<Value> {
    fn default() -> Self {
        Self::new(Server::default(), Arc::new(DataSource::request_scoped()))
    }
}

/// Keeps the headers named in `allowed`, compared case-insensitively.
pub(crate) fn filter_headers(headers: &HeaderMap, allowed: &[String]) -> HeaderMap {
    let mut filtered = HeaderMap::new();
    for (k, v) in headers.iter() {
        if allowed
            .iter()
            .any(|allowed_key| allowed_key.eq_ignore_ascii_case(k.as_str()))
        {
            filtered.append(k, v.clone());
        }
    }
    filtered
}
