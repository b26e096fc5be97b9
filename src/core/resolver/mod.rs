mod default;
mod field_info;
mod registry;

use std::future::Future;
use std::marker::PhantomData;

use async_graphql_value::ConstValue;
pub use default::DefaultResolver;
pub use field_info::FieldInfo;
use futures_util::future::{self, BoxFuture, FutureExt};
use indexmap::IndexMap;
pub use registry::{ResolverRegistry, ResolverRegistryBuilder};

use crate::core::http::RequestContext;
use crate::core::jit;
use crate::core::json::JsonLike;

/// Arguments of a field after variables were substituted and defaults
/// applied.
pub type Arguments = IndexMap<String, ConstValue>;

/// Produces the value of one field. Whether the underlying computation is
/// synchronous or not, the engine awaits the returned future before using
/// the value.
pub trait Resolver<Value>: Send + Sync {
    fn resolve<'a>(
        &'a self,
        parent: &'a Value,
        args: &'a Arguments,
        ctx: &'a RequestContext<Value>,
        field: &'a FieldInfo<'a>,
    ) -> BoxFuture<'a, jit::Result<Value>>;
}

/// Resolver backed by a closure returning a boxed future.
pub struct FnResolver<Value, F>(F, PhantomData<fn() -> Value>);

impl<Value, F> Resolver<Value> for FnResolver<Value, F>
where
    Value: JsonLike,
    F: for<'a> Fn(
            &'a Value,
            &'a Arguments,
            &'a RequestContext<Value>,
            &'a FieldInfo<'a>,
        ) -> BoxFuture<'a, jit::Result<Value>>
        + Send
        + Sync,
{
    fn resolve<'a>(
        &'a self,
        parent: &'a Value,
        args: &'a Arguments,
        ctx: &'a RequestContext<Value>,
        field: &'a FieldInfo<'a>,
    ) -> BoxFuture<'a, jit::Result<Value>> {
        (self.0)(parent, args, ctx, field)
    }
}

/// Adapts an asynchronous closure:
/// `resolver_fn(|parent, args, ctx, field| async move { .. }.boxed())`.
pub fn resolver_fn<Value, F>(f: F) -> FnResolver<Value, F>
where
    Value: JsonLike,
    F: for<'a> Fn(
            &'a Value,
            &'a Arguments,
            &'a RequestContext<Value>,
            &'a FieldInfo<'a>,
        ) -> BoxFuture<'a, jit::Result<Value>>
        + Send
        + Sync,
{
    FnResolver(f, PhantomData)
}

/// Resolver backed by a closure that produces its value immediately.
pub struct SyncResolver<Value, F>(F, PhantomData<fn() -> Value>);

impl<Value, F> Resolver<Value> for SyncResolver<Value, F>
where
    Value: JsonLike,
    F: Fn(&Value, &Arguments, &RequestContext<Value>, &FieldInfo<'_>) -> jit::Result<Value>
        + Send
        + Sync,
{
    fn resolve<'a>(
        &'a self,
        parent: &'a Value,
        args: &'a Arguments,
        ctx: &'a RequestContext<Value>,
        field: &'a FieldInfo<'a>,
    ) -> BoxFuture<'a, jit::Result<Value>> {
        future::ready((self.0)(parent, args, ctx, field)).boxed()
    }
}

pub fn sync_resolver<Value, F>(f: F) -> SyncResolver<Value, F>
where
    Value: JsonLike,
    F: Fn(&Value, &Arguments, &RequestContext<Value>, &FieldInfo<'_>) -> jit::Result<Value>
        + Send
        + Sync,
{
    SyncResolver(f, PhantomData)
}

/// Resolver that ignores its inputs and awaits a fresh future built from
/// the closure on every call.
pub struct ConstResolver<Value, F>(F, PhantomData<fn() -> Value>);

impl<Value, F, Fut> Resolver<Value> for ConstResolver<Value, F>
where
    Value: JsonLike,
    F: Fn() -> Fut + Send + Sync,
    Fut: Future<Output = jit::Result<Value>> + Send + 'static,
{
    fn resolve<'a>(
        &'a self,
        _: &'a Value,
        _: &'a Arguments,
        _: &'a RequestContext<Value>,
        _: &'a FieldInfo<'a>,
    ) -> BoxFuture<'a, jit::Result<Value>> {
        (self.0)().boxed()
    }
}

pub fn const_resolver<Value, F, Fut>(f: F) -> ConstResolver<Value, F>
where
    Value: JsonLike,
    F: Fn() -> Fut + Send + Sync,
    Fut: Future<Output = jit::Result<Value>> + Send + 'static,
{
    ConstResolver(f, PhantomData)
}
