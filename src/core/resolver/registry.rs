use std::collections::HashMap;
use std::sync::Arc;

use async_graphql_value::ConstValue;
use futures_util::future::BoxFuture;

use super::{resolver_fn, sync_resolver, Arguments, FieldInfo, Resolver};
use crate::core::http::RequestContext;
use crate::core::jit;
use crate::core::json::JsonLike;

/// Resolvers registered per `(type, field)`. Built once and shared
/// read-only by every request.
pub struct ResolverRegistry<Value = ConstValue> {
    resolvers: HashMap<String, HashMap<String, Arc<dyn Resolver<Value>>>>,
}

impl<Value: JsonLike> ResolverRegistry<Value> {
    pub fn builder() -> ResolverRegistryBuilder<Value> {
        ResolverRegistryBuilder { resolvers: HashMap::new() }
    }

    pub fn empty() -> Self {
        Self::builder().build()
    }

    /// `None` means the field is resolved by the
    /// [`DefaultResolver`](super::DefaultResolver).
    pub fn lookup(&self, type_name: &str, field_name: &str) -> Option<&Arc<dyn Resolver<Value>>> {
        self.resolvers.get(type_name)?.get(field_name)
    }

    pub fn len(&self) -> usize {
        self.resolvers.values().map(HashMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<Value: JsonLike> Default for ResolverRegistry<Value> {
    fn default() -> Self {
        Self::empty()
    }
}

pub struct ResolverRegistryBuilder<Value = ConstValue> {
    resolvers: HashMap<String, HashMap<String, Arc<dyn Resolver<Value>>>>,
}

impl<Value: JsonLike> ResolverRegistryBuilder<Value> {
    /// Registers `resolver` for `type_name.field_name`, replacing any earlier
    /// registration for the same field.
    pub fn register<R: Resolver<Value> + 'static>(
        mut self,
        type_name: impl Into<String>,
        field_name: impl Into<String>,
        resolver: R,
    ) -> Self {
        self.resolvers
            .entry(type_name.into())
            .or_default()
            .insert(field_name.into(), Arc::new(resolver));
        self
    }

    pub fn resolver_fn<F>(
        self,
        type_name: impl Into<String>,
        field_name: impl Into<String>,
        f: F,
    ) -> Self
    where
        F: for<'a> Fn(
                &'a Value,
                &'a Arguments,
                &'a RequestContext<Value>,
                &'a FieldInfo<'a>,
            ) -> BoxFuture<'a, jit::Result<Value>>
            + Send
            + Sync
            + 'static,
    {
        self.register(type_name, field_name, resolver_fn(f))
    }

    pub fn sync_resolver<F>(
        self,
        type_name: impl Into<String>,
        field_name: impl Into<String>,
        f: F,
    ) -> Self
    where
        F: Fn(&Value, &Arguments, &RequestContext<Value>, &FieldInfo<'_>) -> jit::Result<Value>
            + Send
            + Sync
            + 'static,
    {
        self.register(type_name, field_name, sync_resolver(f))
    }

    pub fn build(self) -> ResolverRegistry<Value> {
        ResolverRegistry { resolvers: self.resolvers }
    }
}

#[cfg(test)]
mod tests {
    use async_graphql_value::ConstValue;
    use futures_util::FutureExt;
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::core::jit::{Field, FieldId, Pos};
    use crate::core::resolver::const_resolver;
    use crate::core::Type;

    fn field() -> Field {
        Field {
            id: FieldId::new(0),
            name: "title".into(),
            output_name: "title".into(),
            parent_type: "Album".into(),
            type_of: Type::named("String"),
            is_scalar: true,
            args: vec![],
            conditions: vec![],
            pos: Pos::default(),
            selection: vec![],
        }
    }

    async fn call(registry: &ResolverRegistry<ConstValue>, type_name: &str, name: &str) -> ConstValue {
        let ctx = RequestContext::default();
        let field = field();
        let info = FieldInfo::new(&field, &[], async_graphql_parser::types::OperationType::Query);
        registry
            .lookup(type_name, name)
            .unwrap()
            .resolve(&ConstValue::Null, &Arguments::new(), &ctx, &info)
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_lookup() {
        let registry = ResolverRegistry::<ConstValue>::builder()
            .resolver_fn("Query", "album", |_, _, _, _| {
                async { Ok(ConstValue::from("async")) }.boxed()
            })
            .sync_resolver("Album", "title", |_, _, _, field| {
                Ok(ConstValue::from(field.parent_type()))
            })
            .register(
                "Album",
                "year",
                const_resolver(|| async { Ok(ConstValue::from(1959)) }),
            )
            .build();

        assert_eq!(registry.len(), 3);
        assert!(registry.lookup("Album", "artist").is_none());
        assert!(registry.lookup("Artist", "title").is_none());

        assert_eq!(call(&registry, "Query", "album").await, ConstValue::from("async"));
        assert_eq!(call(&registry, "Album", "title").await, ConstValue::from("Album"));
        assert_eq!(call(&registry, "Album", "year").await, ConstValue::from(1959));
    }

    fn answer() -> ResolverRegistryBuilder {
        ResolverRegistry::builder().sync_resolver("Query", "answer", |_, _, _, _| {
            Ok(ConstValue::from(42))
        })
    }

    #[tokio::test]
    async fn test_const_value_is_the_default() {
        let registry: ResolverRegistry = answer().build();
        assert_eq!(call(&registry, "Query", "answer").await, ConstValue::from(42));
        assert!(ResolverRegistry::<ConstValue>::default().is_empty());
    }

    #[tokio::test]
    async fn test_later_registration_wins() {
        let registry = ResolverRegistry::<ConstValue>::builder()
            .sync_resolver("Query", "a", |_, _, _, _| Ok(ConstValue::from(1)))
            .sync_resolver("Query", "a", |_, _, _, _| Ok(ConstValue::from(2)))
            .build();
        assert_eq!(registry.len(), 1);
        assert_eq!(call(&registry, "Query", "a").await, ConstValue::from(2));
    }
}
