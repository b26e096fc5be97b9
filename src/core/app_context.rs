use std::sync::Arc;

use async_graphql_value::ConstValue;
use dashmap::DashMap;
use tracing::Instrument;

use crate::core::blueprint::Index;
use crate::core::config::Server;
use crate::core::data_source::DataSource;
use crate::core::http::{filter_headers, RequestContext, RequestMetadata};
use crate::core::jit::{GraphQLError, JITExecutor, OperationPlan, Request, Response};
use crate::core::json::JsonLike;
use crate::core::resolver::ResolverRegistry;

/// Long-lived state shared by every request: the type index, the resolver
/// registry, server settings and, when enabled, the cross-request data
/// source.
pub struct AppContext<Value = ConstValue> {
    pub index: Index,
    pub registry: ResolverRegistry<Value>,
    pub server: Server,
    pub data_source: Option<Arc<DataSource<Value>>>,
    pub operation_plans: DashMap<(Option<String>, String), Arc<OperationPlan>>,
}

impl<Value: JsonLike> AppContext<Value> {
    pub fn new(index: Index, registry: ResolverRegistry<Value>, server: Server) -> Self {
        let data_source = server.enable_shared_cache().then(|| {
            Arc::new(
                DataSource::in_memory(server.get_cache_capacity(), server.get_cache_ttl())
                    .dedupe(server.enable_dedupe())
                    .channel_capacity(server.get_dedupe_channel_capacity()),
            )
        });

        Self {
            index,
            registry,
            server,
            data_source,
            operation_plans: DashMap::new(),
        }
    }

    /// Replaces the shared data source, e.g. with one backed by an external
    /// store.
    pub fn with_data_source(self, data_source: Arc<DataSource<Value>>) -> Self {
        Self { data_source: Some(data_source), ..self }
    }

    /// Plans are cached by operation name and query text.
    pub fn plan(&self, request: &Request) -> crate::core::Result<Arc<OperationPlan>> {
        let key = (request.operation_name.clone(), request.query.clone());
        if let Some(plan) = self.operation_plans.get(&key) {
            return Ok(plan.clone());
        }

        let plan = Arc::new(request.create_plan(&self.index)?);
        self.operation_plans.insert(key, plan.clone());
        Ok(plan)
    }

    /// Plans and executes `request`. Request-level failures come back as a
    /// response with `data: null` and a single error.
    pub async fn execute(
        self: &Arc<Self>,
        request: &Request,
        metadata: RequestMetadata,
    ) -> Response<Value> {
        let span = tracing::info_span!(
            "execute",
            operation_name = request.operation_name.as_deref().unwrap_or_default()
        );

        async {
            let plan = match self.plan(request) {
                Ok(plan) => plan,
                Err(error) => {
                    tracing::warn!(%error, "unable to plan request");
                    return Response::new(Value::null())
                        .with_errors(vec![GraphQLError::from(error)]);
                }
            };

            let req_ctx = Arc::new(self.create(metadata));
            let response = JITExecutor::new(self.clone(), req_ctx, plan)
                .execute(request)
                .await;
            tracing::debug!(errors = response.errors.len(), "executed");
            response
        }
        .instrument(span)
        .await
    }
}

/// Builds the per-request context from what the transport knows about the
/// request.
pub trait ContextFactory<Value> {
    fn create(&self, metadata: RequestMetadata) -> RequestContext<Value>;
}

impl<Value: JsonLike> ContextFactory<Value> for AppContext<Value> {
    fn create(&self, metadata: RequestMetadata) -> RequestContext<Value> {
        let data_source = self.data_source.clone().unwrap_or_else(|| {
            Arc::new(
                DataSource::request_scoped()
                    .dedupe(self.server.enable_dedupe())
                    .channel_capacity(self.server.get_dedupe_channel_capacity()),
            )
        });

        let cancellation_token = metadata
            .cancellation
            .map(|token| token.child_token())
            .unwrap_or_default();

        RequestContext::new(self.server.clone(), data_source)
            .with_allowed_headers(filter_headers(
                &metadata.headers,
                self.server.get_allowed_headers(),
            ))
            .with_principal(metadata.principal)
            .with_extensions(metadata.extensions)
            .with_cancellation_token(cancellation_token)
    }
}

#[cfg(test)]
mod tests {
    use http::{HeaderMap, HeaderValue};
    use pretty_assertions::assert_eq;
    use tokio_util::sync::CancellationToken;

    use super::*;
    use crate::core::blueprint::FieldDefinition;
    use crate::core::http::Principal;
    use crate::core::Type;

    fn app(server: Server) -> AppContext {
        let index = Index::new("Query").object(
            "Query",
            [FieldDefinition::new("hello", Type::named("String"))],
        );
        AppContext::new(index, ResolverRegistry::default(), server)
    }

    #[test]
    fn test_plan_is_cached() {
        let app = app(Server::default());
        let request = Request::new("{ hello }");
        let first = app.plan(&request).unwrap();
        let second = app.plan(&request).unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(app.operation_plans.len(), 1);
    }

    #[test]
    fn test_shared_data_source() {
        let app_ctx = app(Server::default().shared_cache(true));
        let a = app_ctx.create(RequestMetadata::default());
        let b = app_ctx.create(RequestMetadata::default());
        assert!(Arc::ptr_eq(a.data_source(), b.data_source()));

        let app_ctx = app(Server::default());
        let a = app_ctx.create(RequestMetadata::default());
        let b = app_ctx.create(RequestMetadata::default());
        assert!(!Arc::ptr_eq(a.data_source(), b.data_source()));
    }

    #[test]
    fn test_create_context() {
        let app = app(Server::default().allowed_headers(vec!["x-user".to_string()]));
        let mut headers = HeaderMap::new();
        headers.insert("x-user", HeaderValue::from_static("42"));
        headers.insert("cookie", HeaderValue::from_static("secret"));
        let token = CancellationToken::new();

        let ctx = app.create(
            RequestMetadata::default()
                .headers(headers)
                .principal(Principal::new("u1").with_role("admin"))
                .cancellation(token.clone()),
        );

        assert_eq!(ctx.header("x-user"), Some("42"));
        assert_eq!(ctx.header("cookie"), None);
        assert!(ctx.principal().as_ref().unwrap().has_role("admin"));
        assert!(!ctx.is_cancelled());
        token.cancel();
        assert!(ctx.is_cancelled());
    }

    #[tokio::test]
    async fn test_plan_error_response() {
        let app = Arc::new(app(Server::default()));
        let response = app
            .execute(&Request::new("{ missing }"), RequestMetadata::default())
            .await;
        assert_eq!(response.data, ConstValue::Null);
        assert_eq!(response.errors.len(), 1);
    }
}
