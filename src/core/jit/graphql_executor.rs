use std::sync::Arc;

use async_graphql_value::ConstValue;
use tokio::time::Instant;

use super::{Executor, OperationPlan, Request, Response, Synth};
use crate::core::app_context::AppContext;
use crate::core::http::RequestContext;
use crate::core::json::{JsonLike, JsonObjectLike};

/// Runs one prepared plan for one request: resolution first, then
/// completion of the collected values into a response.
#[derive(Clone)]
pub struct JITExecutor<Value = ConstValue> {
    app_ctx: Arc<AppContext<Value>>,
    req_ctx: Arc<RequestContext<Value>>,
    plan: Arc<OperationPlan>,
}

impl<Value: JsonLike> JITExecutor<Value> {
    pub fn new(
        app_ctx: Arc<AppContext<Value>>,
        req_ctx: Arc<RequestContext<Value>>,
        plan: Arc<OperationPlan>,
    ) -> Self {
        Self { app_ctx, req_ctx, plan }
    }

    /// Executes against an empty root object.
    pub async fn execute(&self, request: &Request) -> Response<Value> {
        let root = Value::object(<Value::JsonObject as JsonObjectLike>::new());
        self.execute_with_root(request, &root).await
    }

    pub async fn execute_with_root(&self, request: &Request, root: &Value) -> Response<Value> {
        let variables = self.plan.variables(&request.variables);
        let deadline = self
            .req_ctx
            .server()
            .get_global_response_timeout()
            .map(|timeout| Instant::now() + timeout);

        let store = Executor::new(
            &self.plan,
            &self.app_ctx.registry,
            &self.req_ctx,
            &variables,
        )
        .deadline(deadline)
        .execute(root)
        .await;

        if deadline.is_some_and(|deadline| Instant::now() >= deadline) {
            tracing::warn!(
                operation = ?self.plan.operation_type,
                "response deadline reached, returning partial data"
            );
        }

        Synth::new(&self.plan, store, &variables).synthesize()
    }
}
