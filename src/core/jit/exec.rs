use std::future::Future;
use std::sync::{Mutex, PoisonError};

use async_graphql_value::{ConstValue, Value as InputValue};
use futures_util::future::{join_all, BoxFuture, FutureExt};
use tokio::time::Instant;
use tracing::Instrument;

use super::{DataPath, Error, Field, OperationPlan, PathSegment, Store, Variables};
use crate::core::http::RequestContext;
use crate::core::json::JsonLike;
use crate::core::resolver::{Arguments, DefaultResolver, FieldInfo, ResolverRegistry};
use crate::core::Type;

/// Resolves every field of a plan against a root value. Siblings are
/// resolved concurrently and so are the elements of lists; root fields of a
/// mutation run one after the other.
pub struct Executor<'a, Value> {
    plan: &'a OperationPlan,
    registry: &'a ResolverRegistry<Value>,
    ctx: &'a RequestContext<Value>,
    variables: &'a Variables<ConstValue>,
    deadline: Option<Instant>,
}

impl<'a, Value: JsonLike> Executor<'a, Value> {
    pub fn new(
        plan: &'a OperationPlan,
        registry: &'a ResolverRegistry<Value>,
        ctx: &'a RequestContext<Value>,
        variables: &'a Variables<ConstValue>,
    ) -> Self {
        Self { plan, registry, ctx, variables, deadline: None }
    }

    /// Resolver calls still running at `deadline` fail with
    /// [`Error::Timeout`].
    pub fn deadline(self, deadline: Option<Instant>) -> Self {
        Self { deadline, ..self }
    }

    pub async fn execute(&self, root: &Value) -> Store<Result<Value, Error>> {
        let store = Mutex::new(Store::new());
        let inner = ExecutorInner { exec: self, store: &store };
        inner.init(root).await;
        store.into_inner().unwrap_or_else(PoisonError::into_inner)
    }
}

struct ExecutorInner<'a, 'b, Value> {
    exec: &'b Executor<'a, Value>,
    store: &'b Mutex<Store<Result<Value, Error>>>,
}

impl<'a: 'b, 'b, Value: JsonLike> ExecutorInner<'a, 'b, Value> {
    async fn init(&self, root: &Value) {
        let plan = self.exec.plan;
        let fields = plan
            .selection
            .iter()
            .filter(|field| !field.skip(self.exec.variables));

        if plan.is_query() {
            join_all(fields.map(|field| self.execute(field, root, DataPath::new(), vec![]))).await;
        } else {
            for field in fields {
                self.execute(field, root, DataPath::new(), vec![]).await;
            }
        }
    }

    fn execute<'c>(
        &'c self,
        field: &'a Field,
        parent: &'c Value,
        data_path: DataPath,
        mut path: Vec<PathSegment>,
    ) -> BoxFuture<'c, ()> {
        async move {
            path.push(PathSegment::Field(field.output_name.clone()));
            let result = self.resolve(field, parent, &path).await;

            if let Ok(value) = &result {
                self.iter(field, &field.type_of, value, data_path.clone(), path)
                    .await;
            }

            self.store
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .set(field.id, data_path, result);
        }
        .boxed()
    }

    /// Walks into the value a field resolved to, fanning out over list
    /// elements, and resolves the field's selection against every object
    /// found. Values of the wrong shape are left to the synthesizer to
    /// report.
    fn iter<'c>(
        &'c self,
        field: &'a Field,
        type_of: &'a Type,
        value: &'c Value,
        data_path: DataPath,
        path: Vec<PathSegment>,
    ) -> BoxFuture<'c, ()> {
        async move {
            if field.selection.is_empty() {
                return;
            }

            if type_of.is_list() {
                if let Some(items) = value.as_array() {
                    let of_type = type_of.of_type();
                    join_all(items.iter().enumerate().map(|(index, item)| {
                        let mut path = path.clone();
                        path.push(PathSegment::Index(index));
                        self.iter(field, of_type, item, data_path.clone().with_index(index), path)
                    }))
                    .await;
                }
            } else if value.as_object().is_some() {
                join_all(
                    field
                        .selection
                        .iter()
                        .filter(|child| !child.skip(self.exec.variables))
                        .map(|child| self.execute(child, value, data_path.clone(), path.clone())),
                )
                .await;
            }
        }
        .boxed()
    }

    async fn resolve(
        &self,
        field: &'a Field,
        parent: &Value,
        path: &[PathSegment],
    ) -> Result<Value, Error> {
        if field.is_typename() {
            return Ok(Value::string(field.parent_type.clone()));
        }

        let Some(resolver) = self.exec.registry.lookup(&field.parent_type, &field.name) else {
            return Ok(DefaultResolver::resolve(parent, &field.name).unwrap_or_else(Value::null));
        };

        let args = self.args(field)?;
        let info = FieldInfo::new(field, path, self.exec.plan.operation_type);
        let span = tracing::debug_span!("resolve", field = %field.coordinate(), path = ?path);

        let result = self
            .race(resolver.resolve(parent, &args, self.exec.ctx, &info))
            .instrument(span)
            .await;

        if let Err(error) = &result {
            tracing::debug!(field = %field.coordinate(), path = ?path, %error, "resolver failed");
        }
        result
    }

    /// Runs a resolver call until it completes, the deadline passes or the
    /// request is cancelled, whichever comes first.
    async fn race<F>(&self, resolution: F) -> Result<Value, Error>
    where
        F: Future<Output = Result<Value, Error>>,
    {
        let deadline = async {
            match self.exec.deadline {
                Some(deadline) => tokio::time::sleep_until(deadline).await,
                None => std::future::pending().await,
            }
        };

        tokio::select! {
            biased;
            _ = deadline => Err(Error::Timeout),
            _ = self.exec.ctx.cancellation_token().cancelled() => Err(Error::Cancelled),
            result = resolution => result,
        }
    }

    fn args(&self, field: &Field) -> Result<Arguments, Error> {
        let variables = self.exec.variables;
        let mut args = Arguments::new();
        for arg in field.args.iter() {
            let value = match &arg.value {
                Some(InputValue::Variable(name)) => variables
                    .get(name.as_str())
                    .cloned()
                    .or_else(|| arg.default_value.clone()),
                Some(value) => Some(value.clone().into_const_with(|name| {
                    variables
                        .get(name.as_str())
                        .cloned()
                        .ok_or_else(|| Error::Variable(name.to_string()))
                })?),
                None => arg.default_value.clone(),
            };
            if let Some(value) = value {
                args.insert(arg.name.clone(), value);
            }
        }
        Ok(args)
    }
}
