use async_graphql_parser::types::ExecutableDocument;
use async_graphql_value::ConstValue;
use serde::{Deserialize, Serialize};

use super::{Builder, OperationPlan, Variables};
use crate::core::blueprint::Index;
use crate::core::Result;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Request<V = ConstValue> {
    #[serde(default)]
    pub query: String,
    #[serde(default)]
    pub operation_name: Option<String>,
    #[serde(default)]
    pub variables: Variables<V>,
}

impl Request<ConstValue> {
    pub fn new(query: impl Into<String>) -> Self {
        Self { query: query.into(), operation_name: None, variables: Variables::new() }
    }

    #[must_use]
    pub fn operation_name(self, operation_name: impl Into<String>) -> Self {
        Self { operation_name: Some(operation_name.into()), ..self }
    }

    #[must_use]
    pub fn variables<K: Into<String>>(
        self,
        vars: impl IntoIterator<Item = (K, ConstValue)>,
    ) -> Self {
        Self { variables: Variables::from_iter(vars), ..self }
    }

    pub fn parse(&self) -> Result<ExecutableDocument> {
        Ok(async_graphql_parser::parse_query(&self.query)?)
    }

    pub fn create_plan(&self, index: &Index) -> Result<OperationPlan> {
        let document = self.parse()?;
        Builder::new(index, document).build(self.operation_name.as_deref())
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;
    use crate::core::blueprint::FieldDefinition;
    use crate::core::{Error, Type};

    #[test]
    fn test_deserialize() {
        let request: Request = serde_json::from_value(json!({
            "query": "query($id: ID!) { album(id: $id) }",
            "operationName": null,
            "variables": {"id": "42"}
        }))
        .unwrap();
        assert_eq!(
            request.variables.get("id"),
            Some(&ConstValue::String("42".to_string()))
        );
    }

    #[test]
    fn test_create_plan() {
        let index = Index::new("Query").object(
            "Query",
            [FieldDefinition::new("album", Type::named("String"))
                .arg("id", Type::named("ID"), None)],
        );
        let plan = Request::new("{ album }").create_plan(&index).unwrap();
        assert_eq!(plan.selection.len(), 1);

        let result = Request::new("{ album").create_plan(&index);
        assert!(matches!(result, Err(Error::Parse(_))));
    }
}
