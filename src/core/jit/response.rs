use indexmap::IndexMap;
use serde::Serialize;

use super::GraphQLError;

/// The `{data, errors}` envelope. `data` and `errors` are always present in
/// the serialized form; `extensions` only when something was added.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Response<Value> {
    pub data: Value,
    pub errors: Vec<GraphQLError>,
    #[serde(skip_serializing_if = "IndexMap::is_empty")]
    pub extensions: IndexMap<String, Value>,
}

impl<Value> Response<Value> {
    pub fn new(data: Value) -> Self {
        Response { data, errors: Vec::new(), extensions: IndexMap::new() }
    }

    #[must_use]
    pub fn with_errors(mut self, errors: Vec<GraphQLError>) -> Self {
        self.errors.extend(errors);
        self
    }

    pub fn add_errors(&mut self, errors: impl IntoIterator<Item = GraphQLError>) {
        self.errors.extend(errors);
    }

    pub fn add_extension(&mut self, name: impl Into<String>, value: Value) {
        self.extensions.insert(name.into(), value);
    }

    pub fn is_ok(&self) -> bool {
        self.errors.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;

    #[test]
    fn test_envelope_always_has_data_and_errors() {
        let response = Response::new(json!(null));
        assert_eq!(
            serde_json::to_value(&response).unwrap(),
            json!({"data": null, "errors": []})
        );

        let mut response = Response::new(json!({"a": 1}))
            .with_errors(vec![GraphQLError::new("boom", None)]);
        response.add_extension("cost", json!(3));
        assert!(!response.is_ok());
        assert_eq!(
            serde_json::to_value(&response).unwrap(),
            json!({"data": {"a": 1}, "errors": [{"message": "boom"}], "extensions": {"cost": 3}})
        );
    }
}
