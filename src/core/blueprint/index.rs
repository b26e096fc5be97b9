use async_graphql_value::ConstValue;
use indexmap::IndexMap;

use crate::core::scalar::Scalar;
use crate::core::Type;

#[derive(Debug, Clone)]
pub struct InputFieldDefinition {
    pub name: String,
    pub of_type: Type,
    pub default_value: Option<ConstValue>,
}

#[derive(Debug, Clone)]
pub struct FieldDefinition {
    pub name: String,
    pub of_type: Type,
    pub args: IndexMap<String, InputFieldDefinition>,
}

impl FieldDefinition {
    pub fn new(name: impl Into<String>, of_type: Type) -> Self {
        Self { name: name.into(), of_type, args: IndexMap::new() }
    }

    pub fn arg(
        mut self,
        name: impl Into<String>,
        of_type: Type,
        default_value: Option<ConstValue>,
    ) -> Self {
        let name = name.into();
        self.args
            .insert(name.clone(), InputFieldDefinition { name, of_type, default_value });
        self
    }

    pub fn get_arg(&self, arg_name: &str) -> Option<&InputFieldDefinition> {
        self.args.get(arg_name)
    }
}

#[derive(Debug, Clone)]
pub enum Definition {
    Object { fields: IndexMap<String, FieldDefinition> },
    Scalar,
    Enum { values: Vec<String> },
}

///
/// A read optimized index of all the types the executor needs to know
/// about. Provide O(1) access to getting any field information.
#[derive(Debug, Clone)]
pub struct Index {
    query: String,
    mutation: Option<String>,
    map: IndexMap<String, Definition>,
}

impl Index {
    pub fn new(query: impl Into<String>) -> Self {
        Self { query: query.into(), mutation: None, map: IndexMap::new() }
    }

    pub fn with_mutation(mut self, mutation: impl Into<String>) -> Self {
        self.mutation = Some(mutation.into());
        self
    }

    pub fn object(
        mut self,
        name: impl Into<String>,
        fields: impl IntoIterator<Item = FieldDefinition>,
    ) -> Self {
        let fields = fields
            .into_iter()
            .map(|field| (field.name.clone(), field))
            .collect();
        self.map.insert(name.into(), Definition::Object { fields });
        self
    }

    pub fn scalar(mut self, name: impl Into<String>) -> Self {
        self.map.insert(name.into(), Definition::Scalar);
        self
    }

    pub fn enumeration<S: Into<String>>(
        mut self,
        name: impl Into<String>,
        values: impl IntoIterator<Item = S>,
    ) -> Self {
        let values = values.into_iter().map(Into::into).collect();
        self.map.insert(name.into(), Definition::Enum { values });
        self
    }

    pub fn get_query(&self) -> &str {
        &self.query
    }

    pub fn get_mutation(&self) -> Option<&str> {
        self.mutation.as_deref()
    }

    pub fn get_definition(&self, type_name: &str) -> Option<&Definition> {
        self.map.get(type_name)
    }

    pub fn get_field(&self, type_name: &str, field_name: &str) -> Option<&FieldDefinition> {
        match self.map.get(type_name) {
            Some(Definition::Object { fields }) => fields.get(field_name),
            _ => None,
        }
    }

    /// Leaf types end recursion: built-in and declared scalars and enums.
    pub fn type_is_leaf(&self, type_name: &str) -> bool {
        match self.map.get(type_name) {
            Some(Definition::Scalar) | Some(Definition::Enum { .. }) => true,
            Some(Definition::Object { .. }) => false,
            None => Scalar::is_predefined(type_name),
        }
    }

    pub fn type_is_enum(&self, type_name: &str) -> bool {
        matches!(self.map.get(type_name), Some(Definition::Enum { .. }))
    }

    pub fn validate_enum_value(&self, type_name: &str, value: &str) -> bool {
        match self.map.get(type_name) {
            Some(Definition::Enum { values }) => values.iter().any(|v| v == value),
            _ => false,
        }
    }

    pub(super) fn insert(&mut self, name: String, definition: Definition) {
        self.map.insert(name, definition);
    }

    pub(super) fn set_query(&mut self, query: String) {
        self.query = query;
    }

    pub(super) fn set_mutation(&mut self, mutation: Option<String>) {
        self.mutation = mutation;
    }

    pub(super) fn contains(&self, type_name: &str) -> bool {
        self.map.contains_key(type_name)
    }
}
