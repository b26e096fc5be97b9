use std::collections::HashMap;
use std::fmt::{Debug, Formatter};

use async_graphql_parser::types::OperationType;
use async_graphql_value::ConstValue;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::core::json::JsonLike;
use crate::core::Type;

#[derive(Clone, Debug)]
pub struct Arg {
    pub name: String,
    pub type_of: Type,
    pub value: Option<async_graphql_value::Value>,
    pub default_value: Option<ConstValue>,
}

#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct FieldId(usize);

impl Debug for FieldId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FieldId {
    pub fn new(id: usize) -> Self {
        FieldId(id)
    }
    pub fn as_usize(&self) -> usize {
        self.0
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Variable(String);

impl Variable {
    pub fn new(name: impl Into<String>) -> Self {
        Variable(name.into())
    }
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// A `@skip` or `@include` directive whose argument is a variable. Constant
/// conditions are settled while the plan is built.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Condition {
    Skip(Variable),
    Include(Variable),
    /// Holds when every condition of at least one group holds. Produced when
    /// copies of a field requested under different conditions are merged.
    Any(Vec<Vec<Condition>>),
}

impl Condition {
    fn holds(&self, variables: &Variables<ConstValue>) -> bool {
        let flag = |variable: &Variable, default: bool| {
            variables
                .get(variable.as_str())
                .and_then(|value| value.as_bool())
                .unwrap_or(default)
        };
        match self {
            Condition::Skip(variable) => !flag(variable, false),
            Condition::Include(variable) => flag(variable, true),
            Condition::Any(groups) => groups
                .iter()
                .any(|group| group.iter().all(|c| c.holds(variables))),
        }
    }
}

/// A requested field in the plan: one selection node of the query.
#[derive(Clone)]
pub struct Field {
    pub id: FieldId,
    /// Name of the field in the schema.
    pub name: String,
    /// Key of the field in the response, the alias if one was given.
    pub output_name: String,
    pub parent_type: String,
    pub type_of: Type,
    /// Set when the named type is a scalar or an enum.
    pub is_scalar: bool,
    pub args: Vec<Arg>,
    pub conditions: Vec<Condition>,
    pub pos: Pos,
    pub selection: Vec<Field>,
}

impl Field {
    #[inline(always)]
    pub fn skip(&self, variables: &Variables<ConstValue>) -> bool {
        !self.conditions.iter().all(|c| c.holds(variables))
    }

    pub fn is_typename(&self) -> bool {
        self.name == "__typename"
    }

    /// Coordinate of the resolver responsible for this field.
    pub fn coordinate(&self) -> String {
        format!("{}.{}", self.parent_type, self.name)
    }
}

impl Debug for Field {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let mut debug_struct = f.debug_struct("Field");
        debug_struct.field("id", &self.id);
        debug_struct.field("name", &self.name);
        if self.output_name != self.name {
            debug_struct.field("output_name", &self.output_name);
        }
        debug_struct.field("type_of", &self.type_of);
        if !self.args.is_empty() {
            debug_struct.field("args", &self.args);
        }
        if !self.conditions.is_empty() {
            debug_struct.field("conditions", &self.conditions);
        }
        if !self.selection.is_empty() {
            debug_struct.field("selection", &self.selection);
        }
        debug_struct.finish()
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Pos {
    pub line: usize,
    pub column: usize,
}

impl From<async_graphql_parser::Pos> for Pos {
    fn from(pos: async_graphql_parser::Pos) -> Self {
        Self { line: pos.line, column: pos.column }
    }
}

/// A step in the path from the response root to a value.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PathSegment {
    Field(String),
    Index(usize),
}

impl From<&str> for PathSegment {
    fn from(name: &str) -> Self {
        PathSegment::Field(name.to_string())
    }
}

impl From<usize> for PathSegment {
    fn from(index: usize) -> Self {
        PathSegment::Index(index)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Positioned<A> {
    pub value: A,
    pub pos: Pos,
    pub path: Vec<PathSegment>,
}

impl<A> Positioned<A> {
    pub fn new(value: A, pos: Pos) -> Self {
        Positioned { value, pos, path: Vec::new() }
    }

    pub fn with_path(self, path: Vec<PathSegment>) -> Self {
        Self { path, ..self }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Variables<Value>(IndexMap<String, Value>);

impl<Value: JsonLike> Variables<Value> {
    pub fn new() -> Self {
        Self(IndexMap::new())
    }
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }
    pub fn insert(&mut self, key: String, value: Value) {
        self.0.insert(key, value);
    }
    pub fn contains(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }
}

impl<V, K: Into<String>> FromIterator<(K, V)> for Variables<V> {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }
}

#[derive(Clone, Debug)]
pub struct OperationPlan {
    pub operation_type: OperationType,
    pub root_name: String,
    pub selection: Vec<Field>,
    /// Defaults declared for the operation's variables.
    pub variable_defaults: IndexMap<String, ConstValue>,
    /// Values of every enum type the plan returns.
    pub enums: HashMap<String, Vec<String>>,
    size: usize,
}

impl OperationPlan {
    pub fn new(
        operation_type: OperationType,
        root_name: impl Into<String>,
        selection: Vec<Field>,
        variable_defaults: IndexMap<String, ConstValue>,
        enums: HashMap<String, Vec<String>>,
        size: usize,
    ) -> Self {
        Self {
            operation_type,
            root_name: root_name.into(),
            selection,
            variable_defaults,
            enums,
            size,
        }
    }

    pub fn is_query(&self) -> bool {
        self.operation_type == OperationType::Query
    }

    pub fn enum_values(&self, type_name: &str) -> Option<&[String]> {
        self.enums.get(type_name).map(Vec::as_slice)
    }

    /// Number of fields in the plan, counting nested ones.
    pub fn size(&self) -> usize {
        self.size
    }

    pub fn find_field(&self, id: FieldId) -> Option<&Field> {
        fn find(fields: &[Field], id: FieldId) -> Option<&Field> {
            fields
                .iter()
                .find_map(|f| if f.id == id { Some(f) } else { find(&f.selection, id) })
        }
        find(&self.selection, id)
    }

    /// Finds a field by its chain of output names from the root.
    pub fn find_field_path<S: AsRef<str>>(&self, path: &[S]) -> Option<&Field> {
        let (first, rest) = path.split_first()?;
        let mut field = self
            .selection
            .iter()
            .find(|f| f.output_name == first.as_ref())?;
        for name in rest {
            field = field
                .selection
                .iter()
                .find(|f| f.output_name == name.as_ref())?;
        }
        Some(field)
    }

    /// Request variables layered over the operation's declared defaults.
    pub fn variables(&self, request: &Variables<ConstValue>) -> Variables<ConstValue> {
        let mut variables: Variables<ConstValue> = self
            .variable_defaults
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();
        for (k, v) in request.0.iter() {
            variables.insert(k.clone(), v.clone());
        }
        variables
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn field(conditions: Vec<Condition>) -> Field {
        Field {
            id: FieldId::new(0),
            name: "title".into(),
            output_name: "title".into(),
            parent_type: "Album".into(),
            type_of: Type::named("String"),
            is_scalar: true,
            args: vec![],
            conditions,
            pos: Pos::default(),
            selection: vec![],
        }
    }

    #[test]
    fn test_skip_and_include() {
        let vars: Variables<ConstValue> =
            [("yes", ConstValue::Boolean(true)), ("no", ConstValue::Boolean(false))]
                .into_iter()
                .collect();

        assert!(!field(vec![]).skip(&vars));
        assert!(field(vec![Condition::Skip(Variable::new("yes"))]).skip(&vars));
        assert!(!field(vec![Condition::Skip(Variable::new("no"))]).skip(&vars));
        assert!(field(vec![Condition::Include(Variable::new("no"))]).skip(&vars));
        assert!(!field(vec![Condition::Include(Variable::new("absent"))]).skip(&vars));
        assert!(field(vec![
            Condition::Include(Variable::new("yes")),
            Condition::Skip(Variable::new("yes"))
        ])
        .skip(&vars));
    }

    #[test]
    fn test_any_condition() {
        let vars: Variables<ConstValue> =
            [("yes", ConstValue::Boolean(true)), ("no", ConstValue::Boolean(false))]
                .into_iter()
                .collect();
        let any = |groups| field(vec![Condition::Any(groups)]);

        assert!(!any(vec![
            vec![Condition::Include(Variable::new("no"))],
            vec![Condition::Skip(Variable::new("no"))],
        ])
        .skip(&vars));
        assert!(any(vec![
            vec![Condition::Include(Variable::new("no"))],
            vec![Condition::Skip(Variable::new("yes"))],
        ])
        .skip(&vars));
    }

    #[test]
    fn test_path_segment_serializes_untagged() {
        let path = vec![PathSegment::from("album"), PathSegment::from(2usize), "title".into()];
        assert_eq!(
            serde_json::to_value(path).unwrap(),
            serde_json::json!(["album", 2, "title"])
        );
    }
}
