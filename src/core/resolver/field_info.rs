use async_graphql_parser::types::OperationType;

use crate::core::jit::{Field, PathSegment};
use crate::core::Type;

/// What a resolver knows about the field it is resolving.
#[derive(Debug, Clone, Copy)]
pub struct FieldInfo<'a> {
    field: &'a Field,
    path: &'a [PathSegment],
    operation: OperationType,
}

impl<'a> FieldInfo<'a> {
    pub fn new(field: &'a Field, path: &'a [PathSegment], operation: OperationType) -> Self {
        Self { field, path, operation }
    }

    pub fn name(&self) -> &'a str {
        &self.field.name
    }

    pub fn output_name(&self) -> &'a str {
        &self.field.output_name
    }

    pub fn parent_type(&self) -> &'a str {
        &self.field.parent_type
    }

    pub fn type_of(&self) -> &'a Type {
        &self.field.type_of
    }

    pub fn is_nullable(&self) -> bool {
        self.field.type_of.is_nullable()
    }

    /// Response path of the field, ending with its output name.
    pub fn path(&self) -> &'a [PathSegment] {
        self.path
    }

    pub fn is_query(&self) -> bool {
        self.operation == OperationType::Query
    }
}
