use async_graphql_value::ConstValue;

use crate::core::jit::model::{Field, OperationPlan, PathSegment, Positioned, Variables};
use crate::core::jit::store::{DataPath, Store};
use crate::core::jit::{Error, GraphQLError, Response};
use crate::core::json::{JsonLike, JsonObjectLike};
use crate::core::scalar;
use crate::core::Type;

/// Turns the executor's [`Store`] into a [`Response`]: checks every value
/// against its declared type, records failures with their path and
/// propagates nulls out of non-null positions up to the closest nullable
/// ancestor.
pub struct Synth<'a, Value> {
    plan: &'a OperationPlan,
    store: Store<Result<Value, Error>>,
    variables: &'a Variables<ConstValue>,
}

impl<'a, Value: JsonLike> Synth<'a, Value> {
    pub fn new(
        plan: &'a OperationPlan,
        store: Store<Result<Value, Error>>,
        variables: &'a Variables<ConstValue>,
    ) -> Self {
        Self { plan, store, variables }
    }

    pub fn synthesize(self) -> Response<Value> {
        let mut errors = Vec::new();
        let data = self.object(
            &self.plan.selection,
            &DataPath::new(),
            &mut Vec::new(),
            &mut errors,
        );
        Response::new(data.unwrap_or_else(Value::null)).with_errors(errors)
    }

    /// `None` when a non-null field of the object came out null.
    fn object(
        &self,
        fields: &'a [Field],
        data_path: &DataPath,
        path: &mut Vec<PathSegment>,
        errors: &mut Vec<GraphQLError>,
    ) -> Option<Value> {
        let mut object = Value::JsonObject::with_capacity(fields.len());
        let mut bubbled = false;

        for field in fields.iter().filter(|f| !f.skip(self.variables)) {
            path.push(PathSegment::Field(field.output_name.clone()));
            let value = match self.store.get(field.id, data_path) {
                Some(Ok(value)) => {
                    self.complete(field, &field.type_of, value, data_path, path, errors)
                }
                Some(Err(error)) => {
                    Self::error(field, error.clone(), path, errors);
                    None
                }
                None => {
                    Self::error(field, Error::resolution("Field was not resolved"), path, errors);
                    None
                }
            };
            path.pop();

            match value {
                Some(value) => object.insert_key(&field.output_name, value),
                None if field.type_of.is_nullable() => {
                    object.insert_key(&field.output_name, Value::null())
                }
                None => bubbled = true,
            }
        }

        if bubbled {
            None
        } else {
            Some(Value::object(object))
        }
    }

    /// Completes `value` as an instance of `type_of`. Returns `None` when the
    /// position ends up null, after recording why if the null is not
    /// allowed there.
    fn complete(
        &self,
        field: &'a Field,
        type_of: &Type,
        value: &Value,
        data_path: &DataPath,
        path: &mut Vec<PathSegment>,
        errors: &mut Vec<GraphQLError>,
    ) -> Option<Value> {
        if value.is_null() {
            if !type_of.is_nullable() {
                let error = Error::NullabilityViolation(field.coordinate());
                Self::error(field, error, path, errors);
            }
            return None;
        }

        if type_of.is_list() {
            let Some(items) = value.as_array() else {
                let message = format!("Expected a list for field {}", field.coordinate());
                Self::error(field, Error::Resolution(message), path, errors);
                return None;
            };

            let of_type = type_of.of_type();
            let mut list = Vec::with_capacity(items.len());
            let mut bubbled = false;
            for (index, item) in items.iter().enumerate() {
                path.push(PathSegment::Index(index));
                let data_path = data_path.clone().with_index(index);
                let item = self.complete(field, of_type, item, &data_path, path, errors);
                path.pop();

                match item {
                    Some(item) => list.push(item),
                    None if of_type.is_nullable() => list.push(Value::null()),
                    None => bubbled = true,
                }
            }
            return if bubbled { None } else { Some(Value::array(list)) };
        }

        if field.is_scalar {
            if self.leaf(type_of.name(), value) {
                return Some(value.clone());
            }
            let message = format!("{} cannot represent value {:?}", type_of.name(), value);
            Self::error(field, Error::Resolution(message), path, errors);
            return None;
        }

        if value.as_object().is_none() {
            let message = format!("Expected an object for field {}", field.coordinate());
            Self::error(field, Error::Resolution(message), path, errors);
            return None;
        }

        self.object(&field.selection, data_path, path, errors)
    }

    fn leaf(&self, type_name: &str, value: &Value) -> bool {
        match self.plan.enum_values(type_name) {
            Some(values) => value
                .as_str()
                .map_or(false, |value| values.iter().any(|v| v == value)),
            None => scalar::validate(type_name, value),
        }
    }

    fn error(field: &Field, error: Error, path: &[PathSegment], errors: &mut Vec<GraphQLError>) {
        let error = Positioned::new(error, field.pos).with_path(path.to_vec());
        errors.push(GraphQLError::from(error).with_resolver(field.coordinate()));
    }
}
