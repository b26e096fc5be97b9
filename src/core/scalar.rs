use crate::core::json::JsonLike;

/// Built-in scalars the engine can check resolver output against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display)]
pub enum Scalar {
    Int,
    Float,
    String,
    Boolean,
    ID,
    JSON,
}

impl Scalar {
    pub fn find(name: &str) -> Option<Scalar> {
        match name {
            "Int" => Some(Scalar::Int),
            "Float" => Some(Scalar::Float),
            "String" => Some(Scalar::String),
            "Boolean" => Some(Scalar::Boolean),
            "ID" => Some(Scalar::ID),
            "JSON" => Some(Scalar::JSON),
            _ => None,
        }
    }

    pub fn is_predefined(name: &str) -> bool {
        Self::find(name).is_some()
    }

    pub fn validate<Value: JsonLike>(&self, value: &Value) -> bool {
        match self {
            Scalar::Int => value.as_i64().map_or(false, |n| i32::try_from(n).is_ok()),
            Scalar::Float => value.as_f64().is_some(),
            Scalar::String => value.as_str().is_some(),
            Scalar::Boolean => value.as_bool().is_some(),
            Scalar::ID => value.as_str().is_some() || value.as_i64().is_some(),
            Scalar::JSON => true,
        }
    }
}

/// Validates a leaf value against the named scalar. Scalars that are not
/// built in are opaque to the engine and accept any value.
pub fn validate<Value: JsonLike>(type_name: &str, value: &Value) -> bool {
    Scalar::find(type_name).map_or(true, |scalar| scalar.validate(value))
}
