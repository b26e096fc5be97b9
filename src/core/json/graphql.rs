use async_graphql_value::{ConstValue, Name};
use indexmap::IndexMap;

use super::{JsonLike, JsonObjectLike};

impl JsonObjectLike for IndexMap<Name, ConstValue> {
    type Value = ConstValue;

    fn new() -> Self {
        IndexMap::new()
    }

    fn with_capacity(capacity: usize) -> Self {
        IndexMap::with_capacity(capacity)
    }

    fn get_key(&self, key: &str) -> Option<&ConstValue> {
        self.get(key)
    }

    fn insert_key(&mut self, key: &str, value: ConstValue) {
        self.insert(Name::new(key), value);
    }

    fn len(&self) -> usize {
        IndexMap::len(self)
    }
}

impl JsonLike for ConstValue {
    type JsonObject = IndexMap<Name, ConstValue>;

    fn null() -> Self {
        ConstValue::Null
    }

    fn object(obj: Self::JsonObject) -> Self {
        ConstValue::Object(obj)
    }

    fn array(arr: Vec<Self>) -> Self {
        ConstValue::List(arr)
    }

    fn string(s: String) -> Self {
        ConstValue::String(s)
    }

    fn as_array(&self) -> Option<&Vec<Self>> {
        match self {
            ConstValue::List(seq) => Some(seq),
            _ => None,
        }
    }

    fn as_object(&self) -> Option<&Self::JsonObject> {
        match self {
            ConstValue::Object(map) => Some(map),
            _ => None,
        }
    }

    fn as_str(&self) -> Option<&str> {
        match self {
            ConstValue::String(s) => Some(s),
            ConstValue::Enum(name) => Some(name.as_str()),
            _ => None,
        }
    }

    fn as_i64(&self) -> Option<i64> {
        match self {
            ConstValue::Number(n) => n.as_i64(),
            _ => None,
        }
    }

    fn as_u64(&self) -> Option<u64> {
        match self {
            ConstValue::Number(n) => n.as_u64(),
            _ => None,
        }
    }

    fn as_f64(&self) -> Option<f64> {
        match self {
            ConstValue::Number(n) => n.as_f64(),
            _ => None,
        }
    }

    fn as_bool(&self) -> Option<bool> {
        match self {
            ConstValue::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    fn is_null(&self) -> bool {
        matches!(self, ConstValue::Null)
    }

    fn get_key(&self, key: &str) -> Option<&Self> {
        match self {
            ConstValue::Object(map) => map.get(key),
            _ => None,
        }
    }
}
