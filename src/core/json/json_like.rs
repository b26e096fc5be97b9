use std::fmt::Debug;

/// A trait for values that can stand in as parent values and resolver
/// outputs. Resolution never inspects a value beyond what this trait
/// exposes, so any representation that implements it can flow through the
/// engine.
pub trait JsonLike: Sized + Clone + Debug + Send + Sync + 'static {
    type JsonObject: JsonObjectLike<Value = Self>;

    // Constructors
    fn null() -> Self;
    fn object(obj: Self::JsonObject) -> Self;
    fn array(arr: Vec<Self>) -> Self;
    fn string(s: String) -> Self;

    // Operators
    fn as_array(&self) -> Option<&Vec<Self>>;
    fn as_object(&self) -> Option<&Self::JsonObject>;
    fn as_str(&self) -> Option<&str>;
    fn as_i64(&self) -> Option<i64>;
    fn as_u64(&self) -> Option<u64>;
    fn as_f64(&self) -> Option<f64>;
    fn as_bool(&self) -> Option<bool>;
    fn is_null(&self) -> bool;
    fn get_key(&self, key: &str) -> Option<&Self>;

    fn get_path<T: AsRef<str>>(&self, path: &[T]) -> Option<&Self> {
        let mut val = self;
        for token in path {
            val = match val.as_array() {
                Some(arr) => arr.get(token.as_ref().parse::<usize>().ok()?)?,
                None => val.get_key(token.as_ref())?,
            };
        }
        Some(val)
    }
}

/// A trait for objects that can be used as JSON objects
pub trait JsonObjectLike: Sized {
    type Value;
    fn new() -> Self;
    fn with_capacity(capacity: usize) -> Self;
    fn get_key(&self, key: &str) -> Option<&Self::Value>;
    fn insert_key(&mut self, key: &str, value: Self::Value);
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use async_graphql_value::ConstValue;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::{JsonLike, JsonObjectLike};

    fn build<Value: JsonLike>() -> Value {
        let mut album = Value::JsonObject::new();
        album.insert_key("title", Value::string("Kind of Blue".to_string()));
        album.insert_key(
            "tracks",
            Value::array(vec![Value::string("So What".to_string()), Value::null()]),
        );
        Value::object(album)
    }

    #[test]
    fn test_get_key_const_value() {
        let value: ConstValue = build();
        assert_eq!(
            value.get_key("title").and_then(|v| v.as_str()),
            Some("Kind of Blue")
        );
        assert!(value.get_key("artist").is_none());
    }

    #[test]
    fn test_get_key_serde_value() {
        let value: serde_json::Value = build();
        assert_eq!(
            value,
            json!({"title": "Kind of Blue", "tracks": ["So What", null]})
        );
        assert!(value.get_key("artist").is_none());
    }

    #[test]
    fn test_get_path() {
        let value: serde_json::Value = build();
        assert_eq!(
            value.get_path(&["tracks", "0"]).and_then(|v| v.as_str()),
            Some("So What")
        );
        assert!(value.get_path(&["tracks", "1"]).unwrap().is_null());
        assert!(value.get_path(&["tracks", "7"]).is_none());
        assert!(value.get_path(&["title", "x"]).is_none());
    }

    #[test]
    fn test_get_key_on_scalar() {
        let value = ConstValue::Boolean(true);
        assert!(value.get_key("anything").is_none());
        assert_eq!(value.as_bool(), Some(true));
    }
}
