use super::{JsonLike, JsonObjectLike};

impl JsonObjectLike for serde_json::Map<String, serde_json::Value> {
    type Value = serde_json::Value;

    fn new() -> Self {
        serde_json::Map::new()
    }

    fn with_capacity(capacity: usize) -> Self {
        serde_json::Map::with_capacity(capacity)
    }

    fn get_key(&self, key: &str) -> Option<&serde_json::Value> {
        self.get(key)
    }

    fn insert_key(&mut self, key: &str, value: Self::Value) {
        self.insert(key.to_owned(), value);
    }

    fn len(&self) -> usize {
        serde_json::Map::len(self)
    }
}

impl JsonLike for serde_json::Value {
    type JsonObject = serde_json::Map<String, serde_json::Value>;

    fn null() -> Self {
        Self::Null
    }

    fn object(obj: Self::JsonObject) -> Self {
        Self::Object(obj)
    }

    fn array(arr: Vec<Self>) -> Self {
        Self::Array(arr)
    }

    fn string(s: String) -> Self {
        Self::String(s)
    }

    fn as_array(&self) -> Option<&Vec<Self>> {
        self.as_array()
    }

    fn as_object(&self) -> Option<&Self::JsonObject> {
        self.as_object()
    }

    fn as_str(&self) -> Option<&str> {
        self.as_str()
    }

    fn as_i64(&self) -> Option<i64> {
        self.as_i64()
    }

    fn as_u64(&self) -> Option<u64> {
        self.as_u64()
    }

    fn as_f64(&self) -> Option<f64> {
        self.as_f64()
    }

    fn as_bool(&self) -> Option<bool> {
        self.as_bool()
    }

    fn is_null(&self) -> bool {
        self.is_null()
    }

    fn get_key(&self, key: &str) -> Option<&Self> {
        match self {
            serde_json::Value::Object(map) => map.get(key),
            _ => None,
        }
    }
}
