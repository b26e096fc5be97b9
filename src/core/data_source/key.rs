use std::collections::BTreeMap;
use std::fmt::{Display, Formatter};

use http::Method;

/// Identity of a logical fetch. Two keys built from the same method,
/// resource and parameters compare equal no matter in which order the
/// parameters were added.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct FetchKey {
    method: Method,
    resource: String,
    params: BTreeMap<String, String>,
}

impl FetchKey {
    pub fn new(method: Method, resource: impl Into<String>) -> Self {
        Self { method, resource: resource.into(), params: BTreeMap::new() }
    }

    pub fn get(resource: impl Into<String>) -> Self {
        Self::new(Method::GET, resource)
    }

    pub fn param(mut self, name: impl Into<String>, value: impl ToString) -> Self {
        self.params.insert(name.into(), value.to_string());
        self
    }

    pub fn params<K: Into<String>, V: ToString>(
        self,
        params: impl IntoIterator<Item = (K, V)>,
    ) -> Self {
        params
            .into_iter()
            .fold(self, |key, (name, value)| key.param(name, value))
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn resource(&self) -> &str {
        &self.resource
    }

    pub fn get_param(&self, name: &str) -> Option<&str> {
        self.params.get(name).map(String::as_str)
    }
}

impl Display for FetchKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.method, self.resource)?;
        for (i, (name, value)) in self.params.iter().enumerate() {
            let sep = if i == 0 { '?' } else { '&' };
            write!(f, "{}{}={}", sep, name, value)?;
        }
        Ok(())
    }
}

impl From<&str> for FetchKey {
    fn from(value: &str) -> Self {
        FetchKey::get(value)
    }
}

impl From<String> for FetchKey {
    fn from(value: String) -> Self {
        FetchKey::get(value)
    }
}
