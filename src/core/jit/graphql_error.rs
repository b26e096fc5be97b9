use std::collections::BTreeMap;
use std::fmt::{Display, Formatter};

use async_graphql_value::ConstValue;
use serde::{Deserialize, Serialize};

use super::{Error, PathSegment, Pos, Positioned};

/// An error as reported to the client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphQLError {
    /// An explanatory message of the error.
    pub message: String,
    /// Where the error occurred.
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub locations: Vec<Pos>,
    /// If the error occurred in a resolver, the path to the error.
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub path: Vec<PathSegment>,
    /// Extensions to the error.
    #[serde(skip_serializing_if = "error_extensions_is_empty", default)]
    pub extensions: Option<ErrorExtensionValues>,
    /// `Type.field` coordinate of the resolver the error originates from.
    #[serde(skip)]
    pub resolver: Option<String>,
}

impl GraphQLError {
    /// Create a new server error with the message.
    pub fn new(message: impl Into<String>, pos: Option<Pos>) -> Self {
        Self {
            message: message.into(),
            locations: pos.map(|pos| vec![pos]).unwrap_or_default(),
            path: Vec::new(),
            extensions: None,
            resolver: None,
        }
    }

    #[must_use]
    pub fn with_path(self, path: Vec<PathSegment>) -> Self {
        Self { path, ..self }
    }

    #[must_use]
    pub fn with_resolver(self, resolver: impl Into<String>) -> Self {
        Self { resolver: Some(resolver.into()), ..self }
    }

    /// The `code` extension, if any.
    pub fn code(&self) -> Option<&str> {
        match self.extensions.as_ref()?.get("code")? {
            ConstValue::String(code) => Some(code),
            _ => None,
        }
    }
}

impl From<Positioned<Error>> for GraphQLError {
    fn from(value: Positioned<Error>) -> Self {
        let error = value.value;
        let mut extensions = ErrorExtensionValues::default();
        extensions.set("code", error.code().to_string());
        if let Some(status) = error.status() {
            extensions.set("status", status);
        }

        let mut server_error = GraphQLError::new(error.to_string(), Some(value.pos));
        server_error.extensions = Some(extensions);
        server_error.path = value.path;
        server_error
    }
}

impl From<crate::core::Error> for GraphQLError {
    fn from(error: crate::core::Error) -> Self {
        let locations = match &error {
            crate::core::Error::Parse(e) => e.positions().map(Pos::from).collect(),
            _ => Vec::new(),
        };
        Self { locations, ..GraphQLError::new(error.to_string(), None) }
    }
}

impl Display for GraphQLError {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        f.write_str(&self.message)
    }
}

fn error_extensions_is_empty(values: &Option<ErrorExtensionValues>) -> bool {
    values.as_ref().map_or(true, |values| values.0.is_empty())
}

/// Extensions to the error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(transparent)]
pub struct ErrorExtensionValues(BTreeMap<String, ConstValue>);

impl ErrorExtensionValues {
    /// Set an extension value.
    pub fn set(&mut self, name: impl AsRef<str>, value: impl Into<ConstValue>) {
        self.0.insert(name.as_ref().to_string(), value.into());
    }

    /// Unset an extension value.
    pub fn unset(&mut self, name: impl AsRef<str>) {
        self.0.remove(name.as_ref());
    }

    /// Get an extension value.
    pub fn get(&self, name: impl AsRef<str>) -> Option<&ConstValue> {
        self.0.get(name.as_ref())
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;
    use crate::core::data_source::FetchError;

    #[test]
    fn test_fetch_error_carries_status() {
        let error = Positioned::new(
            Error::from(FetchError::status(404, "not found")),
            Pos { line: 2, column: 5 },
        )
        .with_path(vec!["album".into(), 0usize.into(), "track".into()]);

        let error = GraphQLError::from(error).with_resolver("Album.track");
        assert_eq!(error.code(), Some("FETCH_ERROR"));
        assert_eq!(error.resolver.as_deref(), Some("Album.track"));
        assert_eq!(
            serde_json::to_value(&error).unwrap(),
            json!({
                "message": "Upstream responded with status 404: not found",
                "locations": [{"line": 2, "column": 5}],
                "path": ["album", 0, "track"],
                "extensions": {"code": "FETCH_ERROR", "status": 404}
            })
        );
    }

    #[test]
    fn test_parse_error_has_location() {
        let error = async_graphql_parser::parse_query("{ album {").unwrap_err();
        let error = GraphQLError::from(crate::core::Error::from(error));
        assert!(!error.locations.is_empty());
        assert!(error.code().is_none());
    }
}
