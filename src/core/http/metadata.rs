use derive_setters::Setters;
use http::{Extensions, HeaderMap};
use tokio_util::sync::CancellationToken;

/// The authenticated caller, as established by whoever accepted the request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Principal {
    pub id: String,
    pub roles: Vec<String>,
}

impl Principal {
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into(), roles: Vec::new() }
    }

    pub fn with_role(mut self, role: impl Into<String>) -> Self {
        self.roles.push(role.into());
        self
    }

    pub fn has_role(&self, role: &str) -> bool {
        self.roles.iter().any(|r| r == role)
    }
}

/// Everything the transport knows about an incoming request.
#[derive(Debug, Default, Setters)]
#[setters(strip_option)]
pub struct RequestMetadata {
    pub headers: HeaderMap,
    pub principal: Option<Principal>,
    /// Cancelling this token cancels the request.
    pub cancellation: Option<CancellationToken>,
    /// Typed collaborators handed through to resolvers.
    pub extensions: Extensions,
}
