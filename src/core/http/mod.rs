mod metadata;
mod request_context;

pub use metadata::{Principal, RequestMetadata};
pub(crate) use request_context::filter_headers;
pub use request_context::RequestContext;
