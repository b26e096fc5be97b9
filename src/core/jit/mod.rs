mod builder;
mod error;
mod exec;
mod graphql_error;
mod graphql_executor;
mod model;
mod request;
mod response;
mod store;
mod synth;

pub use builder::*;
pub use error::*;
pub use exec::*;
pub use graphql_error::*;
pub use graphql_executor::*;
pub use model::*;
pub use request::*;
pub use response::*;
pub use store::*;
pub use synth::*;
