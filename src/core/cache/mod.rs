mod cache;
mod error;
mod noop;

pub use cache::InMemoryCache;
pub use error::{Error, Result};
pub use noop::NoopCache;
