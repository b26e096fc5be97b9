mod graphql;
mod json_like;
mod serde;

pub use json_like::*;
