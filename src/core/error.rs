use derive_more::From;

use super::cache;

/// Errors raised while setting the engine up: reading configuration,
/// parsing a request or building its plan. Field-level failures never
/// surface here; they are collected into the response instead.
#[derive(From, thiserror::Error, Debug)]
pub enum Error {
    #[error("Std IO Error: {0}")]
    StdIO(std::io::Error),

    #[error("Serde Json Error: {0}")]
    SerdeJson(serde_json::Error),

    #[error("Serde Yaml Error: {0}")]
    SerdeYaml(serde_yaml::Error),

    #[error("Unsupported config format: {0}")]
    #[from(ignore)]
    UnsupportedConfigFormat(String),

    #[error("Parse Error: {0}")]
    Parse(async_graphql_parser::Error),

    #[error("Build Error: {0}")]
    #[from(ignore)]
    Build(String),

    #[error("Cache Error: {0}")]
    Cache(cache::Error),
}

pub type Result<A, E = Error> = std::result::Result<A, E>;
