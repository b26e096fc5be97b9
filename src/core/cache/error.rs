use std::fmt::Display;

use derive_more::Debug;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    #[debug("Lock Poisoned: {}", _0)]
    Poisoned(String),

    #[debug("Kv Error: {}", _0)]
    Kv(String),
}

pub type Result<A> = std::result::Result<A, Error>;

impl Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::Poisoned(error) => write!(f, "Lock Poisoned: {}", error),
            Error::Kv(error) => write!(f, "Kv Error: {}", error),
        }
    }
}

impl std::error::Error for Error {}
