use derive_more::From;

use crate::core::data_source::FetchError;

/// Failure of a single field. Collected into the response next to partial
/// data; never aborts sibling fields.
#[derive(From, thiserror::Error, Debug, Clone, PartialEq)]
pub enum Error {
    #[error("{0}")]
    #[from(ignore)]
    Resolution(String),

    #[error("{0}")]
    Fetch(FetchError),

    #[error("Cannot return null for non-nullable field {0}")]
    #[from(ignore)]
    NullabilityViolation(String),

    #[error("Request timed out")]
    #[from(ignore)]
    Timeout,

    #[error("Request was cancelled")]
    #[from(ignore)]
    Cancelled,

    #[error("Variable `{0}` is not defined")]
    #[from(ignore)]
    Variable(String),
}

impl Error {
    pub fn resolution(message: impl Into<String>) -> Self {
        Error::Resolution(message.into())
    }

    /// Stable code reported in the error's extensions.
    pub fn code(&self) -> &'static str {
        match self {
            Error::Resolution(_) | Error::Variable(_) => "RESOLUTION_ERROR",
            Error::Fetch(_) => "FETCH_ERROR",
            Error::NullabilityViolation(_) => "NULLABILITY_VIOLATION",
            Error::Timeout => "TIMEOUT",
            Error::Cancelled => "CANCELLED",
        }
    }

    /// Upstream status for fetches that got a non-success response.
    pub fn status(&self) -> Option<u16> {
        match self {
            Error::Fetch(error) => error.status_code(),
            _ => None,
        }
    }
}

impl From<anyhow::Error> for Error {
    fn from(error: anyhow::Error) -> Self {
        Error::Resolution(format!("{:#}", error))
    }
}

pub type Result<A, E = Error> = std::result::Result<A, E>;
