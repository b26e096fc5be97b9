use derive_more::From;

use crate::core::cache;

/// An outbound call made through a [`super::DataSource`] failed.
#[derive(From, thiserror::Error, Debug, Clone, PartialEq)]
pub enum FetchError {
    #[error("Upstream responded with status {status}: {message}")]
    #[from(ignore)]
    Status { status: u16, message: String },

    #[error("Network Error: {0}")]
    #[from(ignore)]
    Network(String),

    #[error("Timeout Error: upstream did not respond in time")]
    #[from(ignore)]
    Timeout,

    #[error("Decode Error: {0}")]
    #[from(ignore)]
    Decode(String),

    #[error("Cache Error: {0}")]
    Cache(cache::Error),
}

impl FetchError {
    pub fn status(status: u16, message: impl Into<String>) -> Self {
        FetchError::Status { status, message: message.into() }
    }

    /// The upstream status code when the call reached the upstream.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            FetchError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for FetchError {
    fn from(error: serde_json::Error) -> Self {
        FetchError::Decode(error.to_string())
    }
}

impl From<tokio::time::error::Elapsed> for FetchError {
    fn from(_: tokio::time::error::Elapsed) -> Self {
        FetchError::Timeout
    }
}
