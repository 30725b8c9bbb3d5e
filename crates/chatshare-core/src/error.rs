//! Error types for chatshare.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    /// The share request never produced a usable HTTP response
    /// (transport error, timeout, non-2xx status).
    #[error("Network error: {0}")]
    Network(String),

    /// The endpoint answered but the body did not carry a shareable URL.
    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    #[error("A share is already in progress")]
    Busy,

    #[error("DOM error: {0}")]
    Dom(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Whether this failure came from the delivery step.
    pub fn is_delivery(&self) -> bool {
        matches!(self, Error::Network(_) | Error::MalformedResponse(_))
    }
}

pub type Result<T> = std::result::Result<T, Error>;
