//! Error types for the Smart Invites client.
//!
//! # Design
//! One enum covers the whole call path so facade methods can use `?` across
//! building, sending and parsing. `Validation` is raised before any request
//! leaves the process; `Api` and `Mapping` describe what came back.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// Errors returned by `CronofyClient` and the request builders.
#[derive(Debug, Error)]
pub enum Error {
    /// A builder was missing a required field or held an invalid combination.
    #[error("invalid request: {0}")]
    Validation(String),

    /// The server answered with a non-2xx status.
    #[error("HTTP {status}: {body}")]
    Api { status: u16, body: String },

    /// The response body did not match the expected shape at `path`.
    #[error("unexpected response at `{path}`: {message}")]
    Mapping { path: String, message: String },

    /// The request payload could not be serialized to JSON.
    #[error("serialization failed: {0}")]
    Serialization(String),

    /// The transport could not complete the exchange.
    #[error("transport failed: {0}")]
    Transport(String),
}

impl Error {
    pub(crate) fn validation(message: impl Into<String>) -> Self {
        Error::Validation(message.into())
    }

    pub(crate) fn mapping(path: impl Into<String>, message: impl Into<String>) -> Self {
        Error::Mapping {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Status code of an `Api` error.
    pub fn status(&self) -> Option<u16> {
        match self {
            Error::Api { status, .. } => Some(*status),
            _ => None,
        }
    }
}
