//! Error types for the Grist API client.
//!
//! # Design
//! Every non-2xx response becomes `GristError::Http` with the raw status and
//! body text; no status code gets its own variant. Failures that happen
//! before a response exists are carried through `Transport` untouched so
//! callers can downcast to the transport's own error type.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, GristError>;

/// Errors returned by `GristClient` operations and the endpoint parsers.
#[derive(Debug, Error)]
pub enum GristError {
    /// The server answered with a status outside `200..300`.
    #[error("Status {status_code}: {message}")]
    Http { status_code: u16, message: String },

    /// The transport failed before a response was received.
    #[error(transparent)]
    Transport(Box<dyn std::error::Error + Send + Sync>),

    /// A request payload could not be serialized to JSON.
    #[error("serialization failed: {0}")]
    Serialization(#[source] serde_json::Error),

    /// A 2xx response body did not have the expected JSON shape.
    #[error("deserialization failed: {0}")]
    Deserialization(#[source] serde_json::Error),
}

impl GristError {
    pub(crate) fn transport<E>(err: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        GristError::Transport(Box::new(err))
    }

    /// The HTTP status code, for `Http` errors.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            GristError::Http { status_code, .. } => Some(*status_code),
            _ => None,
        }
    }
}
