//! Error types for the catalog client.
//!
//! # Design
//! Only request-level failures live here. A response that is not JSON at
//! the top level is a `Decode` error, but a single bad field inside an
//! otherwise readable record never is: the decoder absorbs those into
//! defaults (see `decode`).
//!
//! `NotFound` gets a dedicated variant because callers frequently distinguish
//! "the product does not exist" from "the server returned an unexpected
//! status." Every other failure to obtain a 2xx response lands in
//! `Transport`, with the status (if one was received) and the raw body.

use thiserror::Error;

/// Errors returned by `CatalogClient` parse methods and `Fetcher` operations.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The server returned 404 for a by-id lookup.
    #[error("product not found")]
    NotFound,

    /// Connection failure, timeout, or a non-2xx status other than a by-id 404.
    #[error("transport failure{}: {message}", status_suffix(.status))]
    Transport {
        status: Option<u16>,
        message: String,
        body: String,
    },

    /// The response body was not a JSON document of the expected shape.
    #[error("decode failed: {0}")]
    Decode(String),

    /// The operation was cancelled before the response arrived.
    #[error("request cancelled")]
    Cancelled,

    /// A request could not be encoded (malformed base URL, for instance).
    #[error("serialization failed: {0}")]
    Serialization(String),
}

impl ApiError {
    /// Build a `Transport` error from a response status and body.
    pub fn http(status: u16, body: impl Into<String>) -> Self {
        ApiError::Transport {
            status: Some(status),
            message: format!("unexpected status {status}"),
            body: body.into(),
        }
    }

    /// Build a `Transport` error for a failure that produced no response.
    pub fn connection(message: impl Into<String>) -> Self {
        ApiError::Transport {
            status: None,
            message: message.into(),
            body: String::new(),
        }
    }

    /// HTTP status carried by the error, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::NotFound => Some(404),
            ApiError::Transport { status, .. } => *status,
            _ => None,
        }
    }
}

fn status_suffix(status: &Option<u16>) -> String {
    status.map(|s| format!(" (HTTP {s})")).unwrap_or_default()
}
