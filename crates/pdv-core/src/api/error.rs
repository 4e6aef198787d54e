//! Errors raised by the REST client.

use serde_json::Value;
use thiserror::Error;

use super::Method;

/// Longest response body excerpt kept in an HTTP error.
const BODY_EXCERPT_LEN: usize = 512;

#[derive(Debug, Error)]
pub enum ApiError {
    /// Curl reported an error (connection refused, TLS failure, timeout, ...).
    #[error("{method} {url}: {source}")]
    Transport {
        method: Method,
        url: String,
        #[source]
        source: curl::Error,
    },

    /// The service answered with a non-2xx status.
    #[error("{method} {url} returned HTTP {status}: {body}")]
    Http {
        method: Method,
        url: String,
        status: u32,
        body: String,
    },

    /// A path could not be resolved against the configured base URL.
    #[error("invalid URL {url:?}: {source}")]
    Url {
        url: String,
        #[source]
        source: url::ParseError,
    },

    #[error("could not encode request body: {0}")]
    Encode(#[source] serde_json::Error),

    #[error("{url} did not return valid JSON: {source}")]
    Decode {
        url: String,
        #[source]
        source: serde_json::Error,
    },

    /// A response lacked a field the client needs to continue.
    #[error("{context}: response has no {field:?} field")]
    MissingField { context: String, field: String },

    /// A spawned task finished unsuccessfully.
    #[error("task {href} ended in state {state:?}: {error}")]
    Task {
        href: String,
        state: String,
        error: Value,
    },

    #[error("task {href} did not finish after {polls} polls")]
    TaskTimeout { href: String, polls: u32 },

    /// The response handler cannot be used against this service version.
    #[error("{0}")]
    Unsupported(String),
}

impl ApiError {
    /// HTTP status carried by the error, if it is an HTTP error.
    pub fn status(&self) -> Option<u32> {
        match self {
            ApiError::Http { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub(crate) fn http(method: Method, url: &str, status: u32, body: &[u8]) -> Self {
        let text = String::from_utf8_lossy(body);
        let body = match text.char_indices().nth(BODY_EXCERPT_LEN) {
            Some((idx, _)) => format!("{}...", &text[..idx]),
            None => text.into_owned(),
        };
        ApiError::Http {
            method,
            url: url.to_string(),
            status,
            body,
        }
    }

    pub(crate) fn missing(context: &str, field: &str) -> Self {
        ApiError::MissingField {
            context: context.to_string(),
            field: field.to_string(),
        }
    }
}
