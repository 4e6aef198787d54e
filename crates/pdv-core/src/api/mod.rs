//! Blocking REST client for the Pulp API.
//!
//! Requests go through a [`Transport`] (libcurl in production, a stub in
//! tests). The client's [`ResponseHandler`] decides what happens to each
//! response: returned as-is, checked for an error status, waited on when it
//! spawned tasks, or decoded as JSON (optionally walking paginated results).

mod client;
mod error;
mod handler;
mod page;
pub mod tasks;
mod transport;


pub use client::Client;
pub use error::ApiError;
pub use handler::{Handled, ResponseHandler};
pub use transport::{CurlTransport, Transport};

use std::fmt;

/// HTTP method of a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Head,
    Options,
    Post,
    Put,
    Patch,
    Delete,
}

impl Method {
    pub fn as_str(self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Head => "HEAD",
            Method::Options => "OPTIONS",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Patch => "PATCH",
            Method::Delete => "DELETE",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Basic-auth credentials.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

/// Fully resolved request handed to a transport.
#[derive(Debug, Clone, PartialEq)]
pub struct HttpRequest {
    pub method: Method,
    pub url: String,
    /// Encoded JSON body, if any.
    pub body: Option<Vec<u8>>,
    pub auth: Option<Credentials>,
}

/// Response as received from the transport.
#[derive(Debug, Clone, PartialEq)]
pub struct HttpResponse {
    pub method: Method,
    pub url: String,
    pub status: u32,
    pub body: Vec<u8>,
}

impl HttpResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Return `self` on 2xx, otherwise an [`ApiError::Http`].
    pub fn error_for_status(self) -> Result<Self, ApiError> {
        if self.is_success() {
            Ok(self)
        } else {
            Err(ApiError::http(self.method, &self.url, self.status, &self.body))
        }
    }

    /// Decode the body as JSON. An empty body decodes to `null`.
    pub fn json(&self) -> Result<serde_json::Value, ApiError> {
        if self.body.iter().all(u8::is_ascii_whitespace) {
            return Ok(serde_json::Value::Null);
        }
        serde_json::from_slice(&self.body).map_err(|source| ApiError::Decode {
            url: self.url.clone(),
            source,
        })
    }
}
