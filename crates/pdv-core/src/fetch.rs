//! Plain HTTP GET of reference content.
//!
//! Fetches bytes straight from a fixture origin, without credentials and
//! without any of the API client's response handling.

use thiserror::Error;

use crate::api::{ApiError, CurlTransport, HttpRequest, Method, Transport};

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("GET {url}: {source}")]
    Transport {
        url: String,
        #[source]
        source: curl::Error,
    },
    #[error("GET {url} returned HTTP {status}")]
    Http { url: String, status: u32 },
}

/// Options for [`http_get`].
#[derive(Debug, Clone, Copy)]
pub struct FetchOptions {
    pub verify_tls: bool,
}

impl Default for FetchOptions {
    fn default() -> Self {
        Self { verify_tls: true }
    }
}

/// Downloads `url` with a single GET and returns the body.
/// Follows redirects; any non-2xx final status is an error.
pub fn http_get(url: &str, opts: FetchOptions) -> Result<Vec<u8>, FetchError> {
    let transport = CurlTransport::new(opts.verify_tls);
    let request = HttpRequest {
        method: Method::Get,
        url: url.to_string(),
        body: None,
        auth: None,
    };
    let response = transport.send(&request).map_err(|e| match e {
        ApiError::Transport { url, source, .. } => FetchError::Transport { url, source },
        other => FetchError::Http {
            url: url.to_string(),
            status: other.status().unwrap_or(0),
        },
    })?;
    if !response.is_success() {
        return Err(FetchError::Http {
            url: url.to_string(),
            status: response.status,
        });
    }
    tracing::debug!(url, bytes = response.body.len(), "fetched");
    Ok(response.body)
}
