//! Request transport.
//!
//! Uses the curl crate (libcurl) with one easy handle per request. Runs in the
//! current thread and blocks until the whole body has been received.

use curl::easy::{Easy, List};
use std::time::Duration;

use super::{ApiError, HttpRequest, HttpResponse, Method};

/// Sends a fully resolved request and returns the raw response.
///
/// Implementations must not interpret the status code; that is the job of
/// the client's response handler.
pub trait Transport {
    fn send(&self, request: &HttpRequest) -> Result<HttpResponse, ApiError>;
}

/// libcurl-backed transport.
#[derive(Debug, Clone)]
pub struct CurlTransport {
    verify_tls: bool,
    connect_timeout: Duration,
    timeout: Duration,
}

impl Default for CurlTransport {
    fn default() -> Self {
        Self {
            verify_tls: true,
            connect_timeout: Duration::from_secs(15),
            timeout: Duration::from_secs(300),
        }
    }
}

impl CurlTransport {
    pub fn new(verify_tls: bool) -> Self {
        Self {
            verify_tls,
            ..Self::default()
        }
    }

    fn configure(&self, easy: &mut Easy, request: &HttpRequest) -> Result<(), curl::Error> {
        easy.url(&request.url)?;
        easy.follow_location(true)?;
        easy.max_redirections(10)?;
        easy.connect_timeout(self.connect_timeout)?;
        easy.timeout(self.timeout)?;
        easy.ssl_verify_peer(self.verify_tls)?;
        easy.ssl_verify_host(self.verify_tls)?;

        match request.method {
            Method::Get => easy.get(true)?,
            Method::Head => easy.nobody(true)?,
            Method::Post => easy.post(true)?,
            other => easy.custom_request(other.as_str())?,
        }
        if let Some(body) = &request.body {
            if request.method != Method::Post {
                easy.post(true)?;
                easy.custom_request(request.method.as_str())?;
            }
            easy.post_fields_copy(body)?;
        }

        if let Some(auth) = &request.auth {
            easy.username(&auth.username)?;
            easy.password(&auth.password)?;
        }

        let mut list = List::new();
        list.append("Accept: application/json")?;
        if request.body.is_some() {
            list.append("Content-Type: application/json")?;
        }
        easy.http_headers(list)?;
        Ok(())
    }
}

impl Transport for CurlTransport {
    fn send(&self, request: &HttpRequest) -> Result<HttpResponse, ApiError> {
        let to_api_error = |source: curl::Error| ApiError::Transport {
            method: request.method,
            url: request.url.clone(),
            source,
        };

        let mut easy = Easy::new();
        self.configure(&mut easy, request).map_err(to_api_error)?;

        let mut body = Vec::new();
        {
            let mut transfer = easy.transfer();
            transfer
                .write_function(|data| {
                    body.extend_from_slice(data);
                    Ok(data.len())
                })
                .map_err(to_api_error)?;
            transfer.perform().map_err(to_api_error)?;
        }

        let status = easy.response_code().map_err(to_api_error)?;
        tracing::debug!(
            method = %request.method,
            url = %request.url,
            status,
            bytes = body.len(),
            "http response"
        );
        Ok(HttpResponse {
            method: request.method,
            url: request.url.clone(),
            status,
            body,
        })
    }
}
