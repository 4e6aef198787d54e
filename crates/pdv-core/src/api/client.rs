use anyhow::{Context, Result};
use serde_json::Value;
use std::cell::Cell;
use url::Url;

use super::{
    ApiError, Credentials, CurlTransport, Handled, HttpRequest, HttpResponse, Method,
    ResponseHandler, Transport,
};
use crate::config::{PdvConfig, TaskPollConfig};
use crate::version::PulpVersion;

/// REST client bound to one service.
///
/// Relative paths are resolved against the configured base URL; absolute URLs
/// (task hrefs returned as full URLs, pagination links, content URLs) are
/// used unchanged. Every request carries the configured credentials.
pub struct Client {
    base_url: Url,
    auth: Option<Credentials>,
    version: PulpVersion,
    task_poll: TaskPollConfig,
    handler: Cell<ResponseHandler>,
    transport: Box<dyn Transport>,
}

impl Client {
    /// Client using libcurl, honoring `pulp.verify_tls`.
    pub fn new(cfg: &PdvConfig, handler: ResponseHandler) -> Result<Self> {
        let transport = CurlTransport::new(cfg.pulp.verify_tls);
        Self::with_transport(cfg, handler, Box::new(transport))
    }

    pub fn with_transport(
        cfg: &PdvConfig,
        handler: ResponseHandler,
        transport: Box<dyn Transport>,
    ) -> Result<Self> {
        let base_url = Url::parse(&cfg.pulp.base_url)
            .with_context(|| format!("invalid pulp.base_url {:?}", cfg.pulp.base_url))?;
        Ok(Self {
            base_url,
            auth: Some(Credentials {
                username: cfg.pulp.username.clone(),
                password: cfg.pulp.password.clone(),
            }),
            version: cfg.pulp_version()?,
            task_poll: cfg.task_poll(),
            handler: Cell::new(handler),
            transport,
        })
    }

    pub fn response_handler(&self) -> ResponseHandler {
        self.handler.get()
    }

    /// Change how later responses are handled.
    pub fn set_response_handler(&self, handler: ResponseHandler) {
        self.handler.set(handler);
    }

    pub fn version(&self) -> &PulpVersion {
        &self.version
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub fn task_poll(&self) -> &TaskPollConfig {
        &self.task_poll
    }

    /// Resolve `url` against the base URL.
    pub fn resolve(&self, url: &str) -> Result<String, ApiError> {
        self.base_url
            .join(url)
            .map(String::from)
            .map_err(|source| ApiError::Url {
                url: url.to_string(),
                source,
            })
    }

    /// Send a request and return the raw response, bypassing the handler.
    pub fn send(
        &self,
        method: Method,
        url: &str,
        body: Option<&Value>,
    ) -> Result<HttpResponse, ApiError> {
        let body = body
            .map(serde_json::to_vec)
            .transpose()
            .map_err(ApiError::Encode)?;
        let request = HttpRequest {
            method,
            url: self.resolve(url)?,
            body,
            auth: self.auth.clone(),
        };
        tracing::debug!(method = %method, url = %request.url, "http request");
        self.transport.send(&request)
    }

    /// Send a request and pass the response through `handler`.
    pub fn request_with(
        &self,
        handler: ResponseHandler,
        method: Method,
        url: &str,
        body: Option<&Value>,
    ) -> Result<Handled, ApiError> {
        let response = self.send(method, url, body)?;
        handler.handle(self, response)
    }

    /// Send a request and pass the response through the current handler.
    pub fn request(
        &self,
        method: Method,
        url: &str,
        body: Option<&Value>,
    ) -> Result<Handled, ApiError> {
        self.request_with(self.handler.get(), method, url, body)
    }

    pub fn get(&self, url: &str) -> Result<Handled, ApiError> {
        self.request(Method::Get, url, None)
    }

    pub fn head(&self, url: &str) -> Result<Handled, ApiError> {
        self.request(Method::Head, url, None)
    }

    pub fn options(&self, url: &str) -> Result<Handled, ApiError> {
        self.request(Method::Options, url, None)
    }

    pub fn delete(&self, url: &str) -> Result<Handled, ApiError> {
        self.request(Method::Delete, url, None)
    }

    pub fn post(&self, url: &str, json: &Value) -> Result<Handled, ApiError> {
        self.request(Method::Post, url, Some(json))
    }

    pub fn put(&self, url: &str, json: &Value) -> Result<Handled, ApiError> {
        self.request(Method::Put, url, Some(json))
    }

    pub fn patch(&self, url: &str, json: &Value) -> Result<Handled, ApiError> {
        self.request(Method::Patch, url, Some(json))
    }
}
