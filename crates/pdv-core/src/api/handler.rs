//! Response handlers.

use serde_json::Value;

use super::{page, tasks, ApiError, Client, HttpResponse};

/// What the client does with a response before returning it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ResponseHandler {
    /// Return the response unchanged. No status check, no task polling.
    Echo,
    /// Fail on non-2xx. No task polling.
    Code,
    /// Fail on non-2xx; on 202, wait for the spawned tasks.
    Safe,
    /// Like `Safe`, then decode the body. A 204 yields `null`.
    #[default]
    Json,
    /// Like `Json`; paginated bodies are walked and their `results` joined.
    Page,
}

/// Output of a handler: the raw response or a decoded body.
#[derive(Debug, Clone, PartialEq)]
pub enum Handled {
    Response(HttpResponse),
    Json(Value),
}

impl Handled {
    /// Decoded JSON, decoding the raw body if needed.
    pub fn into_json(self) -> Result<Value, ApiError> {
        match self {
            Handled::Json(value) => Ok(value),
            Handled::Response(response) => response.json(),
        }
    }

    pub fn into_response(self) -> Option<HttpResponse> {
        match self {
            Handled::Response(response) => Some(response),
            Handled::Json(_) => None,
        }
    }

    /// Raw body bytes, when the handler kept the response.
    pub fn body(&self) -> Option<&[u8]> {
        match self {
            Handled::Response(response) => Some(&response.body),
            Handled::Json(_) => None,
        }
    }
}

fn handle_202(client: &Client, response: &HttpResponse) -> Result<(), ApiError> {
    if response.status == 202 {
        let call_report = response.json()?;
        tasks::poll_spawned_tasks(client, &call_report)?;
    }
    Ok(())
}

fn json_body(client: &Client, response: HttpResponse) -> Result<Value, ApiError> {
    let response = response.error_for_status()?;
    handle_202(client, &response)?;
    if response.status == 204 {
        return Ok(Value::Null);
    }
    response.json()
}

impl ResponseHandler {
    pub(crate) fn handle(self, client: &Client, response: HttpResponse) -> Result<Handled, ApiError> {
        match self {
            ResponseHandler::Echo => Ok(Handled::Response(response)),
            ResponseHandler::Code => Ok(Handled::Response(response.error_for_status()?)),
            ResponseHandler::Safe => {
                let response = response.error_for_status()?;
                handle_202(client, &response)?;
                Ok(Handled::Response(response))
            }
            ResponseHandler::Json => Ok(Handled::Json(json_body(client, response)?)),
            ResponseHandler::Page => {
                if client.version().major() < 3 {
                    return Err(ApiError::Unsupported(format!(
                        "paginated responses need Pulp 3 or newer, configured version is {}",
                        client.version()
                    )));
                }
                let body = json_body(client, response)?;
                if body.get("results").is_some() {
                    Ok(Handled::Json(Value::Array(page::walk_pages(client, body)?)))
                } else {
                    Ok(Handled::Json(body))
                }
            }
        }
    }
}
