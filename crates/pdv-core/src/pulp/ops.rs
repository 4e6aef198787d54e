//! Multi-request operations: sync, publish, list content.

use serde_json::{json, Value};

use super::{href, str_field};
use crate::api::{tasks, ApiError, Client, Method, ResponseHandler};

/// `<href>/<action>/`, tolerating hrefs without a trailing slash.
fn action_url(href: &str, action: &str) -> String {
    if href.ends_with('/') {
        format!("{}{}/", href, action)
    } else {
        format!("{}/{}/", href, action)
    }
}

/// Start `action` on `resource` for `repo` and wait for the spawned tasks.
fn run_action(
    client: &Client,
    resource: &Value,
    action: &str,
    repo: &Value,
) -> Result<Vec<Value>, ApiError> {
    let url = action_url(href(resource)?, action);
    let body = json!({ "repository": href(repo)? });
    let call_report = client
        .send(Method::Post, &url, Some(&body))?
        .error_for_status()?
        .json()?;
    tasks::poll_spawned_tasks(client, &call_report)
}

/// Sync `repo` through `importer`. Returns once every spawned task finished.
pub fn sync_repo(client: &Client, importer: &Value, repo: &Value) -> Result<Vec<Value>, ApiError> {
    tracing::info!(importer = href(importer)?, repo = href(repo)?, "syncing repository");
    run_action(client, importer, "sync", repo)
}

/// Publish the latest version of `repo` with `publisher` and return the new
/// publication.
pub fn publish_repo(client: &Client, publisher: &Value, repo: &Value) -> Result<Value, ApiError> {
    tracing::info!(publisher = href(publisher)?, repo = href(repo)?, "publishing repository");
    let reports = run_action(client, publisher, "publish", repo)?;
    let publication_href = reports
        .last()
        .and_then(|task| task.get("created_resources"))
        .and_then(|created| created.get(0))
        .and_then(Value::as_str)
        .ok_or_else(|| ApiError::missing("publish task", "created_resources"))?;
    client
        .send(Method::Get, publication_href, None)?
        .error_for_status()?
        .json()
}

/// Content units of the latest version of `repo`. A repository without any
/// version has no content.
pub fn get_content(client: &Client, repo: &Value) -> Result<Vec<Value>, ApiError> {
    let repo = client
        .send(Method::Get, href(repo)?, None)?
        .error_for_status()?
        .json()?;
    let version_href = match repo.get("_latest_version_href").and_then(Value::as_str) {
        Some(version_href) => version_href,
        None => return Ok(Vec::new()),
    };
    let content = client
        .request_with(
            ResponseHandler::Page,
            Method::Get,
            &action_url(version_href, "content"),
            None,
        )?
        .into_json()?;
    match content {
        Value::Array(units) => Ok(units),
        Value::Null => Ok(Vec::new()),
        other => Ok(vec![other]),
    }
}

/// `relative_path` of every content unit in the latest version of `repo`.
pub fn get_content_unit_names(client: &Client, repo: &Value) -> Result<Vec<String>, ApiError> {
    get_content(client, repo)?
        .iter()
        .map(|unit| str_field(unit, "relative_path").map(str::to_string))
        .collect()
}
