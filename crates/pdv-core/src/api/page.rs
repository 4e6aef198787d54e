//! Pagination: follow `next` links and concatenate `results`.

use serde_json::Value;

use super::{ApiError, Client, Method};

pub(crate) fn walk_pages(client: &Client, first: Value) -> Result<Vec<Value>, ApiError> {
    let mut results = Vec::new();
    let mut page = first;
    loop {
        if let Some(Value::Array(items)) = page.get_mut("results").map(Value::take) {
            results.extend(items);
        }
        let next = match page.get("next").and_then(Value::as_str) {
            Some(next) => next.to_string(),
            None => break,
        };
        tracing::trace!(next = %next, "fetching next page");
        page = client
            .send(Method::Get, &next, None)?
            .error_for_status()?
            .json()?;
    }
    Ok(results)
}
