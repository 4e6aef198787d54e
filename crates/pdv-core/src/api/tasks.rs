//! Waiting on asynchronous tasks.
//!
//! Calls that start background work answer `202 Accepted` with a call report:
//! one task reference (`{"_href": ..., "task_id": ...}`) or a list of them.
//! Each task is polled until it reaches a final state.

use serde_json::Value;

use super::{ApiError, Client, Method};

/// Poll every task referenced by `call_report` and return their final reports.
pub fn poll_spawned_tasks(client: &Client, call_report: &Value) -> Result<Vec<Value>, ApiError> {
    let refs: Vec<&Value> = match call_report {
        Value::Array(items) => items.iter().collect(),
        other => vec![other],
    };
    refs.into_iter()
        .map(|task_ref| {
            let href = task_ref
                .get("_href")
                .and_then(Value::as_str)
                .ok_or_else(|| ApiError::missing("call report", "_href"))?;
            poll_task(client, href)
        })
        .collect()
}

/// Poll one task until it is final.
///
/// `completed` and `skipped` are success; `failed` and `canceled` are
/// [`ApiError::Task`]. Gives up with [`ApiError::TaskTimeout`] after
/// `max_polls` polls.
pub fn poll_task(client: &Client, href: &str) -> Result<Value, ApiError> {
    let cfg = client.task_poll();
    let max_polls = cfg.max_polls.max(1);
    for poll in 1..=max_polls {
        let task = client.send(Method::Get, href, None)?.error_for_status()?.json()?;
        let state = task.get("state").and_then(Value::as_str).unwrap_or_default();
        match state {
            "completed" | "skipped" => {
                tracing::debug!(href, state, poll, "task finished");
                return Ok(task);
            }
            "failed" | "canceled" => {
                return Err(ApiError::Task {
                    href: href.to_string(),
                    state: state.to_string(),
                    error: task.get("error").cloned().unwrap_or(Value::Null),
                });
            }
            _ => {
                tracing::trace!(href, state, poll, "task still running");
                if poll < max_polls {
                    std::thread::sleep(cfg.poll_interval());
                }
            }
        }
    }
    Err(ApiError::TaskTimeout {
        href: href.to_string(),
        polls: max_polls,
    })
}
