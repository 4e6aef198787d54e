//! Deferred release of remote resources.
//!
//! Every resource is registered here as soon as it exists. The registered
//! actions run when the stack is dropped, so they also run when the body
//! returns early with an error or panics.

use anyhow::Result;

use crate::api::{Client, Method, ResponseHandler};

type Action<'a> = Box<dyn FnOnce() -> Result<()> + 'a>;

/// Release actions executed in reverse registration order on drop.
#[derive(Default)]
pub struct CleanupStack<'a> {
    actions: Vec<(String, Action<'a>)>,
}

impl<'a> CleanupStack<'a> {
    pub fn new() -> Self {
        Self {
            actions: Vec::new(),
        }
    }

    /// Register an arbitrary release action.
    pub fn register<F>(&mut self, label: impl Into<String>, action: F)
    where
        F: FnOnce() -> Result<()> + 'a,
    {
        self.actions.push((label.into(), Box::new(action)));
    }

    /// Register deletion of the resource at `href`.
    ///
    /// Deletion waits for any task it spawns and fails on non-2xx, regardless
    /// of the client's handler at the time it runs.
    pub fn register_delete(&mut self, client: &'a Client, href: &str) {
        let href = href.to_string();
        self.register(format!("DELETE {}", href), move || {
            client.request_with(ResponseHandler::Safe, Method::Delete, &href, None)?;
            Ok(())
        });
    }

    pub fn len(&self) -> usize {
        self.actions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    /// Run every pending action, newest first. Failures are logged and do not
    /// stop the remaining actions. Returns the number of failures.
    pub fn run_all(&mut self) -> usize {
        let mut failures = 0;
        while let Some((label, action)) = self.actions.pop() {
            match action() {
                Ok(()) => tracing::debug!(action = %label, "cleanup done"),
                Err(e) => {
                    failures += 1;
                    tracing::warn!(action = %label, "cleanup failed: {:#}", e);
                }
            }
        }
        failures
    }
}

impl Drop for CleanupStack<'_> {
    fn drop(&mut self) {
        self.run_all();
    }
}
