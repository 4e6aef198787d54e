//! Pulp 3 resources: API paths, request bodies, and the multi-step calls
//! (sync, publish, content listing) built on top of the client.

mod gen;
mod ops;
pub mod paths;
mod preconditions;

pub use gen::{gen_distribution, gen_importer, gen_publisher, gen_repo, unique_name};
pub use ops::{get_content, get_content_unit_names, publish_repo, sync_repo};
pub use preconditions::{get_plugins, require_pulp_3, require_pulp_plugins, SkipReason};

use serde_json::Value;

use crate::api::ApiError;

/// The `_href` of a resource.
pub fn href(resource: &Value) -> Result<&str, ApiError> {
    str_field(resource, "_href")
}

/// A string field of a resource, or [`ApiError::MissingField`].
pub fn str_field<'v>(resource: &'v Value, field: &str) -> Result<&'v str, ApiError> {
    resource
        .get(field)
        .and_then(Value::as_str)
        .ok_or_else(|| ApiError::missing(&describe(resource), field))
}

fn describe(resource: &Value) -> String {
    match resource.get("name").and_then(Value::as_str) {
        Some(name) => format!("resource {:?}", name),
        None => "resource".to_string(),
    }
}
