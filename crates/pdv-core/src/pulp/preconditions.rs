//! Checks deciding whether the service can be verified at all.
//!
//! A failed precondition means the run is skipped, not failed.

use serde_json::Value;
use std::collections::BTreeSet;
use std::fmt;

use super::paths::STATUS_PATH;
use crate::api::{ApiError, Client, Method};
use crate::version::PulpVersion;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    /// The configured service version is too old.
    UnsupportedVersion { version: String, required: u64 },
    /// The status endpoint does not list these plugins.
    MissingPlugins(Vec<String>),
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::UnsupportedVersion { version, required } => write!(
                f,
                "requires Pulp {} or newer, configured version is {}",
                required, version
            ),
            SkipReason::MissingPlugins(plugins) => {
                write!(f, "requires plugins not installed: {}", plugins.join(", "))
            }
        }
    }
}

pub fn require_pulp_3(version: &PulpVersion) -> Option<SkipReason> {
    if version.major() < 3 {
        Some(SkipReason::UnsupportedVersion {
            version: version.to_string(),
            required: 3,
        })
    } else {
        None
    }
}

/// Component names reported by the status endpoint.
pub fn get_plugins(client: &Client) -> Result<BTreeSet<String>, ApiError> {
    let status = client
        .send(Method::Get, STATUS_PATH, None)?
        .error_for_status()?
        .json()?;
    let components = status
        .get("versions")
        .and_then(Value::as_array)
        .ok_or_else(|| ApiError::missing("status", "versions"))?;
    Ok(components
        .iter()
        .filter_map(|c| c.get("component").and_then(Value::as_str))
        .map(str::to_string)
        .collect())
}

pub fn require_pulp_plugins(
    client: &Client,
    required: &[&str],
) -> Result<Option<SkipReason>, ApiError> {
    let installed = get_plugins(client)?;
    let missing: Vec<String> = required
        .iter()
        .filter(|p| !installed.contains(**p))
        .map(|p| p.to_string())
        .collect();
    if missing.is_empty() {
        Ok(None)
    } else {
        Ok(Some(SkipReason::MissingPlugins(missing)))
    }
}
