//! `pdv bug-status` – show whether a bug's fix can be asserted.

use anyhow::{Context, Result};
use pdv_core::bugs::{BugGate, BugId, BugInfo};
use pdv_core::config;
use pdv_core::version::PulpVersion;

/// One bug, or every tracked bug when `id` is `None`.
pub fn run_bug_status(id: Option<BugId>, version: Option<&str>) -> Result<()> {
    let cfg = config::load_or_init()?;
    let version: PulpVersion = match version {
        Some(v) => v.parse().with_context(|| format!("invalid version {:?}", v))?,
        None => cfg.pulp_version()?,
    };
    let registry = cfg.bug_registry()?;

    println!(
        "{:<6} {:<16} {:<9} {}",
        "BUG", "STATUS", "FIXED IN", "TESTABLE ON"
    );
    match id {
        Some(id) => print_row(id, registry.get(id), registry.is_testable(id, &version), &version),
        None => {
            for (id, info) in registry.iter_sorted() {
                print_row(id, Some(info), info.is_testable_on(&version), &version);
            }
        }
    }
    Ok(())
}

fn print_row(id: BugId, info: Option<&BugInfo>, testable: bool, version: &PulpVersion) {
    // Status names match the `[[bugs]]` config entries.
    let (status, fixed_in) = match info {
        Some(info) => (
            info.status.to_string(),
            info.fixed_in
                .as_ref()
                .map(|v| v.to_string())
                .unwrap_or_else(|| "-".to_string()),
        ),
        None => ("untracked".to_string(), "-".to_string()),
    };
    println!(
        "{:<6} {:<16} {:<9} {} ({})",
        id,
        status,
        fixed_in,
        version,
        if testable { "yes" } else { "no" }
    );
}
