//! Known-bug gate.
//!
//! Some expectations only hold on service versions where a tracked issue has
//! been fixed. Before asserting such an expectation the verifier asks a
//! [`BugGate`] whether the issue is testable for the configured version.

use crate::version::PulpVersion;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Numeric issue identifier in the service's issue tracker.
pub type BugId = u32;

/// Distributions serve content under their base URL at all.
pub const BUG_CONTENT_SERVING: BugId = 2895;
/// Requests through a scheme the distribution has disabled are rejected.
pub const BUG_DISABLED_SCHEME_REJECTED: BugId = 3413;
/// Distributions serve content over HTTPS.
pub const BUG_HTTPS_DISTRIBUTION: BugId = 3416;

/// Issue tracker status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BugStatus {
    New,
    Assigned,
    Post,
    Modified,
    OnQa,
    Verified,
    ClosedComplete,
    ClosedWontfix,
    ClosedDuplicate,
}

impl BugStatus {
    /// Name used in config files.
    pub fn as_str(self) -> &'static str {
        match self {
            BugStatus::New => "new",
            BugStatus::Assigned => "assigned",
            BugStatus::Post => "post",
            BugStatus::Modified => "modified",
            BugStatus::OnQa => "on_qa",
            BugStatus::Verified => "verified",
            BugStatus::ClosedComplete => "closed_complete",
            BugStatus::ClosedWontfix => "closed_wontfix",
            BugStatus::ClosedDuplicate => "closed_duplicate",
        }
    }

    /// True for statuses where the fix has landed.
    pub fn is_fixed(self) -> bool {
        matches!(
            self,
            BugStatus::Modified | BugStatus::OnQa | BugStatus::Verified | BugStatus::ClosedComplete
        )
    }
}

impl fmt::Display for BugStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What is known about one issue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BugInfo {
    pub status: BugStatus,
    /// First version carrying the fix; `None` means every version.
    pub fixed_in: Option<PulpVersion>,
}

impl BugInfo {
    pub fn is_testable_on(&self, version: &PulpVersion) -> bool {
        self.status.is_fixed() && self.fixed_in.as_ref().map_or(true, |min| version >= min)
    }
}

/// Decides whether the fixed behavior of an issue can be asserted.
pub trait BugGate {
    fn is_testable(&self, bug: BugId, version: &PulpVersion) -> bool;
}

impl<F> BugGate for F
where
    F: Fn(BugId, &PulpVersion) -> bool,
{
    fn is_testable(&self, bug: BugId, version: &PulpVersion) -> bool {
        self(bug, version)
    }
}

/// Bug gate backed by an in-memory table.
#[derive(Debug, Clone, Default)]
pub struct StaticBugRegistry {
    entries: HashMap<BugId, BugInfo>,
}

impl StaticBugRegistry {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Registry with the issues the download verification depends on.
    pub fn builtin() -> Self {
        let mut registry = Self::empty();
        registry.insert(
            BUG_CONTENT_SERVING,
            BugInfo {
                status: BugStatus::ClosedComplete,
                fixed_in: None,
            },
        );
        registry.insert(
            BUG_DISABLED_SCHEME_REJECTED,
            BugInfo {
                status: BugStatus::ClosedComplete,
                fixed_in: Some(PulpVersion::from_release(&[3])),
            },
        );
        registry.insert(
            BUG_HTTPS_DISTRIBUTION,
            BugInfo {
                status: BugStatus::New,
                fixed_in: None,
            },
        );
        registry
    }

    /// Add or replace an entry.
    pub fn insert(&mut self, bug: BugId, info: BugInfo) {
        self.entries.insert(bug, info);
    }

    pub fn get(&self, bug: BugId) -> Option<&BugInfo> {
        self.entries.get(&bug)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries sorted by id, for listing.
    pub fn iter_sorted(&self) -> Vec<(BugId, &BugInfo)> {
        let mut out: Vec<(BugId, &BugInfo)> = self.entries.iter().map(|(k, v)| (*k, v)).collect();
        out.sort_by_key(|(id, _)| *id);
        out
    }
}

impl BugGate for StaticBugRegistry {
    fn is_testable(&self, bug: BugId, version: &PulpVersion) -> bool {
        match self.entries.get(&bug) {
            Some(info) => info.is_testable_on(version),
            None => {
                tracing::warn!(bug, "no status known for bug; assuming testable");
                true
            }
        }
    }
}
