use std::fmt;

use crate::bugs::BugId;
use crate::pulp::SkipReason;

/// Transport scheme a distribution can serve content over.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Scheme {
    Http,
    Https,
}

impl Scheme {
    /// Scheme name; also the distribution field holding its enabled flag.
    pub fn as_str(self) -> &'static str {
        match self {
            Scheme::Http => "http",
            Scheme::Https => "https",
        }
    }
}

impl fmt::Display for Scheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of checking one scheme.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SchemeOutcome {
    /// Enabled; the served content matched the origin digest.
    Matched { url: String, digest: String },
    /// Disabled; the request failed with this HTTP status, as expected.
    Rejected { url: String, status: u32 },
    /// Disabled; not checked because `bug` is not fixed in this version.
    Unchecked { url: String, bug: BugId },
}

impl fmt::Display for SchemeOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SchemeOutcome::Matched { url, digest } => write!(f, "ok       {} sha256={}", url, digest),
            SchemeOutcome::Rejected { url, status } => {
                write!(f, "rejected {} (HTTP {}, scheme disabled)", url, status)
            }
            SchemeOutcome::Unchecked { url, bug } => {
                write!(f, "skipped  {} (scheme disabled, bug {} open)", url, bug)
            }
        }
    }
}

/// Everything learned from a completed run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerificationReport {
    /// Content unit picked for the comparison.
    pub unit_name: String,
    pub origin_url: String,
    pub origin_digest: String,
    /// Outcome per scheme, in the order they were checked.
    pub schemes: Vec<(Scheme, SchemeOutcome)>,
}

impl VerificationReport {
    pub fn outcome(&self, scheme: Scheme) -> Option<&SchemeOutcome> {
        self.schemes
            .iter()
            .find(|(s, _)| *s == scheme)
            .map(|(_, outcome)| outcome)
    }
}

impl fmt::Display for VerificationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "unit   {}", self.unit_name)?;
        writeln!(f, "origin {} sha256={}", self.origin_url, self.origin_digest)?;
        for (scheme, outcome) in &self.schemes {
            writeln!(f, "{:<6} {}", scheme.as_str(), outcome)?;
        }
        Ok(())
    }
}

/// How a run ended, short of a failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    Passed(VerificationReport),
    Skipped(SkipReason),
}
