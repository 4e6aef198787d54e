//! Service version identifiers.
//!
//! Versions look like `3`, `3.0.1` or `1!0` (epoch `1`, release `0`). Only the
//! numeric release is compared; trailing zero components are not significant,
//! so `3` and `3.0.0` are equal.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Error returned when a version string cannot be parsed.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum VersionError {
    #[error("empty version string")]
    Empty,
    #[error("invalid version {input:?}: component {component:?} is not a number")]
    InvalidComponent { input: String, component: String },
}

/// Version of the service under test (e.g. `3.0`).
#[derive(Debug, Clone)]
pub struct PulpVersion {
    epoch: u64,
    release: Vec<u64>,
}

impl PulpVersion {
    /// Build a version from its release components with epoch 0.
    pub fn from_release(release: &[u64]) -> Self {
        let release = if release.is_empty() {
            vec![0]
        } else {
            release.to_vec()
        };
        Self { epoch: 0, release }
    }

    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    /// First release component (`3` for `3.0.1`).
    pub fn major(&self) -> u64 {
        self.release.first().copied().unwrap_or(0)
    }

    pub fn release(&self) -> &[u64] {
        &self.release
    }
}

fn parse_number(input: &str, component: &str) -> Result<u64, VersionError> {
    component
        .trim()
        .parse::<u64>()
        .map_err(|_| VersionError::InvalidComponent {
            input: input.to_string(),
            component: component.to_string(),
        })
}

impl FromStr for PulpVersion {
    type Err = VersionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let input = s.trim();
        if input.is_empty() {
            return Err(VersionError::Empty);
        }
        let (epoch, rest) = match input.split_once('!') {
            Some((epoch, rest)) => (parse_number(input, epoch)?, rest),
            None => (0, input),
        };
        let release = rest
            .split('.')
            .map(|c| parse_number(input, c))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { epoch, release })
    }
}

impl Ord for PulpVersion {
    fn cmp(&self, other: &Self) -> Ordering {
        self.epoch.cmp(&other.epoch).then_with(|| {
            let len = self.release.len().max(other.release.len());
            (0..len)
                .map(|i| {
                    let a = self.release.get(i).copied().unwrap_or(0);
                    let b = other.release.get(i).copied().unwrap_or(0);
                    a.cmp(&b)
                })
                .find(|o| *o != Ordering::Equal)
                .unwrap_or(Ordering::Equal)
        })
    }
}

impl PartialOrd for PulpVersion {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for PulpVersion {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for PulpVersion {}

impl fmt::Display for PulpVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.epoch > 0 {
            write!(f, "{}!", self.epoch)?;
        }
        let parts: Vec<String> = self.release.iter().map(|n| n.to_string()).collect();
        write!(f, "{}", parts.join("."))
    }
}
