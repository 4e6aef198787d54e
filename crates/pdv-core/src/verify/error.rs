//! Correctness failures found by the verifier.

use thiserror::Error;

use super::Scheme;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum VerifyError {
    /// The synced repository version has no content units.
    #[error("repository {repo} has no content units after sync")]
    NoContentUnits { repo: String },

    /// Content served by the service differs from the origin copy.
    #[error("{scheme} download of {unit} differs from origin: expected sha256 {expected}, got {actual}")]
    DigestMismatch {
        scheme: Scheme,
        unit: String,
        expected: String,
        actual: String,
    },

    /// A scheme the distribution reports disabled still served content.
    #[error("{scheme} is disabled on the distribution but {url} was served")]
    DisabledSchemeServed { scheme: Scheme, url: String },

    /// The distribution does not say whether a scheme is enabled.
    #[error("distribution does not report whether {scheme} is enabled")]
    SchemeFlagMissing { scheme: Scheme },
}
