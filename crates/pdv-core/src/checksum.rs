//! SHA-256 digests of downloaded content.
//!
//! Both sides of a comparison (fixture origin and the service under test)
//! are hashed the same way so the hex strings can be compared directly.

use sha2::{Digest, Sha256};

/// Compute SHA-256 of `data` and return the digest as lowercase hex.
pub fn sha256_bytes(data: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hex::encode(hasher.finalize())
}
