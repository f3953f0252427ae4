//! SHA-256 digest utilities
//!
//! Digests are rendered the way `sha256sum` prints them: 64 lowercase hex
//! characters with no prefix, so a locally computed digest compares directly
//! against the one reported by the remote host.

use sha2::{Digest, Sha256};

/// Length of a rendered SHA-256 digest
pub const CHECKSUM_LEN: usize = 64;

/// Compute the SHA-256 digest of `content`.
pub fn compute_checksum(content: &[u8]) -> String {
    compute_concat_checksum(content, &[])
}

/// Compute the SHA-256 digest of `prefix` followed by `suffix` without
/// concatenating them first.
pub fn compute_concat_checksum(prefix: &[u8], suffix: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(prefix);
    hasher.update(suffix);
    format!("{:x}", hasher.finalize())
}

/// Check whether `s` looks like a rendered digest.
pub fn is_checksum(s: &str) -> bool {
    s.len() == CHECKSUM_LEN && s.bytes().all(|b| matches!(b, b'0'..=b'9' | b'a'..=b'f'))
}
