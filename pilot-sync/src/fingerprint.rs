//! SHA-256 content fingerprints used as the provenance key in the state file.

use sha2::{Digest, Sha256};

/// Lowercase hex SHA-256 of the UTF-8 bytes of `content`.
///
/// No normalisation is applied: the fingerprint identifies exactly the bytes
/// that were sent to the remote.
pub fn fingerprint(content: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    hex::encode(hasher.finalize())
}
