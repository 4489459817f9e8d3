//! Hashing System - SHA-256 Fingerprints
//!
//! Identical inputs render identical filters; the fingerprint makes that
//! checkable without diffing files.

use sha2::{Digest, Sha256};

/// Compute SHA-256 hash of bytes, return hex string
pub fn sha256_hex(data: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data);
    let result = hasher.finalize();
    hex::encode(result)
}

/// Fingerprint of a rendered rule body
pub fn fingerprint(body: &str) -> String {
    sha256_hex(body.as_bytes())
}

mod hex {
    pub fn encode(bytes: impl AsRef<[u8]>) -> String {
        bytes.as_ref().iter().map(|b| format!("{:02x}", b)).collect()
    }
}
