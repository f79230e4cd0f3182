//! Deterministic entity keys.
//!
//! A key is the SHA-256 digest of the UTF-8 input, encoded with the
//! URL-safe base64 alphabet and no padding. Keys are stable across
//! processes and machines, which is what lets re-ingestion dedup.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use sha2::{Digest, Sha256};

/// Length of every generated key.
pub const KEY_LEN: usize = 43;

/// Derive the key for `input`. `None` hashes the same as the empty string.
#[must_use]
pub fn key(input: Option<&str>) -> String {
    let digest = Sha256::digest(input.unwrap_or_default().as_bytes());
    URL_SAFE_NO_PAD.encode(digest)
}

/// Derive the key for the plain concatenation of `parts`.
#[must_use]
pub fn key_of(parts: &[&str]) -> String {
    let mut hasher = Sha256::new();
    for part in parts {
        hasher.update(part.as_bytes());
    }
    URL_SAFE_NO_PAD.encode(hasher.finalize())
}
