//! Certificate fingerprints.
//!
//! A fingerprint is the hex-encoded SHA-256 digest of a certificate's raw PEM
//! bytes as stored and transmitted. It is a derived value, recomputed on
//! demand, and compared case-insensitively.

use std::fmt::Write;

use sha2::{Digest, Sha256};

/// Hex-encode the SHA-256 digest of `bytes`.
pub fn sha256_hex(bytes: &[u8]) -> String {
    let digest = Sha256::digest(bytes);
    let mut out = String::with_capacity(64);
    for byte in digest {
        let _ = write!(out, "{:02x}", byte);
    }
    out
}

/// A well-formed fingerprint is exactly 64 hex characters.
pub fn is_valid_hex_digest(s: &str) -> bool {
    s.len() == 64 && s.bytes().all(|b| b.is_ascii_hexdigit())
}
