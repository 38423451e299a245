//! Fingerprint-verified acquisition of a remote cluster's root CA.
//!
//! A joining node has no TLS trust yet; the connection is deliberately made
//! without presenting or requiring certificates, and authenticity of the
//! received root is established at the application layer by comparing its
//! SHA-256 fingerprint against a value obtained out-of-band (alongside the
//! join token). A mismatch grants no partial trust: the bytes are dropped and
//! the caller must not fall back to an unverified certificate.

use std::time::Duration;

use tracing::{info, warn};

use pkg_constants::network::{BOOTSTRAP_TIMEOUT_SECS, ROUTE_CA_CERTIFICATE};

use crate::ca::RootCa;
use crate::error::CaError;
use crate::fingerprint::{is_valid_hex_digest, sha256_hex};

/// Fetch the root certificate from `server_url` and verify it against
/// `expected_fingerprint` (hex SHA-256, compared case-insensitively).
///
/// Error classes are distinguishable by the caller: a malformed or
/// mismatching fingerprint is a trust-verification failure, while an
/// unreachable server or bad HTTP response is a transport failure. Only
/// transport failures are reasonable to retry, possibly against another
/// address.
pub async fn get_remote_ca(
    server_url: &str,
    expected_fingerprint: &str,
) -> Result<RootCa, CaError> {
    if !is_valid_hex_digest(expected_fingerprint) {
        return Err(CaError::MalformedFingerprint);
    }

    // No client certificate, no server verification: trust comes from the
    // fingerprint check below, not from the transport.
    let client = reqwest::Client::builder()
        .danger_accept_invalid_certs(true)
        .timeout(Duration::from_secs(BOOTSTRAP_TIMEOUT_SECS))
        .build()?;

    let url = format!("{}{}", server_url.trim_end_matches('/'), ROUTE_CA_CERTIFICATE);
    info!("Fetching cluster root CA from {}", url);

    let response = client.get(&url).send().await?.error_for_status()?;
    let body = response.bytes().await?;

    let actual = sha256_hex(&body);
    if !actual.eq_ignore_ascii_case(expected_fingerprint) {
        warn!(
            "Root CA fingerprint mismatch from {} (expected {}, got {})",
            server_url, expected_fingerprint, actual
        );
        return Err(CaError::FingerprintMismatch {
            expected: expected_fingerprint.to_lowercase(),
            actual,
        });
    }

    let root_ca = RootCa::from_pem(&body)?;
    info!("Cluster root CA verified (fingerprint {})", actual);
    Ok(root_ca)
}
