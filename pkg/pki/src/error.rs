use std::path::PathBuf;

use thiserror::Error;

/// Errors produced by the PKI layer.
///
/// Trust-verification failures (`MalformedFingerprint`, `FingerprintMismatch`)
/// are deliberately separate variants from `Transport`: a caller may retry a
/// transport failure against another address, but must never treat a
/// verification failure as retryable with relaxed checks.
#[derive(Debug, Error)]
pub enum CaError {
    #[error("key or certificate generation failed: {0}")]
    Generation(#[source] rcgen::Error),

    #[error("certificate signing failed: {0}")]
    Signing(#[source] rcgen::Error),

    #[error("{}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid certificate signing request: {0}")]
    InvalidCsr(#[source] rcgen::Error),

    #[error("invalid certificate: {0}")]
    InvalidCertificate(String),

    #[error("invalid private key: {0}")]
    InvalidKey(#[source] rcgen::Error),

    #[error("expected fingerprint is not a hex-encoded SHA-256 digest")]
    MalformedFingerprint,

    #[error("root certificate fingerprint mismatch (expected {expected}, got {actual})")]
    FingerprintMismatch { expected: String, actual: String },

    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("root CA holds no signing key")]
    NoSigner,

    #[error("TLS configuration error: {0}")]
    Tls(String),
}

pub(crate) fn io_error(path: &std::path::Path, source: std::io::Error) -> CaError {
    CaError::Io {
        path: path.to_path_buf(),
        source,
    }
}
