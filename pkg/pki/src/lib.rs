//! Cluster PKI for corral.
//!
//! Owns the root CA lifecycle, CSR issuance, policy-enforced signing, TLS
//! credential assembly, and the fingerprint-verified bootstrap a joining node
//! runs before any mutual-TLS relationship exists.

pub mod ca;
pub mod csr;
pub mod error;
pub mod fingerprint;
pub mod paths;
pub mod remote;
pub mod security;
pub mod sign;
pub mod store;

pub use ca::RootCa;
pub use error::CaError;
pub use security::SecurityConfig;
