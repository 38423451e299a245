//! TLS credential assembly.
//!
//! Bundles the trusted root CA with server- and client-side rustls configs
//! derived from a node's issued certificate. The configs are built once and
//! shared immutably; rotation would construct a new `SecurityConfig` and swap
//! the `Arc`, never mutate in place.

use std::sync::Arc;

use rustls::pki_types::{CertificateDer, PrivateKeyDer};
use rustls::server::WebPkiClientVerifier;
use rustls::{ClientConfig, RootCertStore, ServerConfig};

use crate::ca::RootCa;
use crate::error::CaError;

/// Shared TLS material for a node: the root of trust plus mutual-TLS
/// credentials derived from the node's own issued certificate.
#[derive(Debug)]
pub struct SecurityConfig {
    root_ca: Arc<RootCa>,
    server_tls: Arc<ServerConfig>,
    client_tls: Arc<ClientConfig>,
}

impl SecurityConfig {
    /// Build server and client TLS configs from an issued certificate and its
    /// private key. Fails unless the certificate chains to `root_ca`: serving
    /// credentials that don't verify against the root being served would
    /// break mutual TLS cluster-wide.
    pub fn new(root_ca: Arc<RootCa>, cert_pem: &[u8], key_pem: &[u8]) -> Result<Self, CaError> {
        verify_issued_by(cert_pem, root_ca.cert_pem().as_bytes())?;

        let cert_chain = parse_cert_chain(cert_pem)?;
        let server_key = parse_private_key(key_pem)?;
        let client_key = parse_private_key(key_pem)?;

        let mut roots = RootCertStore::empty();
        for cert in parse_cert_chain(root_ca.cert_pem().as_bytes())? {
            roots.add(cert).map_err(|e| CaError::Tls(e.to_string()))?;
        }
        let roots = Arc::new(roots);

        let client_verifier = WebPkiClientVerifier::builder(roots.clone())
            .build()
            .map_err(|e| CaError::Tls(e.to_string()))?;
        let server_tls = ServerConfig::builder()
            .with_client_cert_verifier(client_verifier)
            .with_single_cert(cert_chain.clone(), server_key)
            .map_err(|e| CaError::Tls(e.to_string()))?;

        let client_tls = ClientConfig::builder()
            .with_root_certificates(roots.clone())
            .with_client_auth_cert(cert_chain, client_key)
            .map_err(|e| CaError::Tls(e.to_string()))?;

        Ok(Self {
            root_ca,
            server_tls: Arc::new(server_tls),
            client_tls: Arc::new(client_tls),
        })
    }

    pub fn root_ca(&self) -> &RootCa {
        &self.root_ca
    }

    /// Server credentials requiring client certificates chained to the root.
    pub fn server_config(&self) -> Arc<ServerConfig> {
        self.server_tls.clone()
    }

    /// Client credentials presenting this node's certificate.
    pub fn client_config(&self) -> Arc<ClientConfig> {
        self.client_tls.clone()
    }
}

/// Check that `cert_pem` was signed by the certificate in `root_pem`.
fn verify_issued_by(cert_pem: &[u8], root_pem: &[u8]) -> Result<(), CaError> {
    let (_, leaf_pem) = x509_parser::pem::parse_x509_pem(cert_pem)
        .map_err(|e| CaError::InvalidCertificate(e.to_string()))?;
    let leaf = leaf_pem
        .parse_x509()
        .map_err(|e| CaError::InvalidCertificate(e.to_string()))?;
    let (_, ca_pem) = x509_parser::pem::parse_x509_pem(root_pem)
        .map_err(|e| CaError::InvalidCertificate(e.to_string()))?;
    let ca = ca_pem
        .parse_x509()
        .map_err(|e| CaError::InvalidCertificate(e.to_string()))?;

    leaf.verify_signature(Some(ca.public_key())).map_err(|_| {
        CaError::InvalidCertificate("certificate does not chain to the trusted root CA".to_string())
    })
}

fn parse_cert_chain(pem: &[u8]) -> Result<Vec<CertificateDer<'static>>, CaError> {
    let certs: Vec<CertificateDer<'static>> = rustls_pemfile::certs(&mut &pem[..])
        .collect::<Result<_, _>>()
        .map_err(|e| CaError::InvalidCertificate(e.to_string()))?;
    if certs.is_empty() {
        return Err(CaError::InvalidCertificate(
            "no certificate found in PEM input".to_string(),
        ));
    }
    Ok(certs)
}

fn parse_private_key(pem: &[u8]) -> Result<PrivateKeyDer<'static>, CaError> {
    rustls_pemfile::private_key(&mut &pem[..])
        .map_err(|e| CaError::InvalidCertificate(e.to_string()))?
        .ok_or_else(|| CaError::InvalidCertificate("no private key found in PEM input".to_string()))
}
