//! End-to-end tests for the CA service: fingerprint-verified root retrieval
//! and token-authenticated CSR signing against a live listener.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use tokio::net::TcpListener;
use tokio::task::JoinHandle;

use pkg_api::server::router;
use pkg_api::AppState;
use pkg_constants::network::ROUTE_CA_SIGN;
use pkg_pki::paths::CertificatePaths;
use pkg_pki::remote::get_remote_ca;
use pkg_pki::{CaError, RootCa, SecurityConfig, csr, sign};
use pkg_types::ca::{NodeRole, SignCertificateRequest, SignCertificateResponse};

const JOIN_TOKEN: &str = "test-join-token";

async fn spawn_ca_server() -> (String, JoinHandle<()>, Arc<SecurityConfig>, tempfile::TempDir) {
    let dir = tempfile::tempdir().unwrap();
    let paths = CertificatePaths::new(dir.path());

    let root = Arc::new(
        RootCa::create(&paths.root_ca_cert, &paths.root_ca_key, "corral-test-CA").unwrap(),
    );
    let (cert_pem, key_pair) = sign::generate_and_sign_new_tls_cert(
        &root,
        &paths.node_cert,
        &paths.node_key,
        "manager",
        "manager",
    )
    .unwrap();
    let security = Arc::new(
        SecurityConfig::new(root, cert_pem.as_bytes(), key_pair.serialize_pem().as_bytes())
            .unwrap(),
    );

    let state = AppState {
        security: security.clone(),
        join_token: JOIN_TOKEN.to_string(),
    };
    let app = router(state);

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr: SocketAddr = listener.local_addr().unwrap();
    let handle = tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    (format!("http://{}", addr), handle, security, dir)
}

#[tokio::test]
async fn bootstrap_succeeds_with_matching_fingerprint() {
    let (url, handle, security, _dir) = spawn_ca_server().await;
    let fingerprint = security.root_ca().fingerprint();

    let remote = get_remote_ca(&url, &fingerprint).await.unwrap();
    assert_eq!(remote.cert_pem(), security.root_ca().cert_pem());
    assert!(!remote.can_sign(), "a bootstrapped root carries no key");

    // Comparison is case-insensitive.
    let remote = get_remote_ca(&url, &fingerprint.to_uppercase()).await.unwrap();
    assert_eq!(remote.fingerprint(), fingerprint);

    // Once the endpoint is gone, further calls fail instead of hanging or
    // returning stale data.
    handle.abort();
    tokio::time::sleep(Duration::from_millis(50)).await;
    let err = get_remote_ca(&url, &fingerprint).await.unwrap_err();
    assert!(matches!(err, CaError::Transport(_)));
}

#[tokio::test]
async fn bootstrap_rejects_wrong_digest() {
    let (url, handle, _security, _dir) = spawn_ca_server().await;

    // Well-formed but wrong digest: verification failure, not transport.
    let wrong = "2d2f968475269f0dde5299427cf74348ee1d6115b95c6e3f283e5a4de8da445b";
    let err = get_remote_ca(&url, wrong).await.unwrap_err();
    assert!(matches!(err, CaError::FingerprintMismatch { .. }));

    // Not a digest at all: rejected before anything is trusted.
    let err = get_remote_ca(&url, "deadbeef").await.unwrap_err();
    assert!(matches!(err, CaError::MalformedFingerprint));

    handle.abort();
}

#[tokio::test]
async fn sign_requires_join_token() {
    let (url, handle, _security, _dir) = spawn_ca_server().await;
    let (csr_pem, _key) = csr::generate_csr().unwrap();

    let client = reqwest::Client::new();
    let body = SignCertificateRequest {
        node_name: "worker-1".to_string(),
        role: NodeRole::Node,
        csr_pem,
    };

    let resp = client
        .post(format!("{}{}", url, ROUTE_CA_SIGN))
        .json(&body)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), reqwest::StatusCode::UNAUTHORIZED);

    let resp = client
        .post(format!("{}{}", url, ROUTE_CA_SIGN))
        .header("Authorization", "Bearer wrong-token")
        .json(&body)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), reqwest::StatusCode::UNAUTHORIZED);

    handle.abort();
}

#[tokio::test]
async fn sign_issues_certificate_with_authorized_identity() {
    let (url, handle, security, _dir) = spawn_ca_server().await;
    let (csr_pem, _key) = csr::generate_csr().unwrap();

    let client = reqwest::Client::new();
    let body = SignCertificateRequest {
        node_name: "worker-1".to_string(),
        role: NodeRole::Node,
        csr_pem,
    };

    let resp = client
        .post(format!("{}{}", url, ROUTE_CA_SIGN))
        .header("Authorization", format!("Bearer {}", JOIN_TOKEN))
        .json(&body)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), reqwest::StatusCode::OK);
    let signed: SignCertificateResponse = resp.json().await.unwrap();

    let (_, pem) = x509_parser::pem::parse_x509_pem(signed.certificate_pem.as_bytes()).unwrap();
    let cert = pem.parse_x509().unwrap();
    let subject = cert.subject();
    assert_eq!(
        subject.iter_common_name().next().unwrap().as_str().unwrap(),
        "worker-1"
    );
    assert_eq!(
        subject
            .iter_organizational_unit()
            .next()
            .unwrap()
            .as_str()
            .unwrap(),
        "node"
    );
    assert_eq!(subject.iter_attributes().count(), 2);

    // Chains to the root the same service hands out.
    let (_, root_pem) =
        x509_parser::pem::parse_x509_pem(security.root_ca().cert_pem().as_bytes()).unwrap();
    let root_cert = root_pem.parse_x509().unwrap();
    cert.verify_signature(Some(root_cert.public_key())).unwrap();

    handle.abort();
}

#[tokio::test]
async fn sign_discards_forged_subject_fields_over_the_wire() {
    let (url, handle, _security, _dir) = spawn_ca_server().await;

    let key = rcgen::KeyPair::generate().unwrap();
    let mut params = rcgen::CertificateParams::default();
    params
        .distinguished_name
        .push(rcgen::DnType::CommonName, "maliciousCN");
    params
        .distinguished_name
        .push(rcgen::DnType::OrganizationName, "maliciousOrg");
    params
        .distinguished_name
        .push(rcgen::DnType::OrganizationalUnitName, "maliciousOu");
    let forged_csr = params.serialize_request(&key).unwrap().pem().unwrap();

    let client = reqwest::Client::new();
    let body = SignCertificateRequest {
        node_name: "worker-2".to_string(),
        role: NodeRole::Node,
        csr_pem: forged_csr,
    };

    let resp = client
        .post(format!("{}{}", url, ROUTE_CA_SIGN))
        .header("Authorization", format!("Bearer {}", JOIN_TOKEN))
        .json(&body)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), reqwest::StatusCode::OK);
    let signed: SignCertificateResponse = resp.json().await.unwrap();

    let (_, pem) = x509_parser::pem::parse_x509_pem(signed.certificate_pem.as_bytes()).unwrap();
    let cert = pem.parse_x509().unwrap();
    let subject = cert.subject();
    assert_eq!(
        subject.iter_common_name().next().unwrap().as_str().unwrap(),
        "worker-2"
    );
    assert_eq!(subject.iter_organization().count(), 0);
    assert_eq!(subject.iter_attributes().count(), 2);

    handle.abort();
}

#[tokio::test]
async fn unparseable_csr_is_rejected_with_bad_request() {
    let (url, handle, _security, _dir) = spawn_ca_server().await;

    let client = reqwest::Client::new();
    let body = SignCertificateRequest {
        node_name: "worker-3".to_string(),
        role: NodeRole::Node,
        csr_pem: "not a csr".to_string(),
    };

    let resp = client
        .post(format!("{}{}", url, ROUTE_CA_SIGN))
        .header("Authorization", format!("Bearer {}", JOIN_TOKEN))
        .json(&body)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), reqwest::StatusCode::BAD_REQUEST);

    handle.abort();
}
