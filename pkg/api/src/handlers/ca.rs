use axum::{Json, extract::State, http::StatusCode, http::header, response::IntoResponse};
use pkg_pki::{CaError, sign};
use pkg_types::ca::{SignCertificateRequest, SignCertificateResponse};
use tracing::{info, warn};

use crate::AppState;

/// GET /v1/ca/certificate — serve the cluster root certificate.
///
/// Deliberately reachable without any client credentials: callers fetching
/// the root have no certificate yet and verify the response against an
/// out-of-band fingerprint instead. The body is the raw stored PEM, byte for
/// byte, since that is what the fingerprint is computed over. Read-only and
/// side-effect-free, so concurrent joiners need no coordination.
pub async fn get_root_certificate(State(state): State<AppState>) -> impl IntoResponse {
    info!("Serving root CA certificate");

    let pem = state.security.root_ca().cert_pem().to_owned();
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "application/x-pem-file")],
        pem,
    )
}

/// POST /v1/ca/sign — validate a CSR and issue a certificate.
///
/// The issued identity comes from `node_name` and `role` (authorized by the
/// join token checked in middleware); subject fields embedded in the CSR are
/// discarded wholesale.
pub async fn sign_certificate(
    State(state): State<AppState>,
    Json(payload): Json<SignCertificateRequest>,
) -> impl IntoResponse {
    info!(
        "Signing certificate for node: {} (role={})",
        payload.node_name, payload.role
    );

    match sign::parse_validate_and_sign_csr(
        state.security.root_ca(),
        &payload.csr_pem,
        &payload.node_name,
        payload.role.organizational_unit(),
    ) {
        Ok(certificate_pem) => {
            (StatusCode::OK, Json(SignCertificateResponse { certificate_pem })).into_response()
        }
        Err(e @ CaError::InvalidCsr(_)) => {
            warn!("Rejected unparseable CSR from {}: {}", payload.node_name, e);
            (StatusCode::BAD_REQUEST, "Invalid certificate signing request").into_response()
        }
        Err(e) => {
            tracing::error!("Failed to sign CSR for {}: {}", payload.node_name, e);
            (StatusCode::INTERNAL_SERVER_ERROR, "Certificate signing failed").into_response()
        }
    }
}
