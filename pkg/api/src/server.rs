use axum::{
    Router, middleware,
    routing::{get, post},
};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::info;

use crate::AppState;
use crate::auth::auth_middleware;
use crate::handlers::ca;
use pkg_constants::network::{ROUTE_CA_CERTIFICATE, ROUTE_CA_SIGN};
use pkg_pki::SecurityConfig;

/// Server configuration passed from the binary's CLI.
pub struct CaServerConfig {
    pub addr: SocketAddr,
    pub join_token: String,
}

/// Build the CA service router: the root-certificate route is public, every
/// other route requires the join token.
pub fn router(state: AppState) -> Router {
    let protected = Router::new()
        .route(ROUTE_CA_SIGN, post(ca::sign_certificate))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ));

    Router::new()
        .route(ROUTE_CA_CERTIFICATE, get(ca::get_root_certificate))
        .merge(protected)
        .with_state(state)
}

pub async fn start_server(
    config: CaServerConfig,
    security: Arc<SecurityConfig>,
) -> anyhow::Result<()> {
    let state = AppState {
        security,
        join_token: config.join_token,
    };
    let app = router(state);

    info!("Starting CA server on {}", config.addr);
    let listener = TcpListener::bind(config.addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
