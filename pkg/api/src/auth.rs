use axum::{
    extract::{Request, State},
    http::{StatusCode, header},
    middleware::Next,
    response::Response,
};
use tracing::warn;

use crate::AppState;

/// Middleware: authenticates the request using a Bearer token.
///
/// The signing route sits behind this check; the root-certificate route is
/// deliberately left outside it (callers fetching the root have no
/// credentials yet). Transport-level mutual TLS for authenticated routes is
/// the deployment's concern, fed by `SecurityConfig`.
pub async fn auth_middleware(
    State(state): State<AppState>,
    req: Request,
    next: Next,
) -> Result<Response, StatusCode> {
    let auth_header = req.headers().get(header::AUTHORIZATION);

    let token = match auth_header {
        Some(value) => {
            let value_str = value.to_str().map_err(|_| StatusCode::UNAUTHORIZED)?;
            if !value_str.starts_with("Bearer ") {
                return Err(StatusCode::UNAUTHORIZED);
            }
            value_str.trim_start_matches("Bearer ").to_string()
        }
        None => return Err(StatusCode::UNAUTHORIZED),
    };

    if token == state.join_token {
        Ok(next.run(req).await)
    } else {
        warn!("Invalid Bearer token provided");
        Err(StatusCode::UNAUTHORIZED)
    }
}
