use std::sync::Arc;

use axum::{
    extract::State,
    http::HeaderMap,
    middleware::Next,
    response::Response,
};

use cohabit_membership::AuthorizationGuard;

use crate::app::errors;

#[derive(Clone)]
pub struct AuthState {
    pub guard: Arc<AuthorizationGuard>,
}

/// Resolve the bearer token into a fresh [`cohabit_auth::Principal`] and
/// attach it to the request. Applied to protected routes only; failures never
/// reach a handler.
pub async fn auth_middleware(
    State(state): State<AuthState>,
    mut req: axum::http::Request<axum::body::Body>,
    next: Next,
) -> Result<Response, Response> {
    let token = extract_bearer(req.headers()).map(str::to_owned);

    let principal = state
        .guard
        .authenticate(token.as_deref())
        .await
        .map_err(errors::guard_error_to_response)?;

    req.extensions_mut().insert(principal);

    Ok(next.run(req).await)
}

fn extract_bearer(headers: &HeaderMap) -> Option<&str> {
    let header = headers.get(axum::http::header::AUTHORIZATION)?;
    let header = header.to_str().ok()?;

    let token = header.strip_prefix("Bearer ")?.trim();
    if token.is_empty() {
        return None;
    }

    Some(token)
}
