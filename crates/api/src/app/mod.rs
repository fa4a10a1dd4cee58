//! HTTP API application wiring (axum router + service wiring).
//!
//! - `services.rs`: component wiring (directories, issuer, bridge, lifecycle)
//! - `routes/`: HTTP routes + handlers (one file per area)
//! - `dto.rs`: request DTOs and JSON mapping helpers
//! - `errors.rs`: consistent error responses

use std::sync::Arc;

use axum::{Extension, Router, routing::get};
use tower::ServiceBuilder;

use crate::middleware;

pub mod dto;
pub mod errors;
pub mod routes;
pub mod services;

pub use services::{ApiConfig, AppServices, build_services};

/// Build the full HTTP router (public entrypoint used by `main.rs` and the
/// black-box tests).
///
/// Public routes (health, the auth exchange) never touch the guard; every
/// protected route passes through the bearer middleware first.
pub fn build_app(services: Arc<AppServices>) -> Router {
    let auth_state = middleware::AuthState {
        guard: services.guard.clone(),
    };

    let public = Router::new()
        .route("/health", get(routes::system::health))
        .nest("/auth", routes::auth::router());

    let protected = routes::router().layer(axum::middleware::from_fn_with_state(
        auth_state,
        middleware::auth_middleware,
    ));

    public
        .merge(protected)
        .layer(ServiceBuilder::new().layer(Extension(services)))
}
