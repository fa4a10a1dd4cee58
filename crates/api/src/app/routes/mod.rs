use axum::Router;

pub mod accounts;
pub mod auth;
pub mod communities;
pub mod system;

/// Router for all authenticated endpoints.
pub fn router() -> Router {
    Router::new()
        .nest("/accounts", accounts::router())
        .nest("/communities", communities::router())
}
