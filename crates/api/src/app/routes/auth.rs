use std::sync::Arc;

use axum::{
    Json, Router,
    extract::Extension,
    http::StatusCode,
    response::IntoResponse,
    routing::post,
};

use cohabit_membership::NewRegistration;

use crate::app::services::AppServices;
use crate::app::{dto, errors};

/// Public routes: the assertion-for-token exchange. No guard in front.
pub fn router() -> Router {
    Router::new()
        .route("/login", post(login))
        .route("/refresh", post(refresh))
        .route("/register", post(register))
}

pub async fn login(
    Extension(services): Extension<Arc<AppServices>>,
    Json(body): Json<dto::LoginRequest>,
) -> axum::response::Response {
    match services.bridge.login(&body.assertion).await {
        Ok(grant) => (
            StatusCode::OK,
            Json(serde_json::json!({
                "token": grant.token,
                "account": dto::account_to_json(&grant.account),
            })),
        )
            .into_response(),
        Err(e) => errors::bridge_error_to_response(e),
    }
}

pub async fn refresh(
    Extension(services): Extension<Arc<AppServices>>,
    Json(body): Json<dto::RefreshRequest>,
) -> axum::response::Response {
    match services.bridge.refresh(&body.token).await {
        Ok(token) => {
            (StatusCode::OK, Json(serde_json::json!({ "token": token }))).into_response()
        }
        Err(e) => errors::bridge_error_to_response(e),
    }
}

pub async fn register(
    Extension(services): Extension<Arc<AppServices>>,
    Json(body): Json<dto::RegisterRequest>,
) -> axum::response::Response {
    let registration = NewRegistration {
        display_name: body.display_name,
        email: body.email,
    };

    match services.bridge.register(&body.assertion, registration).await {
        Ok(grant) => (
            StatusCode::CREATED,
            Json(serde_json::json!({
                "token": grant.token,
                "account": dto::account_to_json(&grant.account),
            })),
        )
            .into_response(),
        Err(e) => errors::bridge_error_to_response(e),
    }
}
