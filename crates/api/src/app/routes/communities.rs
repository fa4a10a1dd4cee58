use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Extension, Path},
    http::StatusCode,
    response::IntoResponse,
    routing::{delete, post},
};

use cohabit_auth::Principal;
use cohabit_core::{CommunityId, JoinCode};
use cohabit_membership::NewCommunity;

use crate::app::services::AppServices;
use crate::app::{dto, errors};

pub fn router() -> Router {
    Router::new()
        .route("/", post(create_community))
        .route("/join", post(join_community))
        .route("/:id", delete(delete_community))
}

pub async fn create_community(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<Principal>,
    Json(body): Json<dto::CreateCommunityRequest>,
) -> axum::response::Response {
    let input = NewCommunity { name: body.name };

    match services.lifecycle.create_community(&principal, input).await {
        Ok(created) => (
            StatusCode::CREATED,
            Json(serde_json::json!({
                "community": dto::community_to_json(&created.community),
                "account": dto::account_to_json(&created.account),
                "token": created.token,
            })),
        )
            .into_response(),
        Err(e) => errors::lifecycle_error_to_response(e),
    }
}

pub async fn join_community(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<Principal>,
    Json(body): Json<dto::JoinCommunityRequest>,
) -> axum::response::Response {
    let code = match JoinCode::parse(&body.code) {
        Ok(code) => code,
        Err(e) => return errors::json_error(StatusCode::BAD_REQUEST, "validation_error", e.to_string()),
    };

    match services.lifecycle.join_by_code(&principal, &code).await {
        Ok(joined) => (
            StatusCode::OK,
            Json(serde_json::json!({
                "community": dto::community_to_json(&joined.community),
                "account": dto::account_to_json(&joined.account),
                "token": joined.token,
            })),
        )
            .into_response(),
        Err(e) => errors::lifecycle_error_to_response(e),
    }
}

pub async fn delete_community(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id: CommunityId = match id.parse() {
        Ok(v) => v,
        Err(_) => {
            return errors::json_error(
                StatusCode::BAD_REQUEST,
                "invalid_id",
                "invalid community id",
            );
        }
    };

    match services.lifecycle.delete_community(&principal, id).await {
        Ok(detached) => (
            StatusCode::OK,
            Json(serde_json::json!({ "members_detached": detached })),
        )
            .into_response(),
        Err(e) => errors::lifecycle_error_to_response(e),
    }
}
