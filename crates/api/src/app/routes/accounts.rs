use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Extension, Path},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, patch},
};

use cohabit_auth::Principal;
use cohabit_core::AccountId;
use cohabit_membership::AccountEdit;

use crate::app::services::AppServices;
use crate::app::{dto, errors};

pub fn router() -> Router {
    Router::new()
        .route("/me", get(me))
        .route("/:id", patch(update_account))
}

pub async fn me(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<Principal>,
) -> axum::response::Response {
    // The guard resolved a principal a moment ago; re-read for the full record.
    match services.accounts.find(principal.account_id).await {
        Ok(Some(account)) => {
            (StatusCode::OK, Json(dto::account_to_json(&account))).into_response()
        }
        Ok(None) => errors::json_error(StatusCode::NOT_FOUND, "not_found", "account not found"),
        Err(e) => errors::lifecycle_error_to_response(e.into()),
    }
}

pub async fn update_account(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<String>,
    Json(body): Json<dto::UpdateAccountRequest>,
) -> axum::response::Response {
    let id: AccountId = match id.parse() {
        Ok(v) => v,
        Err(_) => {
            return errors::json_error(StatusCode::BAD_REQUEST, "invalid_id", "invalid account id");
        }
    };

    let edit = AccountEdit {
        display_name: body.display_name,
        email: body.email,
        role: body.role,
    };

    match services.lifecycle.update_account(&principal, id, edit).await {
        Ok(updated) => (
            StatusCode::OK,
            Json(serde_json::json!({
                "account": dto::account_to_json(&updated.account),
                "token": updated.token,
            })),
        )
            .into_response(),
        Err(e) => errors::lifecycle_error_to_response(e),
    }
}
