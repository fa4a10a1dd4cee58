use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde_json::json;

use cohabit_auth::{IdentityError, TokenError};
use cohabit_membership::{BridgeError, GuardError, LifecycleError};

pub fn json_error(
    status: StatusCode,
    code: &'static str,
    message: impl Into<String>,
) -> axum::response::Response {
    (
        status,
        axum::Json(json!({
            "error": code,
            "message": message.into(),
        })),
    )
        .into_response()
}

pub fn guard_error_to_response(err: GuardError) -> axum::response::Response {
    match err {
        GuardError::MissingCredential => {
            json_error(StatusCode::UNAUTHORIZED, "missing_credential", err.to_string())
        }
        GuardError::Token(e) => token_error_to_response(e),
        GuardError::AccountGone => {
            json_error(StatusCode::UNAUTHORIZED, "unknown_account", err.to_string())
        }
        GuardError::AccountDisabled(_) => {
            json_error(StatusCode::FORBIDDEN, "account_disabled", err.to_string())
        }
        GuardError::Directory(e) => internal_error(e.into()),
    }
}

pub fn bridge_error_to_response(err: BridgeError) -> axum::response::Response {
    match err {
        BridgeError::Identity(e) => identity_error_to_response(e),
        BridgeError::Token(e) => token_error_to_response(e),
        BridgeError::AccountNotFound => {
            json_error(StatusCode::NOT_FOUND, "not_found", err.to_string())
        }
        BridgeError::AccountGone => {
            json_error(StatusCode::UNAUTHORIZED, "unknown_account", err.to_string())
        }
        BridgeError::AccountDisabled(_) => {
            json_error(StatusCode::FORBIDDEN, "account_disabled", err.to_string())
        }
        BridgeError::DuplicateIdentity => {
            json_error(StatusCode::CONFLICT, "conflict", err.to_string())
        }
        BridgeError::Validation(e) => {
            json_error(StatusCode::BAD_REQUEST, "validation_error", e.to_string())
        }
        BridgeError::Internal(e) => internal_error(e),
    }
}

pub fn lifecycle_error_to_response(err: LifecycleError) -> axum::response::Response {
    match err {
        LifecycleError::Forbidden => json_error(StatusCode::FORBIDDEN, "forbidden", "forbidden"),
        LifecycleError::AccountNotFound | LifecycleError::CommunityNotFound => {
            json_error(StatusCode::NOT_FOUND, "not_found", err.to_string())
        }
        LifecycleError::UnknownCode => {
            json_error(StatusCode::NOT_FOUND, "not_found", err.to_string())
        }
        LifecycleError::AlreadyMember => {
            json_error(StatusCode::CONFLICT, "conflict", err.to_string())
        }
        LifecycleError::Validation(e) => {
            json_error(StatusCode::BAD_REQUEST, "validation_error", e.to_string())
        }
        LifecycleError::Internal(e) => internal_error(e),
    }
}

fn identity_error_to_response(err: IdentityError) -> axum::response::Response {
    match err {
        IdentityError::Expired => {
            json_error(StatusCode::UNAUTHORIZED, "assertion_expired", err.to_string())
        }
        IdentityError::Invalid => {
            json_error(StatusCode::UNAUTHORIZED, "assertion_invalid", err.to_string())
        }
        // Distinct and retryable: a provider outage is not a bad credential.
        IdentityError::Unavailable => json_error(
            StatusCode::SERVICE_UNAVAILABLE,
            "identity_provider_unavailable",
            err.to_string(),
        ),
    }
}

fn token_error_to_response(err: TokenError) -> axum::response::Response {
    match err {
        TokenError::Expired => {
            json_error(StatusCode::UNAUTHORIZED, "token_expired", err.to_string())
        }
        TokenError::Malformed | TokenError::BadSignature => {
            json_error(StatusCode::UNAUTHORIZED, "invalid_token", err.to_string())
        }
    }
}

/// Log the failure, surface an opaque 500.
fn internal_error(err: anyhow::Error) -> axum::response::Response {
    tracing::error!(error = ?err, "internal error");
    json_error(
        StatusCode::INTERNAL_SERVER_ERROR,
        "internal_error",
        "internal error",
    )
}
