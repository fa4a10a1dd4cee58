use serde::Deserialize;

use cohabit_core::{Account, Community, Role};

// -------------------------
// Request DTOs
// -------------------------

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    /// Opaque assertion from the external identity provider.
    pub assertion: String,
}

#[derive(Debug, Deserialize)]
pub struct RefreshRequest {
    /// An expired-but-authentic session token.
    pub token: String,
}

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub assertion: String,
    pub display_name: String,
    pub email: String,
}

/// Editable account fields. Unknown fields are rejected outright so
/// privileged state (membership, subject linkage) cannot ride in through
/// this path; `role` is accepted here but honored for admins only.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UpdateAccountRequest {
    pub display_name: Option<String>,
    pub email: Option<String>,
    pub role: Option<Role>,
}

#[derive(Debug, Deserialize)]
pub struct CreateCommunityRequest {
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct JoinCommunityRequest {
    pub code: String,
}

// -------------------------
// JSON mapping helpers
// -------------------------

pub fn account_to_json(account: &Account) -> serde_json::Value {
    serde_json::json!({
        "id": account.id.to_string(),
        "display_name": account.display_name,
        "email": account.email,
        "role": account.role,
        "status": account.status,
        "community_id": account.community_id.map(|id| id.to_string()),
        "is_owner": account.is_owner,
        "created_at": account.created_at.to_rfc3339(),
        "updated_at": account.updated_at.to_rfc3339(),
    })
}

pub fn community_to_json(community: &Community) -> serde_json::Value {
    serde_json::json!({
        "id": community.id.to_string(),
        "owner_id": community.owner_id.to_string(),
        "name": community.name,
        "join_code": community.join_code.as_str(),
        "created_at": community.created_at.to_rfc3339(),
    })
}
