//! Account record and its closed role/status vocabulary.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::id::{AccountId, CommunityId, SubjectId};

/// Role granted to an account.
///
/// A closed vocabulary, exhaustively matched by the access policy. Roles are
/// never compared as strings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Full administrator; allowed everything.
    Admin,
    /// Regular account.
    User,
    /// Account with a confirmed residency record.
    Resident,
}

impl Role {
    pub fn is_admin(&self) -> bool {
        matches!(self, Role::Admin)
    }
}

impl core::fmt::Display for Role {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Role::Admin => f.write_str("admin"),
            Role::User => f.write_str("user"),
            Role::Resident => f.write_str("resident"),
        }
    }
}

/// Account lifecycle status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum AccountStatus {
    /// Account may authenticate and transact.
    #[default]
    Active,
    /// Account is disabled but recoverable.
    Inactive,
    /// Account is banned and may not authenticate.
    Banned,
}

impl AccountStatus {
    pub fn is_active(&self) -> bool {
        matches!(self, AccountStatus::Active)
    }
}

impl core::fmt::Display for AccountStatus {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            AccountStatus::Active => f.write_str("active"),
            AccountStatus::Inactive => f.write_str("inactive"),
            AccountStatus::Banned => f.write_str("banned"),
        }
    }
}

/// Membership state of an account.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Affiliation {
    /// Not a member of any community.
    Unaffiliated,
    /// Member of exactly one community.
    Member {
        community_id: CommunityId,
        is_owner: bool,
    },
}

/// An account as stored in the directory.
///
/// # Invariants
/// - `community_id` holds at most one live membership.
/// - `is_owner` is true iff this account's id equals the community's owner id;
///   it is recomputed on every membership transition, never set directly.
/// - Created only by explicit registration, never auto-provisioned on login.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    pub id: AccountId,
    /// Link to the external identity provider's subject.
    pub subject_id: SubjectId,
    pub display_name: String,
    pub email: String,
    pub role: Role,
    pub community_id: Option<CommunityId>,
    pub is_owner: bool,
    pub status: AccountStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Account {
    /// Build a freshly registered account: regular role, active, unaffiliated.
    pub fn registered(
        id: AccountId,
        subject_id: SubjectId,
        display_name: String,
        email: String,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            subject_id,
            display_name,
            email,
            role: Role::User,
            community_id: None,
            is_owner: false,
            status: AccountStatus::Active,
            created_at: now,
            updated_at: now,
        }
    }

    /// Current membership state.
    pub fn affiliation(&self) -> Affiliation {
        match self.community_id {
            Some(community_id) => Affiliation::Member {
                community_id,
                is_owner: self.is_owner,
            },
            None => Affiliation::Unaffiliated,
        }
    }
}
