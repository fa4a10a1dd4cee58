//! Request-scoped authenticated identity.

use cohabit_core::{Account, AccountId, CommunityId, Role, SubjectId};

/// A fully resolved principal for authorization decisions.
///
/// Derived fresh from the stored account on every request by the guard and
/// passed explicitly to downstream decision functions; never cached across
/// requests, never stashed in ambient state. Role and affiliation here are
/// the *stored* ones, not whatever an older token claimed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal {
    pub account_id: AccountId,
    pub subject_id: SubjectId,
    pub role: Role,
    pub community_id: Option<CommunityId>,
    pub is_owner: bool,
}

impl Principal {
    /// Project an account record into its request-scoped principal.
    pub fn from_account(account: &Account) -> Self {
        Self {
            account_id: account.id,
            subject_id: account.subject_id.clone(),
            role: account.role,
            community_id: account.community_id,
            is_owner: account.is_owner,
        }
    }
}
