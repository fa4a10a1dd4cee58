//! Role- and ownership-based access policy.
//!
//! One pure decision function for every mutating action in the system. The
//! rules are ordered; the first that applies wins and everything else is a
//! deny. Denials surface as `Forbidden`, which callers keep distinct from
//! `NotFound`: a resource that exists but belongs to someone else is refused,
//! not hidden.

use thiserror::Error;

use cohabit_core::{AccountId, CommunityId};

use crate::Principal;

/// What kind of resource an action concerns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capability {
    /// The community record itself (delete, settings).
    ManageCommunity,
    /// A resource scoped to a community (task, event, expense, ...).
    CommunityResource,
    /// An account record.
    ManageAccount,
}

/// The resource coordinates a decision is made against.
///
/// `owner` is the community's owner for [`Capability::ManageCommunity`] and
/// the account being acted on for [`Capability::ManageAccount`];
/// `community` is the community a scoped resource belongs to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ResourceRefs {
    pub owner: Option<AccountId>,
    pub community: Option<CommunityId>,
}

impl ResourceRefs {
    pub fn owned_by(owner: AccountId) -> Self {
        Self {
            owner: Some(owner),
            community: None,
        }
    }

    pub fn in_community(community: CommunityId) -> Self {
        Self {
            owner: None,
            community: Some(community),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Allow,
    Deny,
}

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum AccessError {
    #[error("forbidden")]
    Forbidden,
}

/// Decide whether `principal` may perform an action of kind `capability` on
/// the resource described by `refs`.
///
/// - No IO
/// - No panics
/// - No business logic (pure policy check)
///
/// Rules, in order:
/// 1. Admins are allowed everything.
/// 2. A community record may be managed only by its owner.
/// 3. A community-scoped resource may be touched only from inside that
///    community.
/// 4. An account record may be managed only by that account.
/// 5. Everything else is denied, including any rule whose resource reference
///    is missing.
pub fn decide(principal: &Principal, capability: Capability, refs: &ResourceRefs) -> Decision {
    if principal.role.is_admin() {
        return Decision::Allow;
    }

    let allowed = match capability {
        Capability::ManageCommunity => refs.owner == Some(principal.account_id),
        Capability::CommunityResource => {
            principal.community_id.is_some() && principal.community_id == refs.community
        }
        Capability::ManageAccount => refs.owner == Some(principal.account_id),
    };

    if allowed { Decision::Allow } else { Decision::Deny }
}

/// [`decide`], with a deny lifted into an error for `?`-style call sites.
pub fn require(
    principal: &Principal,
    capability: Capability,
    refs: &ResourceRefs,
) -> Result<(), AccessError> {
    match decide(principal, capability, refs) {
        Decision::Allow => Ok(()),
        Decision::Deny => Err(AccessError::Forbidden),
    }
}
