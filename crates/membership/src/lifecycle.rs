//! Membership lifecycle: create, join, delete, and account updates.
//!
//! Every transition here re-derives ownership from the community record and
//! keeps the single-active-membership invariant: attaching an account to a
//! community overwrites whatever membership it had before, and deleting a
//! community is the only bulk path that detaches members.

use std::sync::Arc;

use chrono::Utc;
use thiserror::Error;

use cohabit_auth::{require, AccessError, Capability, Principal, ResourceRefs, SessionIssuer};
use cohabit_core::{
    Account, AccountId, Affiliation, Community, CommunityId, JoinCode, Role, ValidationError,
};
use cohabit_directory::{AccountChange, AccountDirectory, CommunityDirectory, DirectoryError};

use crate::code::JoinCodeSource;
use crate::validate::{normalize_community_name, normalize_display_name, normalize_email};

/// Attributes for a new community.
#[derive(Debug, Clone)]
pub struct NewCommunity {
    pub name: String,
}

/// Outcome of a successful create: the record, the caller's refreshed
/// account, and a freshly issued session token.
#[derive(Debug, Clone)]
pub struct CommunityCreated {
    pub community: Community,
    pub account: Account,
    pub token: String,
}

/// Outcome of a successful join.
#[derive(Debug, Clone)]
pub struct CommunityJoined {
    pub community: Community,
    pub account: Account,
    pub token: String,
}

/// Editable account fields. Role changes are admin-only; membership fields
/// are absent on purpose and move only through community transitions.
#[derive(Debug, Clone, Default)]
pub struct AccountEdit {
    pub display_name: Option<String>,
    pub email: Option<String>,
    pub role: Option<Role>,
}

/// Outcome of an account update. `token` is set only on self-edits; an
/// administrator editing someone else cannot mint a credential for them, so
/// that account's outstanding token keeps its old role claim until it expires.
#[derive(Debug, Clone)]
pub struct AccountUpdated {
    pub account: Account,
    pub token: Option<String>,
}

#[derive(Debug, Error)]
pub enum LifecycleError {
    /// The caller is not allowed to perform this action on this resource.
    /// Always distinct from `*NotFound`: a resource that exists but is out of
    /// reach is refused, not hidden.
    #[error("forbidden")]
    Forbidden,

    #[error("account not found")]
    AccountNotFound,

    #[error("community not found")]
    CommunityNotFound,

    /// No live community carries the presented join code.
    #[error("no community matches this join code")]
    UnknownCode,

    /// The caller already belongs to the community behind this code.
    #[error("already a member of this community")]
    AlreadyMember,

    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Unexpected failure; logged, surfaced opaquely.
    #[error("internal error")]
    Internal(#[from] anyhow::Error),
}

impl From<AccessError> for LifecycleError {
    fn from(_: AccessError) -> Self {
        LifecycleError::Forbidden
    }
}

impl From<DirectoryError> for LifecycleError {
    fn from(value: DirectoryError) -> Self {
        match value {
            DirectoryError::AccountNotFound => LifecycleError::AccountNotFound,
            DirectoryError::CommunityNotFound => LifecycleError::CommunityNotFound,
            other => LifecycleError::Internal(anyhow::Error::new(other)),
        }
    }
}

/// Orchestrates membership transitions over the directories.
pub struct MembershipLifecycle {
    accounts: Arc<dyn AccountDirectory>,
    communities: Arc<dyn CommunityDirectory>,
    codes: Arc<dyn JoinCodeSource>,
    sessions: Arc<SessionIssuer>,
}

impl MembershipLifecycle {
    pub fn new(
        accounts: Arc<dyn AccountDirectory>,
        communities: Arc<dyn CommunityDirectory>,
        codes: Arc<dyn JoinCodeSource>,
        sessions: Arc<SessionIssuer>,
    ) -> Self {
        Self {
            accounts,
            communities,
            codes,
            sessions,
        }
    }

    /// Create a community owned by the caller and make them its first member.
    ///
    /// If the caller already belongs to a community, that membership is
    /// overwritten; creating is an implicit move, not an error.
    pub async fn create_community(
        &self,
        principal: &Principal,
        input: NewCommunity,
    ) -> Result<CommunityCreated, LifecycleError> {
        let name = normalize_community_name(&input.name)?;

        // Draw codes until one sticks. The probe keeps the common case to a
        // single insert; the insert-time uniqueness check is what actually
        // arbitrates, so a conflict there is just another draw.
        let community = loop {
            let code = self.codes.draw();
            if self.communities.find_by_code(&code).await?.is_some() {
                tracing::debug!("join code already in use, drawing another");
                continue;
            }

            let candidate = Community::new(
                CommunityId::new(),
                principal.account_id,
                name.clone(),
                code,
                Utc::now(),
            );
            match self.communities.insert(candidate.clone()).await {
                Ok(()) => break candidate,
                Err(DirectoryError::DuplicateJoinCode) => {
                    tracing::debug!("join code taken by a concurrent insert, drawing another");
                    continue;
                }
                Err(other) => return Err(other.into()),
            }
        };

        let account = self
            .accounts
            .set_affiliation(
                principal.account_id,
                Affiliation::Member {
                    community_id: community.id,
                    is_owner: true,
                },
            )
            .await?;

        let token = self.sessions.issue(account.id, account.role)?;
        tracing::info!(community_id = %community.id, owner_id = %account.id, "community created");

        Ok(CommunityCreated {
            community,
            account,
            token,
        })
    }

    /// Attach the caller to the community carrying `code`.
    ///
    /// Joining the community the caller is already in is refused with state
    /// unchanged; joining from anywhere else overwrites the previous
    /// membership. Ownership is recomputed from the community record, so an
    /// owner re-joining their own community stays its owner.
    pub async fn join_by_code(
        &self,
        principal: &Principal,
        code: &JoinCode,
    ) -> Result<CommunityJoined, LifecycleError> {
        let community = self
            .communities
            .find_by_code(code)
            .await?
            .ok_or(LifecycleError::UnknownCode)?;

        if principal.community_id == Some(community.id) {
            return Err(LifecycleError::AlreadyMember);
        }

        let is_owner = community.owner_id == principal.account_id;
        let account = self
            .accounts
            .set_affiliation(
                principal.account_id,
                Affiliation::Member {
                    community_id: community.id,
                    is_owner,
                },
            )
            .await?;

        let token = self.sessions.issue(account.id, account.role)?;
        tracing::info!(community_id = %community.id, account_id = %account.id, "member joined");

        Ok(CommunityJoined {
            community,
            account,
            token,
        })
    }

    /// Delete a community and detach every member. Owner or admin only.
    ///
    /// Returns how many accounts were detached. Lookup precedes the access
    /// check so a missing community reads `CommunityNotFound` for everyone.
    pub async fn delete_community(
        &self,
        principal: &Principal,
        community_id: CommunityId,
    ) -> Result<u64, LifecycleError> {
        let community = self
            .communities
            .find(community_id)
            .await?
            .ok_or(LifecycleError::CommunityNotFound)?;

        require(
            principal,
            Capability::ManageCommunity,
            &ResourceRefs::owned_by(community.owner_id),
        )?;

        let detached = self.accounts.detach_all(community.id).await?;
        self.communities.remove(community.id).await?;

        tracing::info!(
            community_id = %community.id,
            members_detached = detached,
            "community deleted"
        );
        Ok(detached)
    }

    /// Update an account's profile. Self or admin only; role changes are
    /// admin-only regardless of target.
    pub async fn update_account(
        &self,
        principal: &Principal,
        target: AccountId,
        edit: AccountEdit,
    ) -> Result<AccountUpdated, LifecycleError> {
        let existing = self
            .accounts
            .find(target)
            .await?
            .ok_or(LifecycleError::AccountNotFound)?;

        require(
            principal,
            Capability::ManageAccount,
            &ResourceRefs::owned_by(existing.id),
        )?;

        if edit.role.is_some() && !principal.role.is_admin() {
            return Err(ValidationError::new(
                "role",
                "only an administrator may change roles",
            )
            .into());
        }

        let change = AccountChange {
            display_name: edit
                .display_name
                .as_deref()
                .map(normalize_display_name)
                .transpose()?,
            email: edit.email.as_deref().map(normalize_email).transpose()?,
            role: edit.role,
            status: None,
        };
        let account = self.accounts.update(existing.id, change).await?;

        // A self-edit hands back a fresh credential so its role claim matches
        // the stored role immediately.
        let token = if principal.account_id == account.id {
            Some(self.sessions.issue(account.id, account.role)?)
        } else {
            None
        };

        Ok(AccountUpdated { account, token })
    }
}
