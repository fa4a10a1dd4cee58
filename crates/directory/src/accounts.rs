//! Account directory: contract and in-memory implementation.

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;
use chrono::Utc;

use cohabit_core::{Account, AccountId, AccountStatus, Affiliation, CommunityId, Role, SubjectId};

use crate::error::DirectoryError;

/// Partial update applied by [`AccountDirectory::update`].
///
/// Affiliation is deliberately absent: it moves only through
/// [`AccountDirectory::set_affiliation`] so the ownership flag always travels
/// with it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AccountChange {
    pub display_name: Option<String>,
    pub email: Option<String>,
    pub role: Option<Role>,
    pub status: Option<AccountStatus>,
}

/// Persistent mapping from account ids and external subject ids to account
/// records. Sole writer of account state.
#[async_trait]
pub trait AccountDirectory: Send + Sync {
    /// Create a new account. The external subject linkage must be unique;
    /// a second account for the same subject fails `DuplicateSubject`.
    async fn insert(&self, account: Account) -> Result<(), DirectoryError>;

    async fn find(&self, id: AccountId) -> Result<Option<Account>, DirectoryError>;

    async fn find_by_subject(
        &self,
        subject_id: &SubjectId,
    ) -> Result<Option<Account>, DirectoryError>;

    /// Apply a field change and return the stored record.
    async fn update(&self, id: AccountId, change: AccountChange)
        -> Result<Account, DirectoryError>;

    /// Overwrite the account's affiliation and return the stored record.
    async fn set_affiliation(
        &self,
        id: AccountId,
        affiliation: Affiliation,
    ) -> Result<Account, DirectoryError>;

    /// Detach every member of the given community. Returns how many accounts
    /// were detached.
    async fn detach_all(&self, community_id: CommunityId) -> Result<u64, DirectoryError>;
}

/// In-memory account directory for dev/tests and as reference semantics.
///
/// Writes are last-writer-wins under a plain `RwLock`; no cross-request
/// ordering is promised beyond that, same as the contract.
#[derive(Debug, Default)]
pub struct InMemoryAccountDirectory {
    inner: RwLock<HashMap<AccountId, Account>>,
}

impl InMemoryAccountDirectory {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl AccountDirectory for InMemoryAccountDirectory {
    async fn insert(&self, account: Account) -> Result<(), DirectoryError> {
        let mut map = self
            .inner
            .write()
            .map_err(|_| DirectoryError::unavailable("account store lock poisoned"))?;

        if map.values().any(|a| a.subject_id == account.subject_id) {
            return Err(DirectoryError::DuplicateSubject);
        }

        map.insert(account.id, account);
        Ok(())
    }

    async fn find(&self, id: AccountId) -> Result<Option<Account>, DirectoryError> {
        let map = self
            .inner
            .read()
            .map_err(|_| DirectoryError::unavailable("account store lock poisoned"))?;
        Ok(map.get(&id).cloned())
    }

    async fn find_by_subject(
        &self,
        subject_id: &SubjectId,
    ) -> Result<Option<Account>, DirectoryError> {
        let map = self
            .inner
            .read()
            .map_err(|_| DirectoryError::unavailable("account store lock poisoned"))?;
        Ok(map.values().find(|a| &a.subject_id == subject_id).cloned())
    }

    async fn update(
        &self,
        id: AccountId,
        change: AccountChange,
    ) -> Result<Account, DirectoryError> {
        let mut map = self
            .inner
            .write()
            .map_err(|_| DirectoryError::unavailable("account store lock poisoned"))?;

        let account = map.get_mut(&id).ok_or(DirectoryError::AccountNotFound)?;
        if let Some(display_name) = change.display_name {
            account.display_name = display_name;
        }
        if let Some(email) = change.email {
            account.email = email;
        }
        if let Some(role) = change.role {
            account.role = role;
        }
        if let Some(status) = change.status {
            account.status = status;
        }
        account.updated_at = Utc::now();

        Ok(account.clone())
    }

    async fn set_affiliation(
        &self,
        id: AccountId,
        affiliation: Affiliation,
    ) -> Result<Account, DirectoryError> {
        let mut map = self
            .inner
            .write()
            .map_err(|_| DirectoryError::unavailable("account store lock poisoned"))?;

        let account = map.get_mut(&id).ok_or(DirectoryError::AccountNotFound)?;
        match affiliation {
            Affiliation::Unaffiliated => {
                account.community_id = None;
                account.is_owner = false;
            }
            Affiliation::Member {
                community_id,
                is_owner,
            } => {
                account.community_id = Some(community_id);
                account.is_owner = is_owner;
            }
        }
        account.updated_at = Utc::now();

        Ok(account.clone())
    }

    async fn detach_all(&self, community_id: CommunityId) -> Result<u64, DirectoryError> {
        let mut map = self
            .inner
            .write()
            .map_err(|_| DirectoryError::unavailable("account store lock poisoned"))?;

        let now = Utc::now();
        let mut detached = 0u64;
        for account in map.values_mut() {
            if account.community_id == Some(community_id) {
                account.community_id = None;
                account.is_owner = false;
                account.updated_at = now;
                detached += 1;
            }
        }

        Ok(detached)
    }
}
