//! Community directory: contract and in-memory implementation.

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;

use cohabit_core::{Community, CommunityId, JoinCode};

use crate::error::DirectoryError;

/// Persistent community store keyed by id and join code.
#[async_trait]
pub trait CommunityDirectory: Send + Sync {
    /// Create a new community. The join code must be unique among live
    /// communities; a collision fails `DuplicateJoinCode`. This insert-time
    /// check is the sole arbiter of code uniqueness — callers that probed
    /// first must still treat a conflict here as a retryable race.
    async fn insert(&self, community: Community) -> Result<(), DirectoryError>;

    async fn find(&self, id: CommunityId) -> Result<Option<Community>, DirectoryError>;

    async fn find_by_code(&self, code: &JoinCode) -> Result<Option<Community>, DirectoryError>;

    /// Remove a community record. Fails `CommunityNotFound` if absent.
    async fn remove(&self, id: CommunityId) -> Result<(), DirectoryError>;
}

/// In-memory community directory for dev/tests and as reference semantics.
#[derive(Debug, Default)]
pub struct InMemoryCommunityDirectory {
    inner: RwLock<HashMap<CommunityId, Community>>,
}

impl InMemoryCommunityDirectory {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CommunityDirectory for InMemoryCommunityDirectory {
    async fn insert(&self, community: Community) -> Result<(), DirectoryError> {
        let mut map = self
            .inner
            .write()
            .map_err(|_| DirectoryError::unavailable("community store lock poisoned"))?;

        if map.values().any(|c| c.join_code == community.join_code) {
            return Err(DirectoryError::DuplicateJoinCode);
        }

        map.insert(community.id, community);
        Ok(())
    }

    async fn find(&self, id: CommunityId) -> Result<Option<Community>, DirectoryError> {
        let map = self
            .inner
            .read()
            .map_err(|_| DirectoryError::unavailable("community store lock poisoned"))?;
        Ok(map.get(&id).cloned())
    }

    async fn find_by_code(&self, code: &JoinCode) -> Result<Option<Community>, DirectoryError> {
        let map = self
            .inner
            .read()
            .map_err(|_| DirectoryError::unavailable("community store lock poisoned"))?;
        Ok(map.values().find(|c| &c.join_code == code).cloned())
    }

    async fn remove(&self, id: CommunityId) -> Result<(), DirectoryError> {
        let mut map = self
            .inner
            .write()
            .map_err(|_| DirectoryError::unavailable("community store lock poisoned"))?;

        map.remove(&id)
            .map(|_| ())
            .ok_or(DirectoryError::CommunityNotFound)
    }
}
