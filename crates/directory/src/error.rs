//! Store error model.

use thiserror::Error;

/// Failure raised by a directory operation.
///
/// The duplicate arms are the store's unique constraints speaking: insert-time
/// uniqueness is the authoritative arbiter for subject linkage and join codes,
/// not any caller-side pre-check.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DirectoryError {
    #[error("account not found")]
    AccountNotFound,

    #[error("community not found")]
    CommunityNotFound,

    /// An account is already linked to this external subject.
    #[error("an account is already linked to this external identity")]
    DuplicateSubject,

    /// Another live community already holds this join code.
    #[error("join code already in use")]
    DuplicateJoinCode,

    /// The store could not be consulted at all.
    #[error("directory unavailable: {0}")]
    Unavailable(String),
}

impl DirectoryError {
    pub fn unavailable(msg: impl Into<String>) -> Self {
        Self::Unavailable(msg.into())
    }
}
