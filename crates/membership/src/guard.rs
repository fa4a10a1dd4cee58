//! Per-request authorization guard.

use std::sync::Arc;

use thiserror::Error;

use cohabit_auth::{Principal, SessionIssuer, TokenError};
use cohabit_core::AccountStatus;
use cohabit_directory::{AccountDirectory, DirectoryError};

#[derive(Debug, Error)]
pub enum GuardError {
    /// No bearer credential was presented.
    #[error("missing bearer credential")]
    MissingCredential,

    /// The presented token failed verification.
    #[error(transparent)]
    Token(#[from] TokenError),

    /// The token names an account that no longer exists.
    #[error("account no longer exists")]
    AccountGone,

    /// The account exists but may not authenticate.
    #[error("account is {0}")]
    AccountDisabled(AccountStatus),

    /// The directory could not be consulted.
    #[error(transparent)]
    Directory(#[from] DirectoryError),
}

/// Verifies the session token on every authenticated request and re-resolves
/// the account behind it.
///
/// The lookup is a second, fresh read: the principal is built from the
/// *stored* role and affiliation, never from the token's role claim, so role
/// and membership changes made after issuance are honored wherever state is
/// re-read. Routes that require no authentication never invoke the guard.
pub struct AuthorizationGuard {
    sessions: Arc<SessionIssuer>,
    accounts: Arc<dyn AccountDirectory>,
}

impl AuthorizationGuard {
    pub fn new(sessions: Arc<SessionIssuer>, accounts: Arc<dyn AccountDirectory>) -> Self {
        Self { sessions, accounts }
    }

    /// Authenticate one request from its (possibly absent) bearer token.
    pub async fn authenticate(&self, token: Option<&str>) -> Result<Principal, GuardError> {
        let token = token.ok_or(GuardError::MissingCredential)?;
        let claims = self.sessions.verify(token)?;

        let account = self
            .accounts
            .find(claims.sub)
            .await?
            .ok_or(GuardError::AccountGone)?;

        if !account.status.is_active() {
            return Err(GuardError::AccountDisabled(account.status));
        }

        Ok(Principal::from_account(&account))
    }
}
