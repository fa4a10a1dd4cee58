//! Identity bridge: external assertions in, session tokens out.
//!
//! Login exchanges an externally-verified assertion for this system's own
//! short-lived signed credential; refresh trades an expired-but-authentic
//! token for a fresh one; register is the only place accounts come into
//! existence. Every issued token embeds the role *stored* at issuance time.

use std::sync::Arc;

use chrono::Utc;
use thiserror::Error;

use cohabit_auth::{IdentityError, IdentityVerifier, SessionIssuer, TokenError};
use cohabit_core::{Account, AccountId, AccountStatus, ValidationError};
use cohabit_directory::{AccountDirectory, DirectoryError};

use crate::validate::{normalize_display_name, normalize_email};

/// A freshly issued session token plus the account it names.
#[derive(Debug, Clone)]
pub struct AuthGrant {
    pub token: String,
    pub account: Account,
}

/// Profile attributes for a new account.
#[derive(Debug, Clone)]
pub struct NewRegistration {
    pub display_name: String,
    pub email: String,
}

#[derive(Debug, Error)]
pub enum BridgeError {
    /// The external provider rejected the assertion (or was unreachable —
    /// that arm stays distinct and retryable).
    #[error(transparent)]
    Identity(#[from] IdentityError),

    /// The presented session token failed verification.
    #[error(transparent)]
    Token(#[from] TokenError),

    /// The verified subject has no account; registration is explicit.
    #[error("no account is linked to this identity")]
    AccountNotFound,

    /// The token names an account that no longer exists.
    #[error("account no longer exists")]
    AccountGone,

    /// The account exists but may not authenticate.
    #[error("account is {0}")]
    AccountDisabled(AccountStatus),

    /// Another account already claims this external subject.
    #[error("an account is already linked to this external identity")]
    DuplicateIdentity,

    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Unexpected failure; logged, surfaced opaquely.
    #[error("internal error")]
    Internal(#[from] anyhow::Error),
}

impl From<DirectoryError> for BridgeError {
    fn from(value: DirectoryError) -> Self {
        match value {
            DirectoryError::DuplicateSubject => BridgeError::DuplicateIdentity,
            other => BridgeError::Internal(anyhow::Error::new(other)),
        }
    }
}

/// Translates externally-verified identity into internally trusted sessions.
pub struct IdentityBridge {
    verifier: Arc<dyn IdentityVerifier>,
    sessions: Arc<SessionIssuer>,
    accounts: Arc<dyn AccountDirectory>,
}

impl IdentityBridge {
    pub fn new(
        verifier: Arc<dyn IdentityVerifier>,
        sessions: Arc<SessionIssuer>,
        accounts: Arc<dyn AccountDirectory>,
    ) -> Self {
        Self {
            verifier,
            sessions,
            accounts,
        }
    }

    /// Exchange an external identity assertion for a session token.
    ///
    /// Never auto-provisions: an unknown subject fails `AccountNotFound`.
    pub async fn login(&self, assertion: &str) -> Result<AuthGrant, BridgeError> {
        let subject_id = self.verifier.verify(assertion).await?;

        let account = self
            .accounts
            .find_by_subject(&subject_id)
            .await?
            .ok_or(BridgeError::AccountNotFound)?;

        self.grant(account)
    }

    /// Trade an expired-but-otherwise-valid token for a fresh one.
    ///
    /// This is the one path that ignores expiry; the signature still has to
    /// check out, and the account is re-read so the fresh claims carry the
    /// currently stored role.
    pub async fn refresh(&self, token: &str) -> Result<String, BridgeError> {
        let claims = self.sessions.verify_ignoring_expiry(token)?;

        let account = self
            .accounts
            .find(claims.sub)
            .await?
            .ok_or(BridgeError::AccountGone)?;

        if !account.status.is_active() {
            return Err(BridgeError::AccountDisabled(account.status));
        }

        let fresh = self.sessions.issue(account.id, account.role)?;
        Ok(fresh)
    }

    /// Create the account an external identity maps to, and log it in.
    ///
    /// The store's unique subject constraint arbitrates concurrent
    /// registrations for the same identity.
    pub async fn register(
        &self,
        assertion: &str,
        registration: NewRegistration,
    ) -> Result<AuthGrant, BridgeError> {
        let subject_id = self.verifier.verify(assertion).await?;
        let display_name = normalize_display_name(&registration.display_name)?;
        let email = normalize_email(&registration.email)?;

        let account = Account::registered(
            AccountId::new(),
            subject_id,
            display_name,
            email,
            Utc::now(),
        );
        self.accounts.insert(account.clone()).await?;

        tracing::info!(account_id = %account.id, "account registered");
        self.grant(account)
    }

    fn grant(&self, account: Account) -> Result<AuthGrant, BridgeError> {
        if !account.status.is_active() {
            return Err(BridgeError::AccountDisabled(account.status));
        }

        let token = self.sessions.issue(account.id, account.role)?;
        Ok(AuthGrant { token, account })
    }
}
