//! Session token issuance and verification.
//!
//! Session tokens are this system's own short-lived signed credential,
//! distinct from the external identity assertion they are exchanged for.
//! Tokens are never persisted; validity is purely signature plus expiry at
//! verification time.

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use cohabit_core::{AccountId, Role};

/// Claims carried by a session token.
///
/// The `role` claim reflects the account's stored role *at issuance*; callers
/// that need the current role must re-read the directory (the guard does).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionClaims {
    /// Subject: the account the token names.
    pub sub: AccountId,

    /// Role held at issuance time.
    pub role: Role,

    /// Issued-at timestamp.
    pub issued_at: DateTime<Utc>,

    /// Expiration timestamp.
    pub expires_at: DateTime<Utc>,
}

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum TokenError {
    /// Not a structurally valid token.
    #[error("malformed session token")]
    Malformed,

    /// The signature does not match the server secret.
    #[error("invalid session token signature")]
    BadSignature,

    /// The token is past its expiry.
    #[error("session token expired")]
    Expired,
}

/// Mints and verifies session tokens with a server-held HS256 secret.
///
/// Issuance and verification are pure in-memory computations; no claim is
/// attacker-controlled.
pub struct SessionIssuer {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl: Duration,
}

impl SessionIssuer {
    pub fn new(secret: &[u8], ttl: Duration) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            ttl,
        }
    }

    /// Configured token lifetime.
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Mint a token for the given account/role with the configured ttl.
    pub fn issue(&self, account_id: AccountId, role: Role) -> anyhow::Result<String> {
        self.issue_at(account_id, role, Utc::now())
    }

    /// Mint a token as of an explicit instant.
    ///
    /// Exposed so tests can produce already-expired tokens deterministically.
    pub fn issue_at(
        &self,
        account_id: AccountId,
        role: Role,
        now: DateTime<Utc>,
    ) -> anyhow::Result<String> {
        let claims = SessionClaims {
            sub: account_id,
            role,
            issued_at: now,
            expires_at: now + self.ttl,
        };
        let token = jsonwebtoken::encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)?;
        Ok(token)
    }

    /// Verify signature and expiry; return the embedded claims.
    pub fn verify(&self, token: &str) -> Result<SessionClaims, TokenError> {
        self.verify_at(token, Utc::now())
    }

    /// Verify against an explicit instant.
    pub fn verify_at(&self, token: &str, now: DateTime<Utc>) -> Result<SessionClaims, TokenError> {
        let claims = self.decode(token)?;
        if now >= claims.expires_at {
            return Err(TokenError::Expired);
        }
        Ok(claims)
    }

    /// Verify the signature only, accepting an expired token.
    ///
    /// Refresh-path exception: lets a client trade an expired-but-authentic
    /// token for a fresh one without re-running external verification. Must
    /// not be used on any other path.
    pub fn verify_ignoring_expiry(&self, token: &str) -> Result<SessionClaims, TokenError> {
        self.decode(token)
    }

    /// Signature-checked decode; expiry is enforced by callers so both verify
    /// flavors share one decode path.
    fn decode(&self, token: &str) -> Result<SessionClaims, TokenError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;
        validation.required_spec_claims.clear();

        let data = jsonwebtoken::decode::<SessionClaims>(token, &self.decoding, &validation)
            .map_err(|e| match e.kind() {
                jsonwebtoken::errors::ErrorKind::InvalidSignature => TokenError::BadSignature,
                _ => TokenError::Malformed,
            })?;
        Ok(data.claims)
    }
}
