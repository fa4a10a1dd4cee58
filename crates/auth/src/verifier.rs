//! External identity provider contract.

use std::collections::HashMap;
use std::sync::RwLock;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;

use cohabit_core::SubjectId;

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum IdentityError {
    /// The assertion was once valid but is past its lifetime.
    #[error("external identity assertion expired")]
    Expired,

    /// The assertion failed verification.
    #[error("external identity assertion invalid")]
    Invalid,

    /// The provider could not be reached; the caller may retry.
    #[error("identity provider unavailable")]
    Unavailable,
}

/// Contract for the external identity provider.
///
/// The provider's verification logic lives outside this system; the core
/// consumes it only through this seam. The three failure kinds stay distinct
/// all the way to the caller — a provider outage is a retryable condition,
/// never reported as a bad assertion.
#[async_trait]
pub trait IdentityVerifier: Send + Sync {
    /// Validate an opaque external assertion, returning the stable subject id
    /// the provider vouches for.
    async fn verify(&self, assertion: &str) -> Result<SubjectId, IdentityError>;
}

/// Seeded in-process verifier for dev and tests.
///
/// Deployments supply a client for their real provider behind
/// [`IdentityVerifier`]; this one answers from a fixed assertion→subject map
/// and can simulate provider outages.
#[derive(Debug, Default)]
pub struct StaticIdentityVerifier {
    subjects: RwLock<HashMap<String, Seed>>,
    outage: AtomicBool,
}

#[derive(Debug, Clone)]
struct Seed {
    subject_id: SubjectId,
    expires_at: Option<DateTime<Utc>>,
}

impl StaticIdentityVerifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Accept `assertion` as proof of `subject_id`, indefinitely.
    pub fn grant(&self, assertion: impl Into<String>, subject_id: SubjectId) {
        self.seed(assertion, subject_id, None);
    }

    /// Accept `assertion` as proof of `subject_id` until `expires_at`.
    pub fn grant_until(
        &self,
        assertion: impl Into<String>,
        subject_id: SubjectId,
        expires_at: DateTime<Utc>,
    ) {
        self.seed(assertion, subject_id, Some(expires_at));
    }

    /// Simulate a provider outage (all verifications fail `Unavailable`).
    pub fn set_outage(&self, down: bool) {
        self.outage.store(down, Ordering::SeqCst);
    }

    fn seed(
        &self,
        assertion: impl Into<String>,
        subject_id: SubjectId,
        expires_at: Option<DateTime<Utc>>,
    ) {
        if let Ok(mut map) = self.subjects.write() {
            map.insert(
                assertion.into(),
                Seed {
                    subject_id,
                    expires_at,
                },
            );
        }
    }
}

#[async_trait]
impl IdentityVerifier for StaticIdentityVerifier {
    async fn verify(&self, assertion: &str) -> Result<SubjectId, IdentityError> {
        if self.outage.load(Ordering::SeqCst) {
            return Err(IdentityError::Unavailable);
        }

        let seed = {
            let map = self
                .subjects
                .read()
                .map_err(|_| IdentityError::Unavailable)?;
            map.get(assertion).cloned()
        };

        let seed = seed.ok_or(IdentityError::Invalid)?;
        if let Some(expires_at) = seed.expires_at {
            if Utc::now() >= expires_at {
                return Err(IdentityError::Expired);
            }
        }

        Ok(seed.subject_id)
    }
}
