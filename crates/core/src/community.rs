//! Community record and join-code value object.

use core::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::id::{AccountId, CommunityId};

/// Length of every join code.
pub const JOIN_CODE_LEN: usize = 8;

/// Alphabet join codes are drawn from.
pub const JOIN_CODE_ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

/// Fixed-length community join code.
///
/// Codes are uppercase alphanumeric; parsing uppercases its input so codes can
/// be typed case-insensitively.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JoinCode(String);

impl JoinCode {
    /// Parse untrusted input into a join code.
    pub fn parse(raw: &str) -> Result<Self, ValidationError> {
        let normalized = raw.trim().to_ascii_uppercase();
        if normalized.len() != JOIN_CODE_LEN {
            return Err(ValidationError::new(
                "code",
                format!("join code must be {JOIN_CODE_LEN} characters"),
            ));
        }
        if !normalized.bytes().all(|b| JOIN_CODE_ALPHABET.contains(&b)) {
            return Err(ValidationError::new(
                "code",
                "join code must be alphanumeric",
            ));
        }
        Ok(Self(normalized))
    }

    /// Build a code from alphabet positions (generation path; total by
    /// construction, indices wrap into the alphabet).
    pub fn from_indices(indices: [usize; JOIN_CODE_LEN]) -> Self {
        let raw: String = indices
            .iter()
            .map(|i| JOIN_CODE_ALPHABET[i % JOIN_CODE_ALPHABET.len()] as char)
            .collect();
        Self(raw)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl core::fmt::Display for JoinCode {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for JoinCode {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// A community as stored in the directory.
///
/// # Invariants
/// - `join_code` is unique among all live communities.
/// - Created by an authenticated account, destroyed only by explicit delete.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Community {
    pub id: CommunityId,
    /// The account that created the community and holds elevated capability.
    pub owner_id: AccountId,
    pub name: String,
    pub join_code: JoinCode,
    pub created_at: DateTime<Utc>,
}

impl Community {
    pub fn new(
        id: CommunityId,
        owner_id: AccountId,
        name: String,
        join_code: JoinCode,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            owner_id,
            name,
            join_code,
            created_at: now,
        }
    }
}
