//! `cohabit-core` — domain foundation building blocks.
//!
//! This crate contains **pure domain** primitives (no infrastructure concerns).

pub mod account;
pub mod community;
pub mod error;
pub mod id;

pub use account::{Account, AccountStatus, Affiliation, Role};
pub use community::{Community, JoinCode, JOIN_CODE_ALPHABET, JOIN_CODE_LEN};
pub use error::ValidationError;
pub use id::{AccountId, CommunityId, SubjectId};
