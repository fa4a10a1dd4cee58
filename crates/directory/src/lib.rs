//! `cohabit-directory` — persistent account/community store contracts.
//!
//! The directories are the sole writers of account and community state; every
//! other component reads through them and mutates only by calling them. The
//! contracts are async and pooled-I/O shaped so a database-backed
//! implementation can slot in behind the traits; the in-memory implementations
//! here carry the reference semantics and back dev and tests.

pub mod accounts;
pub mod communities;
pub mod error;

pub use accounts::{AccountChange, AccountDirectory, InMemoryAccountDirectory};
pub use communities::{CommunityDirectory, InMemoryCommunityDirectory};
pub use error::DirectoryError;
