//! `cohabit-auth` — pure authentication/authorization boundary.
//!
//! This crate is intentionally decoupled from HTTP and storage: token
//! issuance/verification and access decisions are in-memory computations,
//! and the external identity provider is consumed only through the
//! [`IdentityVerifier`] contract.

pub mod policy;
pub mod principal;
pub mod session;
pub mod verifier;

pub use policy::{decide, require, AccessError, Capability, Decision, ResourceRefs};
pub use principal::Principal;
pub use session::{SessionClaims, SessionIssuer, TokenError};
pub use verifier::{IdentityError, IdentityVerifier, StaticIdentityVerifier};
