//! `cohabit-membership` — identity bridge, per-request guard, and the
//! membership lifecycle state machine.
//!
//! This crate orchestrates the pure pieces from `cohabit-auth` against the
//! store contracts from `cohabit-directory`: exchanging external assertions
//! for session tokens, re-resolving principals on every request, and moving
//! accounts between communities under the single-active-membership invariant.

pub mod bridge;
pub mod code;
pub mod guard;
pub mod lifecycle;

mod validate;

pub use bridge::{AuthGrant, BridgeError, IdentityBridge, NewRegistration};
pub use code::{JoinCodeSource, RandomCodes};
pub use guard::{AuthorizationGuard, GuardError};
pub use lifecycle::{
    AccountEdit, AccountUpdated, CommunityCreated, CommunityJoined, LifecycleError,
    MembershipLifecycle, NewCommunity,
};
