//! Domain error model.

use thiserror::Error;

/// Field-level validation failure.
///
/// Keep this focused on deterministic input problems the caller can fix.
/// Infrastructure concerns belong elsewhere.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("validation failed: {field}: {reason}")]
pub struct ValidationError {
    /// Which input field failed.
    pub field: &'static str,
    /// Human-readable reason, safe to surface to the caller.
    pub reason: String,
}

impl ValidationError {
    pub fn new(field: &'static str, reason: impl Into<String>) -> Self {
        Self {
            field,
            reason: reason.into(),
        }
    }
}
