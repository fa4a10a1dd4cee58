//! Input normalization shared by registration and account/community updates.

use cohabit_core::ValidationError;

pub(crate) fn normalize_display_name(raw: &str) -> Result<String, ValidationError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::new(
            "display_name",
            "display name cannot be empty",
        ));
    }
    Ok(trimmed.to_string())
}

// Basic format check only.
pub(crate) fn normalize_email(raw: &str) -> Result<String, ValidationError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || !trimmed.contains('@') {
        return Err(ValidationError::new("email", "invalid email format"));
    }
    Ok(trimmed.to_lowercase())
}

pub(crate) fn normalize_community_name(raw: &str) -> Result<String, ValidationError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::new("name", "name cannot be empty"));
    }
    Ok(trimmed.to_string())
}
