//! Display name validation
//!
//! Pure functions only. Availability is not checked here: the registry
//! decides that in the same step that binds the name.

use crate::error::AppError;

/// Minimum rename length in characters
pub const MIN_NAME_LEN: usize = 3;
/// Maximum rename length in characters
pub const MAX_NAME_LEN: usize = 20;

/// Normalize a name proposed during the join handshake
///
/// Join-time names are only trimmed; the length rule applies to renames.
pub fn normalize_join_name(raw: &str) -> String {
    raw.trim().to_string()
}

/// Validate the target of a `/name` command
///
/// Trims surrounding whitespace and requires the result to be between
/// `MIN_NAME_LEN` and `MAX_NAME_LEN` characters long.
pub fn validate_rename(raw: &str) -> Result<String, AppError> {
    let name = raw.trim();
    let len = name.chars().count();
    if !(MIN_NAME_LEN..=MAX_NAME_LEN).contains(&len) {
        return Err(AppError::InvalidNameLength);
    }
    Ok(name.to_string())
}
