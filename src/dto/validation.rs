//! Validation helpers for DTOs.

use validator::ValidationError;

/// Validates that a game ID is non-empty and at most `max_len` characters.
///
/// # Examples
///
/// ```ignore
/// validate_game_id("room-42", 64) // Ok
/// validate_game_id("", 64)        // Err - empty
/// validate_game_id("abcdef", 4)   // Err - too long
/// ```
pub fn validate_game_id(id: &str, max_len: u64) -> Result<(), ValidationError> {
    if id.trim().is_empty() {
        let mut err = ValidationError::new("game_id_empty");
        err.message = Some("game ID must not be empty".into());
        return Err(err);
    }

    let len = id.chars().count() as u64;
    if len > max_len {
        let mut err = ValidationError::new("game_id_length");
        err.message =
            Some(format!("game ID must be at most {max_len} characters (got {len})").into());
        return Err(err);
    }

    if id.chars().any(char::is_control) {
        let mut err = ValidationError::new("game_id_format");
        err.message = Some("game ID must not contain control characters".into());
        return Err(err);
    }

    Ok(())
}
