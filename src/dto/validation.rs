//! Validation helpers for DTOs.

use validator::ValidationError;

use crate::state::roster::{MAX_NAME_LENGTH, normalize_name};

/// Validates that a player name is not blank once trimmed and fits the roster limit.
///
/// # Examples
///
/// ```ignore
/// validate_player_name("Ana")   // Ok
/// validate_player_name("   ")   // Err - blank
/// ```
pub fn validate_player_name(name: &str) -> Result<(), ValidationError> {
    if normalize_name(name).is_some() {
        return Ok(());
    }

    let mut err = ValidationError::new("player_name");
    err.message = Some(
        format!("Player name must contain between 1 and {MAX_NAME_LENGTH} visible characters")
            .into(),
    );
    Err(err)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_player_name_valid() {
        assert!(validate_player_name("Ana").is_ok());
        assert!(validate_player_name("  João Pedro ").is_ok());
    }

    #[test]
    fn test_validate_player_name_invalid() {
        assert!(validate_player_name("").is_err());
        assert!(validate_player_name(" \t ").is_err());
        assert!(validate_player_name(&"a".repeat(MAX_NAME_LENGTH + 1)).is_err());
    }
}
