//! Shape checks for user-supplied Gemini API keys.

use crate::errors::KeyValidationError;

/// Required key prefix.
pub const KEY_PREFIX: &str = "AIza";

/// Minimum key length in characters.
pub const MIN_KEY_LEN: usize = 30;

/// Validate a key typed in by a user and return it trimmed.
pub fn validate_api_key(key: &str) -> Result<&str, KeyValidationError> {
    let key = key.trim();
    if key.is_empty() {
        return Err(KeyValidationError::Empty);
    }
    if !key.starts_with(KEY_PREFIX) {
        return Err(KeyValidationError::BadPrefix);
    }
    let len = key.chars().count();
    if len < MIN_KEY_LEN {
        return Err(KeyValidationError::TooShort { len });
    }
    Ok(key)
}
