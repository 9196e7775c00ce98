//! Settings error types.

use thiserror::Error;

/// Errors that can occur when loading or parsing settings.
#[derive(Debug, Error)]
pub enum SettingsError {
    /// Failed to read the settings file from disk.
    #[error("failed to read settings file: {0}")]
    Io(#[from] std::io::Error),
    /// Failed to parse JSON in the settings file.
    #[error("failed to parse settings JSON: {0}")]
    Json(#[from] serde_json::Error),
    /// A settings value was out of range.
    #[error("invalid settings value: {0}")]
    InvalidValue(String),
}

impl From<chota_core::CoreError> for SettingsError {
    fn from(err: chota_core::CoreError) -> Self {
        Self::InvalidValue(err.to_string())
    }
}

/// Result type for settings operations.
pub type Result<T> = std::result::Result<T, SettingsError>;

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn json_error_display() {
        let json_err = serde_json::from_str::<serde_json::Value>("invalid").unwrap_err();
        let err = SettingsError::Json(json_err);
        assert!(err.to_string().contains("parse settings JSON"));
    }

    #[test]
    fn core_error_becomes_invalid_value() {
        let err: SettingsError =
            chota_core::CoreError::InvalidConfig("topK must be in 1..=100, got 0".into()).into();
        assert!(matches!(err, SettingsError::InvalidValue(_)));
        assert!(err.to_string().contains("topK"));
    }
}
