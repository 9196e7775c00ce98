//! Auth error types.

/// Reasons a user-supplied API key is rejected.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum KeyValidationError {
    /// Nothing but whitespace was supplied.
    #[error("API key is empty")]
    Empty,

    /// Gemini keys start with `AIza`.
    #[error("API key must start with \"AIza\"")]
    BadPrefix,

    /// Gemini keys are at least 30 characters long.
    #[error("API key is too short ({len} characters, need at least 30)")]
    TooShort {
        /// Length of the trimmed key.
        len: usize,
    },
}

/// Errors that can occur while reading or writing credentials.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// JSON serialization/deserialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// File I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A key failed shape validation.
    #[error("invalid API key: {0}")]
    InvalidKey(#[from] KeyValidationError),
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
