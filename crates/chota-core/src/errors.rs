//! Core error types.

use thiserror::Error;

/// Errors raised while building or mutating core values.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CoreError {
    /// An attachment's encoded form has no `data:<mime>;base64,` prefix separator.
    #[error("attachment ({mime_type}) is not a data URI: missing ',' separator")]
    InvalidAttachment {
        /// MIME type of the offending attachment.
        mime_type: String,
    },

    /// A generation config value is out of range.
    #[error("invalid generation config: {0}")]
    InvalidConfig(String),

    /// Text was appended to a turn that is no longer streaming.
    #[error("turn {0} is not streaming")]
    TurnNotStreaming(String),
}

/// Result type for core operations.
pub type Result<T> = std::result::Result<T, CoreError>;
