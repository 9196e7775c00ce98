//! Chat error types.

use chota_core::CoreError;

/// Result type alias for chat operations.
pub type Result<T> = std::result::Result<T, ChatError>;

/// Coarse failure classes reported to callers.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    /// No credential was available; nothing was sent.
    MissingCredential,
    /// Anything that went wrong building, sending or reading the request.
    TransportOrServiceFailure,
    /// The caller cancelled the stream.
    Cancelled,
}

/// Errors that can occur while projecting, sending or streaming a chat request.
#[derive(Debug, thiserror::Error)]
pub enum ChatError {
    /// The credential provider yielded nothing.
    #[error("missing API credential")]
    MissingCredential,

    /// An attachment could not be turned into an inline payload.
    #[error("attachment ({mime_type}) is not a data URI")]
    InvalidAttachment {
        /// MIME type of the offending attachment.
        mime_type: String,
    },

    /// The request could not be built.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// A response payload was not valid JSON for its shape.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The response stream broke mid-read.
    #[error("stream error: {0}")]
    Stream(String),

    /// Rate limited by the service.
    #[error("rate limited: {message}")]
    RateLimited {
        /// Suggested retry delay in milliseconds, if the service sent one.
        retry_after_ms: Option<u64>,
        /// Error description.
        message: String,
    },

    /// The service rejected the request.
    #[error("API error ({status}): {message}")]
    Api {
        /// HTTP status (or the envelope's code for in-stream errors).
        status: u16,
        /// Error description.
        message: String,
        /// Service status string such as `INVALID_ARGUMENT`.
        code: Option<String>,
    },

    /// The stream was cancelled by the caller.
    #[error("stream cancelled")]
    Cancelled,

    /// The streaming task ended abnormally.
    #[error("stream task failed: {0}")]
    Task(String),
}

impl ChatError {
    /// Which caller-facing failure class this belongs to.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::MissingCredential => ErrorKind::MissingCredential,
            Self::Cancelled => ErrorKind::Cancelled,
            _ => ErrorKind::TransportOrServiceFailure,
        }
    }

    /// Error category string for logs.
    pub fn category(&self) -> &'static str {
        match self {
            Self::MissingCredential => "credential",
            Self::InvalidAttachment { .. } | Self::InvalidRequest(_) => "request",
            Self::Http(_) => "network",
            Self::Json(_) => "parse",
            Self::Stream(_) => "stream",
            Self::RateLimited { .. } => "rate_limit",
            Self::Api { .. } => "api",
            Self::Cancelled => "cancelled",
            Self::Task(_) => "internal",
        }
    }
}

impl From<CoreError> for ChatError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::InvalidAttachment { mime_type } => Self::InvalidAttachment { mime_type },
            other => Self::InvalidRequest(other.to_string()),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
