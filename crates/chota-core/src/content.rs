//! Conversation roles and inline attachments.
//!
//! Attachments are stored the way a browser file reader produces them: as a
//! data URI (`data:<mime>;base64,<payload>`). Only the payload after the
//! first comma is ever transmitted.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde::{Deserialize, Serialize};

use crate::errors::{CoreError, Result};

/// Author of a turn.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// The person typing.
    User,
    /// The remote model.
    Model,
}

impl Role {
    /// Wire name used by the generative-language API.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Model => "model",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An inline binary resource attached to a turn (usually an image).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Attachment {
    /// Data-URI encoded content, prefix included.
    pub data: String,
    /// MIME type reported alongside the data.
    pub mime_type: String,
}

impl Attachment {
    /// Wrap an already-encoded data URI.
    #[must_use]
    pub fn from_data_uri(data: impl Into<String>, mime_type: impl Into<String>) -> Self {
        Self {
            data: data.into(),
            mime_type: mime_type.into(),
        }
    }

    /// Encode raw bytes as a standard-alphabet base64 data URI.
    #[must_use]
    pub fn from_bytes(bytes: &[u8], mime_type: impl Into<String>) -> Self {
        let mime_type = mime_type.into();
        let data = format!("data:{mime_type};base64,{}", STANDARD.encode(bytes));
        Self { data, mime_type }
    }

    /// The transmittable payload: everything after the first comma.
    pub fn payload(&self) -> Result<&str> {
        self.data
            .split_once(',')
            .map(|(_, payload)| payload)
            .ok_or_else(|| CoreError::InvalidAttachment {
                mime_type: self.mime_type.clone(),
            })
    }

    /// Size of the encoded data URI in bytes.
    #[must_use]
    pub fn encoded_len(&self) -> usize {
        self.data.len()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
