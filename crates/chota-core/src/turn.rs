//! Conversation turns.
//!
//! A turn is immutable once appended to a conversation, with one exception:
//! the in-progress MODEL turn that receives streamed text. That turn starts
//! in [`TurnStatus::Streaming`] and is sealed by [`Turn::complete`] or
//! [`Turn::fail`].

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::content::{Attachment, Role};
use crate::errors::{CoreError, Result};
use crate::ids::TurnId;

/// Lifecycle of a turn.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TurnStatus {
    /// Fully written.
    #[default]
    Complete,
    /// Receiving streamed fragments.
    Streaming,
    /// The stream that was filling this turn failed.
    Failed,
}

/// One message in the conversation.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Turn {
    /// Unique ID.
    pub id: TurnId,
    /// Author.
    pub role: Role,
    /// Text content (may be empty).
    pub text: String,
    /// Ordered inline attachments.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub attachments: Vec<Attachment>,
    /// Creation time.
    pub timestamp: DateTime<Utc>,
    /// Lifecycle status.
    #[serde(default)]
    pub status: TurnStatus,
}

impl Turn {
    /// A user turn with text and attachments.
    #[must_use]
    pub fn user(text: impl Into<String>, attachments: Vec<Attachment>) -> Self {
        Self {
            id: TurnId::new(),
            role: Role::User,
            text: text.into(),
            attachments,
            timestamp: Utc::now(),
            status: TurnStatus::Complete,
        }
    }

    /// A finished model turn.
    #[must_use]
    pub fn model(text: impl Into<String>) -> Self {
        Self {
            id: TurnId::new(),
            role: Role::Model,
            text: text.into(),
            attachments: Vec::new(),
            timestamp: Utc::now(),
            status: TurnStatus::Complete,
        }
    }

    /// An empty model turn that will receive a streamed reply.
    #[must_use]
    pub fn placeholder() -> Self {
        Self {
            status: TurnStatus::Streaming,
            ..Self::model("")
        }
    }

    /// Whether the turn has neither text nor attachments.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.text.is_empty() && self.attachments.is_empty()
    }

    /// Append a streamed fragment. Only valid while streaming.
    pub fn append_text(&mut self, fragment: &str) -> Result<()> {
        if self.status != TurnStatus::Streaming {
            return Err(CoreError::TurnNotStreaming(self.id.to_string()));
        }
        self.text.push_str(fragment);
        Ok(())
    }

    /// Seal a streaming turn as complete.
    pub fn complete(&mut self) {
        if self.status == TurnStatus::Streaming {
            self.status = TurnStatus::Complete;
        }
    }

    /// Seal a streaming turn as failed, keeping whatever text arrived.
    pub fn fail(&mut self) {
        if self.status == TurnStatus::Streaming {
            self.status = TurnStatus::Failed;
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
