//! What a finished stream reports back.

use serde::{Deserialize, Serialize};

/// Token accounting reported by the service with the final chunk.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenUsage {
    /// Tokens in the prompt (history, message and system instruction).
    pub prompt_tokens: u32,
    /// Tokens in the generated candidates.
    pub candidates_tokens: u32,
    /// Total billed tokens.
    pub total_tokens: u32,
}

/// Summary delivered once a stream has been fully consumed.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StreamSummary {
    /// Concatenation of every fragment, in order.
    pub text: String,
    /// Number of non-empty fragments delivered.
    pub fragment_count: usize,
    /// Finish reason from the last candidate, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub finish_reason: Option<String>,
    /// Usage from the last chunk carrying it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub usage: Option<TokenUsage>,
}
