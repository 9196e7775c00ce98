//! Stream chunk handling.
//!
//! Turns each decoded [`GeminiStreamChunk`] into a [`Fragment`] and
//! accumulates fragments into the [`StreamSummary`] reported at completion.

use chota_core::{StreamSummary, TokenUsage};

use crate::errors::ChatError;
use crate::types::{GeminiPart, GeminiStreamChunk};

/// One increment of a streamed reply.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Fragment {
    /// User-visible text in this increment (may be empty).
    pub text: String,
    /// Finish reason, present on the last increment.
    pub finish_reason: Option<String>,
    /// Token usage, when the chunk carried it.
    pub usage: Option<TokenUsage>,
}

impl Fragment {
    /// A text-only fragment.
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Self::default()
        }
    }
}

/// Convert a decoded chunk into a fragment.
///
/// The text is the concatenation of the first candidate's non-thought text
/// parts. A chunk carrying an `error` object is a failure.
pub fn fragment_from_chunk(chunk: &GeminiStreamChunk) -> Result<Fragment, ChatError> {
    if let Some(ref error) = chunk.error {
        return Err(ChatError::Api {
            status: u16::try_from(error.code).unwrap_or(0),
            message: error.message.clone(),
            code: error.status.clone(),
        });
    }

    let usage = chunk.usage_metadata.as_ref().map(|u| TokenUsage {
        prompt_tokens: u.prompt_token_count,
        candidates_tokens: u.candidates_token_count,
        total_tokens: u.total_token_count,
    });

    let Some(candidate) = chunk.candidates.as_ref().and_then(|c| c.first()) else {
        return Ok(Fragment {
            usage,
            ..Fragment::default()
        });
    };

    let text = candidate
        .content
        .iter()
        .flat_map(|content| content.parts.iter())
        .filter_map(|part| match part {
            GeminiPart::Text { text, thought } if *thought != Some(true) => Some(text.as_str()),
            _ => None,
        })
        .collect::<String>();

    Ok(Fragment {
        text,
        finish_reason: candidate.finish_reason.clone(),
        usage,
    })
}

/// State accumulated across fragments within a single stream.
#[derive(Debug, Default)]
pub struct StreamState {
    text: String,
    fragment_count: usize,
    finish_reason: Option<String>,
    usage: Option<TokenUsage>,
}

impl StreamState {
    /// Record a fragment. Returns its text when non-empty.
    pub fn record<'f>(&mut self, fragment: &'f Fragment) -> Option<&'f str> {
        if fragment.finish_reason.is_some() {
            self.finish_reason.clone_from(&fragment.finish_reason);
        }
        if fragment.usage.is_some() {
            self.usage = fragment.usage;
        }
        if fragment.text.is_empty() {
            return None;
        }
        self.text.push_str(&fragment.text);
        self.fragment_count += 1;
        Some(&fragment.text)
    }

    /// Number of non-empty fragments seen so far.
    pub fn fragment_count(&self) -> usize {
        self.fragment_count
    }

    /// Finish the stream.
    pub fn into_summary(self) -> StreamSummary {
        StreamSummary {
            text: self.text,
            fragment_count: self.fragment_count,
            finish_reason: self.finish_reason,
            usage: self.usage,
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use serde_json::json;

    fn chunk(value: serde_json::Value) -> GeminiStreamChunk {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn text_parts_are_concatenated() {
        let c = chunk(json!({"candidates": [{"content": {"parts": [{"text": "Hel"}, {"text": "lo"}]}}]}));
        assert_eq!(fragment_from_chunk(&c).unwrap().text, "Hello");
    }

    #[test]
    fn thought_parts_are_skipped() {
        let c = chunk(json!({"candidates": [{"content": {"parts": [
            {"text": "let me think", "thought": true},
            {"text": "Answer"}
        ]}}]}));
        assert_eq!(fragment_from_chunk(&c).unwrap().text, "Answer");
    }

    #[test]
    fn finish_and_usage_are_carried() {
        let c = chunk(json!({
            "candidates": [{"content": {"parts": []}, "finishReason": "STOP"}],
            "usageMetadata": {"promptTokenCount": 10, "candidatesTokenCount": 5, "totalTokenCount": 15}
        }));
        let fragment = fragment_from_chunk(&c).unwrap();
        assert!(fragment.text.is_empty());
        assert_eq!(fragment.finish_reason.as_deref(), Some("STOP"));
        assert_eq!(fragment.usage.unwrap().total_tokens, 15);
    }

    #[test]
    fn chunk_without_candidates_is_empty() {
        let fragment = fragment_from_chunk(&GeminiStreamChunk::default()).unwrap();
        assert_eq!(fragment, Fragment::default());
    }

    #[test]
    fn in_stream_error_fails() {
        let c = chunk(json!({"error": {"code": 503, "message": "overloaded", "status": "UNAVAILABLE"}}));
        assert_matches!(
            fragment_from_chunk(&c),
            Err(ChatError::Api { status: 503, message, code: Some(code) })
                if message == "overloaded" && code == "UNAVAILABLE"
        );
    }

    #[test]
    fn state_counts_only_non_empty_fragments() {
        let mut state = StreamState::default();
        assert_eq!(state.record(&Fragment::text("Hel")), Some("Hel"));
        assert_eq!(state.record(&Fragment::default()), None);
        assert_eq!(state.record(&Fragment::text("lo")), Some("lo"));
        let _ = state.record(&Fragment {
            finish_reason: Some("STOP".into()),
            ..Fragment::default()
        });
        assert_eq!(state.fragment_count(), 2);

        let summary = state.into_summary();
        assert_eq!(summary.text, "Hello");
        assert_eq!(summary.fragment_count, 2);
        assert_eq!(summary.finish_reason.as_deref(), Some("STOP"));
        assert!(summary.usage.is_none());
    }
}
