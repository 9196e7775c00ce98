//! History projection.
//!
//! Maps conversation [`Turn`]s and the message being sent onto the Gemini
//! `contents` shape. The projection is pure: the same inputs always produce
//! the same request.
//!
//! - Each attachment becomes an `inlineData` part with the data-URI prefix
//!   stripped, in attachment order, followed by a text part when the text is
//!   non-empty.
//! - Historical turns with neither text nor attachments are omitted; the
//!   service rejects content entries with no parts.
//! - The new message keeps its dual form: plain text when there are no
//!   attachments, a part list otherwise.

use chota_core::{Attachment, Role, Turn};
use serde::Serialize;
use tracing::debug;

use crate::errors::Result;
use crate::types::{GeminiContent, GeminiPart};

/// The message being sent, in the form the transport distinguishes.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(untagged)]
pub enum MessagePayload {
    /// Text only, sent verbatim.
    Text(String),
    /// Inline parts followed by an optional trailing text part.
    Parts(Vec<GeminiPart>),
}

impl MessagePayload {
    /// The parts to place in the outgoing user content.
    pub fn to_parts(&self) -> Vec<GeminiPart> {
        match self {
            Self::Text(text) => vec![GeminiPart::text(text.clone())],
            Self::Parts(parts) => parts.clone(),
        }
    }

    /// The payload as a `user` content entry.
    pub fn to_content(&self) -> GeminiContent {
        GeminiContent {
            role: Role::User.as_str().to_string(),
            parts: self.to_parts(),
        }
    }
}

/// A fully projected request: prior conversation plus the new message.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ChatRequest {
    /// Prior turns as role-tagged part lists.
    pub history: Vec<GeminiContent>,
    /// The message being sent.
    pub message: MessagePayload,
}

impl ChatRequest {
    /// History followed by the new message, as sent on the wire.
    pub fn contents(&self) -> Vec<GeminiContent> {
        let mut contents = self.history.clone();
        contents.push(self.message.to_content());
        contents
    }
}

/// Project prior turns, skipping empty ones.
pub fn project_history(turns: &[Turn]) -> Result<Vec<GeminiContent>> {
    let mut contents = Vec::with_capacity(turns.len());
    for turn in turns {
        if turn.is_empty() {
            debug!(turn_id = %turn.id, role = %turn.role, "skipping empty turn");
            continue;
        }
        let mut parts = inline_parts(&turn.attachments)?;
        if !turn.text.is_empty() {
            parts.push(GeminiPart::text(turn.text.clone()));
        }
        contents.push(GeminiContent {
            role: turn.role.as_str().to_string(),
            parts,
        });
    }
    Ok(contents)
}

/// Project the message being sent.
pub fn project_message(text: &str, attachments: &[Attachment]) -> Result<MessagePayload> {
    if attachments.is_empty() {
        return Ok(MessagePayload::Text(text.to_string()));
    }
    let mut parts = inline_parts(attachments)?;
    if !text.is_empty() {
        parts.push(GeminiPart::text(text));
    }
    Ok(MessagePayload::Parts(parts))
}

/// Project history and the new message together.
///
/// Every attachment is validated before anything is returned.
pub fn project(history: &[Turn], text: &str, attachments: &[Attachment]) -> Result<ChatRequest> {
    let message = project_message(text, attachments)?;
    let history = project_history(history)?;
    Ok(ChatRequest { history, message })
}

fn inline_parts(attachments: &[Attachment]) -> Result<Vec<GeminiPart>> {
    attachments
        .iter()
        .map(|a| -> Result<GeminiPart> {
            Ok(GeminiPart::inline_data(a.mime_type.clone(), a.payload()?))
        })
        .collect()
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ChatError;
    use assert_matches::assert_matches;
    use proptest::prelude::*;
    use serde_json::json;

    fn png(payload: &str) -> Attachment {
        Attachment::from_data_uri(format!("data:image/png;base64,{payload}"), "image/png")
    }

    // ── project_message ─────────────────────────────────────────────

    #[test]
    fn text_only_message_is_plain_string() {
        let payload = project_message("hello", &[]).unwrap();
        assert_eq!(payload, MessagePayload::Text("hello".into()));
        assert_eq!(serde_json::to_value(&payload).unwrap(), json!("hello"));
    }

    #[test]
    fn empty_text_without_attachments_stays_text() {
        assert_eq!(
            project_message("", &[]).unwrap(),
            MessagePayload::Text(String::new())
        );
    }

    #[test]
    fn attachments_then_trailing_text() {
        let payload = project_message("what is this?", &[png("Zm9v"), png("YmFy")]).unwrap();
        assert_eq!(
            payload,
            MessagePayload::Parts(vec![
                GeminiPart::inline_data("image/png", "Zm9v"),
                GeminiPart::inline_data("image/png", "YmFy"),
                GeminiPart::text("what is this?"),
            ])
        );
    }

    #[test]
    fn attachments_without_text_have_no_text_part() {
        let payload = project_message("", &[png("Zm9v")]).unwrap();
        assert_eq!(
            payload,
            MessagePayload::Parts(vec![GeminiPart::inline_data("image/png", "Zm9v")])
        );
    }

    #[test]
    fn prefix_is_stripped_at_first_comma() {
        let payload = project_message("", &[png("Zm9v")]).unwrap();
        let json = serde_json::to_value(&payload).unwrap();
        assert_eq!(json[0]["inlineData"]["data"], "Zm9v");
    }

    #[test]
    fn attachment_without_comma_is_rejected() {
        let bad = Attachment::from_data_uri("Zm9v", "image/gif");
        assert_matches!(
            project_message("x", &[png("AA"), bad]),
            Err(ChatError::InvalidAttachment { mime_type }) if mime_type == "image/gif"
        );
    }

    // ── project_history ─────────────────────────────────────────────

    #[test]
    fn history_roles_and_parts() {
        let turns = vec![
            Turn::user("look", vec![png("Zm9v")]),
            Turn::model("a cat"),
            Turn::user("thanks", vec![]),
        ];
        let history = project_history(&turns).unwrap();
        assert_eq!(
            serde_json::to_value(&history).unwrap(),
            json!([
                {"role": "user", "parts": [
                    {"inlineData": {"mimeType": "image/png", "data": "Zm9v"}},
                    {"text": "look"}
                ]},
                {"role": "model", "parts": [{"text": "a cat"}]},
                {"role": "user", "parts": [{"text": "thanks"}]}
            ])
        );
    }

    #[test]
    fn history_text_only_turn_is_a_part_list() {
        let history = project_history(&[Turn::user("hi", vec![])]).unwrap();
        assert_eq!(history[0].parts, vec![GeminiPart::text("hi")]);
    }

    #[test]
    fn empty_turns_are_omitted() {
        let turns = vec![
            Turn::user("hi", vec![]),
            Turn::placeholder(),
            Turn::model(""),
            Turn::user("again", vec![]),
        ];
        let history = project_history(&turns).unwrap();
        assert_eq!(history.len(), 2);
        assert!(history.iter().all(|c| !c.parts.is_empty()));
    }

    #[test]
    fn failed_turn_with_partial_text_is_kept() {
        let mut turn = Turn::placeholder();
        turn.append_text("half an ans").unwrap();
        turn.fail();
        let history = project_history(&[turn]).unwrap();
        assert_eq!(history[0].role, "model");
        assert_eq!(history[0].parts, vec![GeminiPart::text("half an ans")]);
    }

    #[test]
    fn bad_history_attachment_fails_projection() {
        let turns = vec![Turn::user("", vec![Attachment::from_data_uri("nope", "image/png")])];
        assert_matches!(project(&turns, "hi", &[]), Err(ChatError::InvalidAttachment { .. }));
    }

    // ── ChatRequest ─────────────────────────────────────────────────

    #[test]
    fn contents_appends_message_as_user() {
        let request = project(&[Turn::model("earlier")], "now", &[]).unwrap();
        let contents = request.contents();
        assert_eq!(contents.len(), 2);
        assert_eq!(contents[1].role, "user");
        assert_eq!(contents[1].parts, vec![GeminiPart::text("now")]);
    }

    fn arb_turn() -> impl Strategy<Value = Turn> {
        (
            any::<bool>(),
            "[a-z ]{0,12}",
            proptest::collection::vec("[A-Za-z0-9+/]{0,8}", 0..3),
        )
            .prop_map(|(is_user, text, payloads)| {
                let attachments = payloads.iter().map(|p| png(p)).collect();
                if is_user {
                    Turn::user(text, attachments)
                } else {
                    Turn {
                        attachments,
                        ..Turn::model(text)
                    }
                }
            })
    }

    proptest! {
        #[test]
        fn projection_is_deterministic(
            turns in proptest::collection::vec(arb_turn(), 0..6),
            text in "[a-z ]{0,16}",
            payloads in proptest::collection::vec("[A-Za-z0-9+/]{1,8}", 0..3),
        ) {
            let attachments: Vec<Attachment> = payloads.iter().map(|p| png(p)).collect();
            let first = project(&turns, &text, &attachments).unwrap();
            let second = project(&turns, &text, &attachments).unwrap();
            prop_assert_eq!(
                serde_json::to_string(&first).unwrap(),
                serde_json::to_string(&second).unwrap()
            );
            prop_assert_eq!(first, second);
        }

        #[test]
        fn transmitted_payload_is_suffix_after_prefix(payload in "[A-Za-z0-9+/=]{0,32}") {
            let parts = project_message("", &[png(&payload)]).unwrap().to_parts();
            prop_assert_eq!(&parts[0], &GeminiPart::inline_data("image/png", payload.clone()));
        }
    }
}
