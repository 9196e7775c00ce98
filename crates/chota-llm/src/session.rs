//! Conversation state around the stream consumer.
//!
//! A [`ChatSession`] owns the ordered turns of one conversation. Sending a
//! message appends the user turn and a streaming model placeholder, projects
//! the turns that came before, and fills the placeholder as chunks arrive.
//! `send` takes `&mut self`, so one session never runs two streams at once.

use std::sync::Arc;

use chota_auth::CredentialProvider;
use chota_core::{Attachment, GenerationConfig, StreamSummary, Turn, TurnStatus};
use tokio_util::sync::CancellationToken;
use tracing::{info, instrument, warn};

use crate::consumer::{StreamCallbacks, StreamConsumer};
use crate::errors::{ChatError, Result};
use crate::transport::Transport;

/// One conversation with the model.
pub struct ChatSession {
    turns: Vec<Turn>,
    config: GenerationConfig,
    credentials: Arc<dyn CredentialProvider>,
    consumer: StreamConsumer,
}

impl ChatSession {
    /// Start an empty conversation.
    pub fn new(
        config: GenerationConfig,
        credentials: Arc<dyn CredentialProvider>,
        transport: Arc<dyn Transport>,
    ) -> Self {
        Self {
            turns: Vec::new(),
            config,
            credentials,
            consumer: StreamConsumer::new(transport),
        }
    }

    /// Turns so far, oldest first.
    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }

    /// Config used by the next `send`.
    pub fn config(&self) -> &GenerationConfig {
        &self.config
    }

    /// Replace the config used by subsequent sends.
    pub fn set_config(&mut self, config: GenerationConfig) {
        self.config = config;
    }

    /// Whether the last turn is a reply still being streamed.
    ///
    /// Only observable when a `send` future was dropped before finishing.
    pub fn is_streaming(&self) -> bool {
        self.turns
            .last()
            .is_some_and(|t| t.status == TurnStatus::Streaming)
    }

    /// Clear the conversation.
    pub fn new_chat(&mut self) {
        info!(dropped = self.turns.len(), "new chat");
        self.turns.clear();
    }

    /// Send a message and stream the reply.
    pub async fn send(
        &mut self,
        text: &str,
        attachments: Vec<Attachment>,
        callbacks: &mut dyn StreamCallbacks,
    ) -> Result<StreamSummary> {
        self.send_cancellable(text, attachments, callbacks, CancellationToken::new())
            .await
    }

    /// [`send`](Self::send) with a caller-owned cancellation token.
    #[instrument(skip_all, fields(model = %self.config.model_id, turns = self.turns.len()))]
    pub async fn send_cancellable(
        &mut self,
        text: &str,
        attachments: Vec<Attachment>,
        callbacks: &mut dyn StreamCallbacks,
        cancel: CancellationToken,
    ) -> Result<StreamSummary> {
        self.abandon_stale_placeholder();

        let history_len = self.turns.len();
        self.turns.push(Turn::user(text, attachments.clone()));
        self.turns.push(Turn::placeholder());

        let credential = self.credentials.credential().unwrap_or_default();

        let (history, pending) = self.turns.split_at_mut(history_len);
        let Some(placeholder) = pending.last_mut() else {
            return Err(ChatError::Task("placeholder missing".into()));
        };
        let mut relay = PlaceholderRelay {
            turn: placeholder,
            inner: callbacks,
        };

        self.consumer
            .send_stream(
                &credential,
                history,
                text,
                &attachments,
                &self.config,
                &mut relay,
                cancel,
            )
            .await
    }

    /// Mark a placeholder left behind by a dropped `send` as failed.
    fn abandon_stale_placeholder(&mut self) {
        if let Some(turn) = self.turns.last_mut() {
            if turn.status == TurnStatus::Streaming {
                warn!(turn_id = %turn.id, "previous reply was abandoned mid-stream");
                turn.fail();
            }
        }
    }
}

/// Writes chunks into the placeholder turn, then forwards to the caller.
struct PlaceholderRelay<'a> {
    turn: &'a mut Turn,
    inner: &'a mut dyn StreamCallbacks,
}

impl StreamCallbacks for PlaceholderRelay<'_> {
    fn on_chunk(&mut self, text: &str) {
        if let Err(e) = self.turn.append_text(text) {
            warn!(error = %e, "dropping chunk for sealed turn");
        }
        self.inner.on_chunk(text);
    }

    fn on_complete(&mut self, summary: &StreamSummary) {
        self.turn.complete();
        self.inner.on_complete(summary);
    }

    fn on_error(&mut self, error: &ChatError) {
        self.turn.fail();
        self.inner.on_error(error);
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::GenerationOptions;
    use crate::projector::{ChatRequest, MessagePayload};
    use crate::stream_handler::Fragment;
    use crate::transport::FragmentStream;
    use assert_matches::assert_matches;
    use async_trait::async_trait;
    use chota_auth::StaticCredential;
    use chota_core::Role;
    use std::sync::Mutex;

    /// Echoes a fixed reply, optionally failing after it.
    struct EchoTransport {
        reply: Vec<&'static str>,
        fail_after: bool,
        seen: Mutex<Vec<(ChatRequest, GenerationOptions)>>,
    }

    impl EchoTransport {
        fn new(reply: Vec<&'static str>, fail_after: bool) -> Arc<Self> {
            Arc::new(Self {
                reply,
                fail_after,
                seen: Mutex::new(Vec::new()),
            })
        }
    }

    #[async_trait]
    impl Transport for EchoTransport {
        async fn open(
            &self,
            _credential: &str,
            request: &ChatRequest,
            options: &GenerationOptions,
        ) -> Result<FragmentStream> {
            self.seen
                .lock()
                .unwrap()
                .push((request.clone(), options.clone()));
            let mut items: Vec<Result<Fragment>> =
                self.reply.iter().map(|t| Ok(Fragment::text(*t))).collect();
            if self.fail_after {
                items.push(Err(ChatError::Stream("connection reset".into())));
            }
            Ok(Box::pin(futures::stream::iter(items)))
        }
    }

    #[derive(Default)]
    struct Counts {
        chunks: Vec<String>,
        completes: usize,
        errors: usize,
    }

    impl StreamCallbacks for Counts {
        fn on_chunk(&mut self, text: &str) {
            self.chunks.push(text.to_string());
        }
        fn on_complete(&mut self, _summary: &StreamSummary) {
            self.completes += 1;
        }
        fn on_error(&mut self, _error: &ChatError) {
            self.errors += 1;
        }
    }

    fn session(transport: Arc<EchoTransport>) -> ChatSession {
        ChatSession::new(
            GenerationConfig::default(),
            Arc::new(StaticCredential::new("key")),
            transport,
        )
    }

    #[tokio::test]
    async fn send_appends_user_and_completed_reply() {
        let transport = EchoTransport::new(vec!["Hel", "lo"], false);
        let mut chat = session(transport);
        let mut counts = Counts::default();

        let summary = chat.send("hi", vec![], &mut counts).await.unwrap();

        assert_eq!(summary.text, "Hello");
        assert_eq!(counts.chunks, vec!["Hel", "lo"]);
        assert_eq!((counts.completes, counts.errors), (1, 0));

        let turns = chat.turns();
        assert_eq!(turns.len(), 2);
        assert_eq!(turns[0].role, Role::User);
        assert_eq!(turns[0].text, "hi");
        assert_eq!(turns[1].role, Role::Model);
        assert_eq!(turns[1].text, "Hello");
        assert_eq!(turns[1].status, TurnStatus::Complete);
        assert!(!chat.is_streaming());
    }

    #[tokio::test]
    async fn history_excludes_new_turn_and_placeholder() {
        let transport = EchoTransport::new(vec!["ok"], false);
        let mut chat = session(transport.clone());
        let mut counts = Counts::default();

        let _ = chat.send("first", vec![], &mut counts).await.unwrap();
        let _ = chat.send("second", vec![], &mut counts).await.unwrap();

        let seen = transport.seen.lock().unwrap();
        assert!(seen[0].0.history.is_empty());
        assert_eq!(seen[1].0.history.len(), 2);
        assert_eq!(seen[1].0.history[0].role, "user");
        assert_eq!(seen[1].0.history[1].role, "model");
        assert_eq!(seen[1].0.message, MessagePayload::Text("second".into()));
    }

    #[tokio::test]
    async fn failure_keeps_partial_text() {
        let transport = EchoTransport::new(vec!["partial"], true);
        let mut chat = session(transport);
        let mut counts = Counts::default();

        let result = chat.send("hi", vec![], &mut counts).await;

        assert_matches!(result, Err(ChatError::Stream(_)));
        assert_eq!((counts.completes, counts.errors), (0, 1));
        let reply = &chat.turns()[1];
        assert_eq!(reply.status, TurnStatus::Failed);
        assert_eq!(reply.text, "partial");
    }

    #[tokio::test]
    async fn missing_credential_fails_placeholder() {
        let transport = EchoTransport::new(vec!["never"], false);
        let mut chat = ChatSession::new(
            GenerationConfig::default(),
            Arc::new(StaticCredential::none()),
            transport.clone(),
        );
        let mut counts = Counts::default();

        let result = chat.send("hi", vec![], &mut counts).await;

        assert_matches!(result, Err(ChatError::MissingCredential));
        assert_eq!(chat.turns()[1].status, TurnStatus::Failed);
        assert!(chat.turns()[1].text.is_empty());
        assert!(transport.seen.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn attachments_are_kept_on_the_user_turn() {
        let transport = EchoTransport::new(vec!["a cat"], false);
        let mut chat = session(transport.clone());
        let mut counts = Counts::default();
        let image = Attachment::from_bytes(b"foo", "image/png");

        let _ = chat.send("", vec![image.clone()], &mut counts).await.unwrap();

        assert_eq!(chat.turns()[0].attachments, vec![image]);
        let seen = transport.seen.lock().unwrap();
        assert_matches!(&seen[0].0.message, MessagePayload::Parts(parts) if parts.len() == 1);
    }

    #[tokio::test]
    async fn set_config_applies_to_next_send() {
        let transport = EchoTransport::new(vec!["ok"], false);
        let mut chat = session(transport.clone());
        let mut counts = Counts::default();

        chat.set_config(GenerationConfig {
            model_id: "gemini-3-pro-preview".into(),
            use_search: true,
            ..Default::default()
        });
        let _ = chat.send("hi", vec![], &mut counts).await.unwrap();

        let seen = transport.seen.lock().unwrap();
        assert_eq!(seen[0].1.model_id, "gemini-3-pro-preview");
        assert!(seen[0].1.has_search());
        assert_eq!(chat.config().model_id, "gemini-3-pro-preview");
    }

    #[tokio::test]
    async fn new_chat_clears_turns() {
        let transport = EchoTransport::new(vec!["ok"], false);
        let mut chat = session(transport);
        let mut counts = Counts::default();
        let _ = chat.send("hi", vec![], &mut counts).await.unwrap();

        chat.new_chat();
        assert!(chat.turns().is_empty());
    }

    #[tokio::test]
    async fn cancelled_send_marks_reply_failed() {
        let transport = EchoTransport::new(vec!["x"], false);
        let mut chat = session(transport);
        let mut counts = Counts::default();
        let cancel = CancellationToken::new();
        cancel.cancel();

        let result = chat
            .send_cancellable("hi", vec![], &mut counts, cancel)
            .await;

        assert_matches!(result, Err(ChatError::Cancelled));
        assert_eq!(chat.turns()[1].status, TurnStatus::Failed);
    }

    #[tokio::test]
    async fn dropped_send_is_failed_on_next_send() {
        let transport = EchoTransport::new(vec!["ok"], false);
        let mut chat = session(transport);
        let mut counts = Counts::default();

        {
            let fut = chat.send("abandoned", vec![], &mut counts);
            drop(fut);
        }
        // nothing was polled, so nothing was appended
        assert!(chat.turns().is_empty());

        chat.turns.push(Turn::placeholder());
        assert!(chat.is_streaming());
        let _ = chat.send("hi", vec![], &mut counts).await.unwrap();
        assert_eq!(chat.turns()[0].status, TurnStatus::Failed);
        assert!(!chat.is_streaming());
    }
}
