//! Stream consumer.
//!
//! [`StreamConsumer::stream`] opens one request through a [`Transport`] and
//! yields [`StreamOutcome`]s: every non-empty fragment as a `Chunk`, in
//! arrival order, then exactly one terminal `Complete` or `Error`.
//!
//! [`StreamConsumer::send_stream`] is the callback form and
//! [`spawn_stream`] runs a stream on its own task behind a [`StreamHandle`].
//! Cancellation is cooperative: the token is checked at every suspend point
//! and ends the stream with [`ChatError::Cancelled`]. There is no retry and
//! no timeout.

use std::sync::Arc;

use chota_core::{Attachment, GenerationConfig, StreamSummary, Turn};
use futures::{Stream, StreamExt};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, instrument, warn};

use crate::errors::{ChatError, Result};
use crate::options::GenerationOptions;
use crate::projector::{ChatRequest, project};
use crate::stream_handler::StreamState;
use crate::transport::Transport;

/// One event of a streamed reply.
#[derive(Debug)]
pub enum StreamOutcome {
    /// A non-empty text increment.
    Chunk(String),
    /// The stream finished normally. Terminal.
    Complete(StreamSummary),
    /// The stream failed. Terminal.
    Error(ChatError),
}

impl StreamOutcome {
    /// Whether this is the last outcome of a stream.
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Chunk(_))
    }
}

/// Receiver of streamed events.
///
/// `on_complete` and `on_error` are mutually exclusive and called at most
/// once per stream.
pub trait StreamCallbacks: Send {
    /// A text increment arrived.
    fn on_chunk(&mut self, text: &str);
    /// The stream finished normally.
    fn on_complete(&mut self, summary: &StreamSummary);
    /// The stream failed.
    fn on_error(&mut self, error: &ChatError);
}

/// [`StreamCallbacks`] backed by three closures.
pub struct FnCallbacks<C, D, E> {
    on_chunk: C,
    on_complete: D,
    on_error: E,
}

impl<C, D, E> FnCallbacks<C, D, E>
where
    C: FnMut(&str) + Send,
    D: FnMut(&StreamSummary) + Send,
    E: FnMut(&ChatError) + Send,
{
    /// Wrap the three handlers.
    pub fn new(on_chunk: C, on_complete: D, on_error: E) -> Self {
        Self {
            on_chunk,
            on_complete,
            on_error,
        }
    }
}

impl<C, D, E> StreamCallbacks for FnCallbacks<C, D, E>
where
    C: FnMut(&str) + Send,
    D: FnMut(&StreamSummary) + Send,
    E: FnMut(&ChatError) + Send,
{
    fn on_chunk(&mut self, text: &str) {
        (self.on_chunk)(text);
    }

    fn on_complete(&mut self, summary: &StreamSummary) {
        (self.on_complete)(summary);
    }

    fn on_error(&mut self, error: &ChatError) {
        (self.on_error)(error);
    }
}

/// Drives requests through a [`Transport`].
#[derive(Clone)]
pub struct StreamConsumer {
    transport: Arc<dyn Transport>,
}

impl StreamConsumer {
    /// Create a consumer over the given transport.
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self { transport }
    }

    /// Lazily stream one request.
    ///
    /// Nothing happens until the returned stream is polled. An empty
    /// credential yields a single `Error(MissingCredential)` without touching
    /// the transport.
    pub fn stream(
        &self,
        credential: &str,
        request: ChatRequest,
        config: &GenerationConfig,
        cancel: CancellationToken,
    ) -> impl Stream<Item = StreamOutcome> + Send + 'static {
        let transport = Arc::clone(&self.transport);
        let credential = credential.trim().to_string();
        let options = GenerationOptions::from_config(config);

        async_stream::stream! {
            if credential.is_empty() {
                warn!("no credential available, request not sent");
                yield StreamOutcome::Error(ChatError::MissingCredential);
                return;
            }

            info!(
                model = %options.model_id,
                history = request.history.len(),
                search = options.has_search(),
                thinking = options.thinking.is_some(),
                "stream started"
            );

            // biased: prefer cancellation when both are ready
            let opened = tokio::select! {
                biased;
                () = cancel.cancelled() => Err(ChatError::Cancelled),
                opened = transport.open(&credential, &request, &options) => opened,
            };
            let mut fragments = match opened {
                Ok(fragments) => fragments,
                Err(e) => {
                    error!(category = e.category(), error = %e, "failed to open stream");
                    yield StreamOutcome::Error(e);
                    return;
                }
            };

            let mut state = StreamState::default();
            loop {
                let next = tokio::select! {
                    biased;
                    () = cancel.cancelled() => Some(Err(ChatError::Cancelled)),
                    next = fragments.next() => next,
                };
                match next {
                    Some(Ok(fragment)) => {
                        if let Some(text) = state.record(&fragment) {
                            debug!(fragment = state.fragment_count(), len = text.len(), "chunk");
                            yield StreamOutcome::Chunk(text.to_string());
                        }
                    }
                    Some(Err(e)) => {
                        error!(
                            category = e.category(),
                            error = %e,
                            delivered = state.fragment_count(),
                            "stream failed"
                        );
                        yield StreamOutcome::Error(e);
                        return;
                    }
                    None => break,
                }
            }

            let summary = state.into_summary();
            info!(
                fragments = summary.fragment_count,
                finish_reason = summary.finish_reason.as_deref().unwrap_or("none"),
                "stream complete"
            );
            yield StreamOutcome::Complete(summary);
        }
    }

    /// Project, stream and relay one message to `callbacks`.
    ///
    /// The credential is checked before projection. Every failure reaches
    /// `on_error` exactly once and is also returned.
    #[instrument(skip_all, fields(model = %config.model_id))]
    pub async fn send_stream(
        &self,
        credential: &str,
        history: &[Turn],
        new_text: &str,
        attachments: &[Attachment],
        config: &GenerationConfig,
        callbacks: &mut dyn StreamCallbacks,
        cancel: CancellationToken,
    ) -> Result<StreamSummary> {
        if credential.trim().is_empty() {
            warn!("no credential available, request not sent");
            let err = ChatError::MissingCredential;
            callbacks.on_error(&err);
            return Err(err);
        }

        let request = match project(history, new_text, attachments) {
            Ok(request) => request,
            Err(err) => {
                warn!(error = %err, "projection failed");
                callbacks.on_error(&err);
                return Err(err);
            }
        };

        relay(self.stream(credential, request, config, cancel), callbacks).await
    }
}

/// Forward outcomes to callbacks until the terminal one.
async fn relay(
    outcomes: impl Stream<Item = StreamOutcome>,
    callbacks: &mut dyn StreamCallbacks,
) -> Result<StreamSummary> {
    let mut outcomes = std::pin::pin!(outcomes);
    while let Some(outcome) = outcomes.next().await {
        match outcome {
            StreamOutcome::Chunk(text) => callbacks.on_chunk(&text),
            StreamOutcome::Complete(summary) => {
                callbacks.on_complete(&summary);
                return Ok(summary);
            }
            StreamOutcome::Error(err) => {
                callbacks.on_error(&err);
                return Err(err);
            }
        }
    }
    let err = ChatError::Task("stream ended without a terminal outcome".into());
    callbacks.on_error(&err);
    Err(err)
}

// ─────────────────────────────────────────────────────────────────────────────
// Spawned streams
// ─────────────────────────────────────────────────────────────────────────────

/// A stream running on its own task.
pub struct StreamHandle {
    chunks: mpsc::UnboundedReceiver<String>,
    cancel: CancellationToken,
    task: JoinHandle<Result<StreamSummary>>,
}

impl StreamHandle {
    /// Next text increment, or `None` once the stream has ended.
    pub async fn next_chunk(&mut self) -> Option<String> {
        self.chunks.recv().await
    }

    /// Request cancellation. The stream ends with [`ChatError::Cancelled`].
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// A clone of the cancellation token, e.g. for a signal handler.
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Wait for the terminal result. Undelivered chunks are dropped.
    pub async fn join(self) -> Result<StreamSummary> {
        match self.task.await {
            Ok(result) => result,
            Err(e) => Err(ChatError::Task(e.to_string())),
        }
    }
}

/// Forwards chunks into a channel.
struct ChannelRelay {
    tx: mpsc::UnboundedSender<String>,
}

impl StreamCallbacks for ChannelRelay {
    fn on_chunk(&mut self, text: &str) {
        // receiver may already be gone after join()
        let _ = self.tx.send(text.to_string());
    }

    fn on_complete(&mut self, _summary: &StreamSummary) {}

    fn on_error(&mut self, _error: &ChatError) {}
}

/// Run a stream on a tokio task.
pub fn spawn_stream(
    consumer: &StreamConsumer,
    credential: &str,
    request: ChatRequest,
    config: &GenerationConfig,
) -> StreamHandle {
    let cancel = CancellationToken::new();
    let (tx, chunks) = mpsc::unbounded_channel();
    let outcomes = consumer.stream(credential, request, config, cancel.clone());
    let task = tokio::spawn(async move {
        let mut relay_to = ChannelRelay { tx };
        relay(outcomes, &mut relay_to).await
    });
    StreamHandle {
        chunks,
        cancel,
        task,
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
