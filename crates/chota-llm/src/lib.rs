//! # chota-llm
//!
//! The chat adapter core: turns in, Gemini request out, streamed text back.
//!
//! - **History projector**: [`projector`] maps [`Turn`](chota_core::Turn)s and
//!   the new message onto Gemini `contents`
//! - **Generation options**: [`GenerationOptions`] is the closed request-level
//!   config (sampling, system instruction, search tool, thinking budget)
//! - **Transport**: the [`Transport`] seam and the reqwest-backed
//!   [`GeminiTransport`] speaking `streamGenerateContent` over SSE
//! - **Stream consumer**: [`StreamConsumer`] turns a transport stream into
//!   [`StreamOutcome`]s and relays them to [`StreamCallbacks`]; [`spawn_stream`]
//!   runs one on a task behind a cancellable [`StreamHandle`]
//! - **Session**: [`ChatSession`] keeps the conversation and the in-progress reply

#![deny(unsafe_code)]

pub mod consumer;
pub mod errors;
pub mod options;
pub mod projector;
pub mod session;
pub mod sse;
pub mod stream_handler;
pub mod transport;
pub mod types;

pub use consumer::{
    FnCallbacks, StreamCallbacks, StreamConsumer, StreamHandle, StreamOutcome, spawn_stream,
};
pub use errors::{ChatError, ErrorKind, Result};
pub use options::{GenerationOptions, ThinkingDirective, ToolDirective};
pub use projector::{ChatRequest, MessagePayload, project, project_history, project_message};
pub use session::ChatSession;
pub use stream_handler::Fragment;
pub use transport::{FragmentStream, GeminiTransport, Transport};

pub use tokio_util::sync::CancellationToken;
