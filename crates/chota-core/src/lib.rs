//! # chota-core
//!
//! Shared vocabulary for the Chota chat adapter.
//!
//! - **Turns**: [`Turn`] with [`Role`], ordered [`Attachment`]s and a lifecycle [`TurnStatus`]
//! - **Attachments**: data-URI encoded inline binaries with prefix stripping
//! - **Generation config**: immutable per-request [`GenerationConfig`] snapshot
//! - **Model registry**: the selectable Gemini models
//! - **Stream summary**: what a completed stream reports back
//! - **Logging**: [`logging::init_subscriber`] for binaries

#![deny(unsafe_code)]

pub mod config;
pub mod content;
pub mod errors;
pub mod events;
pub mod ids;
pub mod logging;
pub mod models;
pub mod text;
pub mod turn;

pub use config::GenerationConfig;
pub use content::{Attachment, Role};
pub use errors::CoreError;
pub use events::{StreamSummary, TokenUsage};
pub use ids::TurnId;
pub use logging::LogFormat;
pub use models::{AVAILABLE_MODELS, ModelInfo, find_model};
pub use turn::{Turn, TurnStatus};
