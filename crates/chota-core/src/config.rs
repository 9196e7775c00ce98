//! Per-request generation configuration.
//!
//! A [`GenerationConfig`] is an immutable snapshot handed to each request.
//! Nothing carries over between requests.

use serde::{Deserialize, Serialize};

use crate::errors::{CoreError, Result};

/// Default model.
pub const DEFAULT_MODEL_ID: &str = "gemini-2.5-flash";

/// Default system instruction.
pub const DEFAULT_SYSTEM_INSTRUCTION: &str =
    "You are a helpful, expert AI assistant. Answer concisely and accurately.";

/// Gemini API root for key-authenticated requests.
pub const DEFAULT_API_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Default thinking budget in tokens.
pub const DEFAULT_THINKING_BUDGET: u32 = 1024;

/// Largest thinking budget accepted by the service.
pub const MAX_THINKING_BUDGET: u32 = 32_768;

/// Sampling and capability settings for one request.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GenerationConfig {
    /// Model identifier.
    pub model_id: String,
    /// Sampling temperature, `0.0..=2.0`.
    pub temperature: f64,
    /// Top-K sampling, `1..=100`.
    pub top_k: u32,
    /// Nucleus sampling, `0.0..=1.0`.
    pub top_p: f64,
    /// System instruction (omitted from the request when empty).
    pub system_instruction: String,
    /// Attach the search grounding tool.
    pub use_search: bool,
    /// Attach a thinking budget directive.
    pub use_thinking: bool,
    /// Thinking budget in tokens, used only when `use_thinking` is set.
    pub thinking_budget: u32,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            model_id: DEFAULT_MODEL_ID.to_string(),
            temperature: 1.0,
            top_k: 64,
            top_p: 0.95,
            system_instruction: DEFAULT_SYSTEM_INSTRUCTION.to_string(),
            use_search: false,
            use_thinking: false,
            thinking_budget: DEFAULT_THINKING_BUDGET,
        }
    }
}

impl GenerationConfig {
    /// Check every field against its documented range.
    pub fn validate(&self) -> Result<()> {
        if self.model_id.trim().is_empty() {
            return Err(CoreError::InvalidConfig("modelId must not be empty".into()));
        }
        if !(0.0..=2.0).contains(&self.temperature) {
            return Err(CoreError::InvalidConfig(format!(
                "temperature must be in 0..=2, got {}",
                self.temperature
            )));
        }
        if !(1..=100).contains(&self.top_k) {
            return Err(CoreError::InvalidConfig(format!(
                "topK must be in 1..=100, got {}",
                self.top_k
            )));
        }
        if !(0.0..=1.0).contains(&self.top_p) {
            return Err(CoreError::InvalidConfig(format!(
                "topP must be in 0..=1, got {}",
                self.top_p
            )));
        }
        Ok(())
    }
}
