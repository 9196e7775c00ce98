//! Request-level generation options.
//!
//! [`GenerationOptions`] is the closed form of a [`GenerationConfig`]
//! snapshot: optional directives are explicit fields rather than loose JSON,
//! and each toggle is independent. No check is made that the chosen model
//! supports search grounding or a thinking budget.

use chota_core::GenerationConfig;

use crate::types::{
    GeminiTool, GoogleSearch, SystemInstruction, SystemPart, ThinkingConfig, WireGenerationConfig,
};

/// A tool the model may use.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ToolDirective {
    /// Ground answers in live web search.
    GoogleSearch,
}

/// Cap on internal reasoning, in tokens.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ThinkingDirective {
    /// Token budget.
    pub budget: u32,
}

/// Everything about a request except its contents.
#[derive(Clone, Debug, PartialEq)]
pub struct GenerationOptions {
    /// Model identifier.
    pub model_id: String,
    /// Sampling temperature.
    pub temperature: f64,
    /// Top-K sampling.
    pub top_k: u32,
    /// Nucleus sampling.
    pub top_p: f64,
    /// System prompt, `None` when the configured one is empty.
    pub system_instruction: Option<String>,
    /// Enabled tools.
    pub tools: Vec<ToolDirective>,
    /// Thinking budget directive.
    pub thinking: Option<ThinkingDirective>,
}

impl GenerationOptions {
    /// Build options from a config snapshot.
    pub fn from_config(config: &GenerationConfig) -> Self {
        let system_instruction =
            (!config.system_instruction.is_empty()).then(|| config.system_instruction.clone());
        let tools = if config.use_search {
            vec![ToolDirective::GoogleSearch]
        } else {
            Vec::new()
        };
        let thinking = config.use_thinking.then_some(ThinkingDirective {
            budget: config.thinking_budget,
        });

        Self {
            model_id: config.model_id.clone(),
            temperature: config.temperature,
            top_k: config.top_k,
            top_p: config.top_p,
            system_instruction,
            tools,
            thinking,
        }
    }

    /// Whether the search grounding tool is attached.
    pub fn has_search(&self) -> bool {
        self.tools.contains(&ToolDirective::GoogleSearch)
    }

    /// The `generationConfig` object.
    pub fn wire_generation_config(&self) -> WireGenerationConfig {
        WireGenerationConfig {
            temperature: self.temperature,
            top_k: self.top_k,
            top_p: self.top_p,
            thinking_config: self.thinking.map(|t| ThinkingConfig {
                thinking_budget: t.budget,
            }),
        }
    }

    /// The top-level `systemInstruction` object.
    pub fn wire_system_instruction(&self) -> Option<SystemInstruction> {
        self.system_instruction.as_ref().map(|text| SystemInstruction {
            parts: vec![SystemPart { text: text.clone() }],
        })
    }

    /// The top-level `tools` list, `None` when empty.
    pub fn wire_tools(&self) -> Option<Vec<GeminiTool>> {
        if self.tools.is_empty() {
            return None;
        }
        Some(
            self.tools
                .iter()
                .map(|tool| match tool {
                    ToolDirective::GoogleSearch => GeminiTool {
                        google_search: Some(GoogleSearch {}),
                    },
                })
                .collect(),
        )
    }
}

impl From<&GenerationConfig> for GenerationOptions {
    fn from(config: &GenerationConfig) -> Self {
        Self::from_config(config)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
