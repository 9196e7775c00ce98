//! Command-line surface.

use std::path::PathBuf;

use anyhow::{Context, Result};
use chota_core::GenerationConfig;
use clap::{Args, Parser, Subcommand};

/// Chat with Gemini from the terminal.
#[derive(Parser, Debug)]
#[command(name = "chota", version, about = "Chat with Gemini from the terminal")]
pub struct Cli {
    /// Log filter (overrides settings; `RUST_LOG` still wins).
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

/// Top-level commands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Interactive chat.
    Chat {
        #[command(flatten)]
        generation: GenerationArgs,
    },
    /// Send one prompt and print the reply.
    Ask {
        /// The prompt text.
        prompt: String,
        /// Files to attach, in order.
        #[arg(long = "attach", value_name = "PATH")]
        attachments: Vec<PathBuf>,
        #[command(flatten)]
        generation: GenerationArgs,
    },
    /// Manage the stored API key.
    Key {
        #[command(subcommand)]
        action: KeyAction,
    },
    /// List selectable models.
    Models,
}

/// `chota key` actions.
#[derive(Subcommand, Debug)]
pub enum KeyAction {
    /// Validate and store a key.
    Set {
        /// A Gemini API key.
        key: String,
    },
    /// Remove the stored key.
    Clear,
    /// Show where the active key comes from.
    Status,
}

/// Per-run overrides for the generation config.
#[derive(Args, Debug, Default, Clone)]
pub struct GenerationArgs {
    /// Model id.
    #[arg(long)]
    pub model: Option<String>,
    /// Sampling temperature (0-2).
    #[arg(long)]
    pub temperature: Option<f64>,
    /// Top-K sampling (1-100).
    #[arg(long)]
    pub top_k: Option<u32>,
    /// Nucleus sampling (0-1).
    #[arg(long)]
    pub top_p: Option<f64>,
    /// System instruction; pass an empty string to send none.
    #[arg(long = "system")]
    pub system_instruction: Option<String>,
    /// Ground answers with Google Search.
    #[arg(long)]
    pub search: bool,
    /// Disable search grounding for this run.
    #[arg(long, conflicts_with = "search")]
    pub no_search: bool,
    /// Request a thinking budget.
    #[arg(long)]
    pub thinking: bool,
    /// Disable thinking for this run.
    #[arg(long, conflicts_with = "thinking")]
    pub no_thinking: bool,
    /// Thinking budget in tokens.
    #[arg(long, value_parser = clap::value_parser!(u32).range(0..=32_768))]
    pub thinking_budget: Option<u32>,
}

impl GenerationArgs {
    /// Layer the flags over `base` and validate the result.
    pub fn apply(&self, base: &GenerationConfig) -> Result<GenerationConfig> {
        let mut config = base.clone();
        if let Some(model) = &self.model {
            config.model_id.clone_from(model);
        }
        if let Some(t) = self.temperature {
            config.temperature = t;
        }
        if let Some(k) = self.top_k {
            config.top_k = k;
        }
        if let Some(p) = self.top_p {
            config.top_p = p;
        }
        if let Some(s) = &self.system_instruction {
            config.system_instruction.clone_from(s);
        }
        if let Some(on) = toggle(self.search, self.no_search) {
            config.use_search = on;
        }
        if let Some(on) = toggle(self.thinking, self.no_thinking) {
            config.use_thinking = on;
        }
        if let Some(budget) = self.thinking_budget {
            config.thinking_budget = budget;
        }
        config.validate().context("invalid generation flags")?;
        Ok(config)
    }
}

/// `--x` / `--no-x` pair; `None` keeps the configured value.
fn toggle(on: bool, off: bool) -> Option<bool> {
    match (on, off) {
        (true, _) => Some(true),
        (false, true) => Some(false),
        (false, false) => None,
    }
}
