//! # chota
//!
//! Terminal chat client for Gemini. Loads layered settings, sets up
//! logging and dispatches to the interactive REPL or a one-shot command.

#![deny(unsafe_code)]

mod args;
mod attach;
mod commands;
mod output;
mod repl;

use std::process::ExitCode;

use anyhow::Result;
use chota_core::LogFormat;
use chota_core::logging::init_subscriber;
use chota_settings::ChotaSettings;
use clap::Parser;

use crate::args::{Cli, Command};

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    // Settings first: they carry the default log level
    let (loaded, load_error) = match chota_settings::load_settings() {
        Ok(settings) => (settings, None),
        Err(e) => (ChotaSettings::default(), Some(e)),
    };
    let level = cli.log_level.as_deref().unwrap_or(&loaded.logging.level);
    let format = if loaded.logging.json {
        LogFormat::Json
    } else {
        LogFormat::Compact
    };
    init_subscriber(level, format);
    if let Some(e) = load_error {
        tracing::warn!(error = %e, "failed to load settings, using defaults");
    }
    let _ = chota_settings::init_settings(loaded);
    let settings = chota_settings::get_settings();
    tracing::debug!(
        model = %settings.generation.model_id,
        base_url = %settings.api.base_url,
        "settings loaded"
    );

    match &cli.command {
        Command::Chat { generation } => {
            repl::run(settings, generation).await?;
            Ok(ExitCode::SUCCESS)
        }
        Command::Ask {
            prompt,
            attachments,
            generation,
        } => commands::ask(settings, prompt, attachments, generation).await,
        Command::Key { action } => {
            commands::key(action, &chota_auth::default_auth_path())?;
            Ok(ExitCode::SUCCESS)
        }
        Command::Models => {
            commands::models(&settings.generation.model_id);
            Ok(ExitCode::SUCCESS)
        }
    }
}
