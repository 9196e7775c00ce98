//! One-shot subcommands.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{Context, Result};
use chota_auth::{
    CredentialProvider, EnvCredential, clear_api_key, default_credential_chain, load_api_key,
    save_api_key, validate_api_key,
};
use chota_core::text::truncate_str;
use chota_core::{AVAILABLE_MODELS, GenerationConfig, find_model};
use chota_llm::{CancellationToken, ChatError, ChatSession, ErrorKind, GeminiTransport};
use chota_settings::ChotaSettings;
use tracing::info;

use crate::args::{GenerationArgs, KeyAction};
use crate::attach::load_attachment;
use crate::output::TerminalPrinter;

/// A session wired to the stored-then-env credential chain.
pub fn build_session(settings: &ChotaSettings, config: GenerationConfig) -> ChatSession {
    ChatSession::new(
        config,
        Arc::new(default_credential_chain()),
        Arc::new(GeminiTransport::new(settings.api.base_url.clone())),
    )
}

/// Cancel `cancel` on the next Ctrl-C.
pub fn cancel_on_ctrl_c(cancel: &CancellationToken) -> tokio::task::JoinHandle<()> {
    let cancel = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            cancel.cancel();
        }
    })
}

/// `chota ask`.
///
/// A failed reply is reported by the printer and turned into the exit code.
pub async fn ask(
    settings: &ChotaSettings,
    prompt: &str,
    paths: &[PathBuf],
    generation: &GenerationArgs,
) -> Result<ExitCode> {
    let config = generation.apply(&settings.generation)?;
    let attachments = paths
        .iter()
        .map(|p| load_attachment(p))
        .collect::<Result<Vec<_>>>()?;

    let mut session = build_session(settings, config);
    let mut printer = TerminalPrinter::new(std::io::stdout());
    let cancel = CancellationToken::new();
    let watcher = cancel_on_ctrl_c(&cancel);

    let result = session
        .send_cancellable(prompt, attachments, &mut printer, cancel)
        .await;
    watcher.abort();

    Ok(match result {
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => ExitCode::from(exit_status(&e)),
    })
}

/// Process status for a failed reply: 130 for Ctrl-C, 1 otherwise.
fn exit_status(error: &ChatError) -> u8 {
    match error.kind() {
        ErrorKind::Cancelled => 130,
        ErrorKind::MissingCredential | ErrorKind::TransportOrServiceFailure => 1,
    }
}

/// `chota key ...`.
pub fn key(action: &KeyAction, auth_path: &Path) -> Result<()> {
    match action {
        KeyAction::Set { key } => {
            let key = validate_api_key(key)?;
            save_api_key(auth_path, key)
                .with_context(|| format!("failed to write {}", auth_path.display()))?;
            info!(path = %auth_path.display(), "API key stored");
            println!("Saved key {} to {}", mask_key(key), auth_path.display());
        }
        KeyAction::Clear => {
            clear_api_key(auth_path)
                .with_context(|| format!("failed to update {}", auth_path.display()))?;
            println!("Stored key removed.");
        }
        KeyAction::Status => {
            print!("{}", key_status(auth_path, &EnvCredential));
            std::io::stdout().flush()?;
        }
    }
    Ok(())
}

/// Where the key would come from, without revealing it.
fn key_status(auth_path: &Path, env: &dyn CredentialProvider) -> String {
    match (load_api_key(auth_path), env.credential()) {
        (Some(stored), _) => format!(
            "Using stored key {} ({})\n",
            mask_key(&stored),
            auth_path.display()
        ),
        (None, Some(env_key)) => format!("Using key {} from environment\n", mask_key(&env_key)),
        (None, None) => "No API key configured.\n".to_string(),
    }
}

/// `AIza…` style preview showing only the first four characters.
fn mask_key(key: &str) -> String {
    format!("{}…", truncate_str(key, 4))
}

/// `chota models`.
pub fn models(current: &str) {
    print!("{}", model_listing(current));
}

/// The registry, with the active model starred. An unregistered active id
/// is listed last.
fn model_listing(current: &str) -> String {
    let mut out = String::new();
    for model in &AVAILABLE_MODELS {
        let marker = if model.id == current { "*" } else { " " };
        out.push_str(&format!("{marker} {:<28} {}\n", model.id, model.name));
    }
    if find_model(current).is_none() {
        out.push_str(&format!("* {current:<28} (custom)\n"));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use chota_auth::StaticCredential;

    const KEY: &str = "AIzaSyTestKey0123456789abcdefghij";

    #[test]
    fn cancelled_reply_exits_130() {
        assert_eq!(exit_status(&ChatError::Cancelled), 130);
        assert_eq!(exit_status(&ChatError::MissingCredential), 1);
        assert_eq!(exit_status(&ChatError::Stream("reset".into())), 1);
    }

    #[test]
    fn listing_stars_the_active_model() {
        let listing = model_listing("gemini-3-pro-preview");
        let starred: Vec<&str> = listing.lines().filter(|l| l.starts_with('*')).collect();
        assert_eq!(starred.len(), 1);
        assert!(starred[0].contains("Gemini 3.0 Pro Preview"));
        assert_eq!(listing.lines().count(), AVAILABLE_MODELS.len());
    }

    #[test]
    fn listing_shows_unregistered_model() {
        let listing = model_listing("gemini-experimental");
        let last = listing.lines().last().unwrap();
        assert!(last.starts_with("* gemini-experimental "));
        assert!(last.ends_with("(custom)"));
        assert_eq!(listing.lines().count(), AVAILABLE_MODELS.len() + 1);
    }

    #[test]
    fn mask_key_shows_prefix_only() {
        assert_eq!(mask_key(KEY), "AIza…");
        assert_eq!(mask_key("ab"), "ab…");
    }

    #[test]
    fn status_prefers_stored_key() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("auth.json");
        key(&KeyAction::Set { key: KEY.into() }, &path).unwrap();

        let status = key_status(&path, &StaticCredential::new("AIzaEnv"));
        assert!(status.starts_with("Using stored key AIza…"));
        assert!(!status.contains(KEY));
    }

    #[test]
    fn status_falls_back_to_env() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("auth.json");
        let status = key_status(&path, &StaticCredential::new("AIzaEnvKey"));
        assert_eq!(status, "Using key AIza… from environment\n");
    }

    #[test]
    fn status_without_any_key() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("auth.json");
        assert_eq!(
            key_status(&path, &StaticCredential::none()),
            "No API key configured.\n"
        );
    }

    #[test]
    fn set_rejects_malformed_key() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("auth.json");
        assert!(key(&KeyAction::Set { key: "sk-nope".into() }, &path).is_err());
        assert!(!path.exists());
    }

    #[test]
    fn clear_removes_stored_key() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("auth.json");
        key(&KeyAction::Set { key: KEY.into() }, &path).unwrap();
        key(&KeyAction::Clear, &path).unwrap();
        assert!(load_api_key(&path).is_none());
    }
}
