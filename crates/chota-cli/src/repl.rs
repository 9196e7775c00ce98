//! Interactive chat loop.

use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::Result;
use chota_core::text::truncate_with_suffix;
use chota_core::{Attachment, GenerationConfig, find_model};
use chota_llm::{CancellationToken, ChatSession};
use chota_settings::ChotaSettings;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{debug, warn};

use crate::args::GenerationArgs;
use crate::attach::load_attachment;
use crate::commands::{build_session, cancel_on_ctrl_c};
use crate::output::TerminalPrinter;

/// A parsed input line.
#[derive(Debug, PartialEq, Eq)]
pub enum Input {
    /// Text to send.
    Message(String),
    /// `/attach <path>`.
    Attach(PathBuf),
    /// `/new`.
    NewChat,
    /// `/config`.
    ShowConfig,
    /// `/help`.
    Help,
    /// `/quit` or `/exit`.
    Quit,
    /// Blank line.
    Empty,
    /// Anything else starting with `/`.
    Unknown(String),
}

/// Classify one line of user input.
pub fn parse_input(line: &str) -> Input {
    let line = line.trim();
    if line.is_empty() {
        return Input::Empty;
    }
    let Some(command) = line.strip_prefix('/') else {
        return Input::Message(line.to_string());
    };
    let (name, rest) = command
        .split_once(char::is_whitespace)
        .map_or((command, ""), |(n, r)| (n, r.trim()));
    match name {
        "attach" if !rest.is_empty() => Input::Attach(PathBuf::from(rest)),
        "new" => Input::NewChat,
        "config" => Input::ShowConfig,
        "help" => Input::Help,
        "quit" | "exit" => Input::Quit,
        _ => Input::Unknown(line.to_string()),
    }
}

const HELP: &str = "\
/attach <path>  queue a file for the next message
/new            start a new conversation
/config         show the active generation config
/quit           leave
Ctrl-C cancels a reply in progress.";

/// `chota chat`.
pub async fn run(settings: &ChotaSettings, generation: &GenerationArgs) -> Result<()> {
    let config = generation.apply(&settings.generation)?;
    let mut session = build_session(settings, config);
    let mut queued: Vec<Attachment> = Vec::new();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    println!(
        "chota: chatting with {} (/help for commands)",
        session.config().model_id
    );

    loop {
        prompt(queued.len());
        let line = tokio::select! {
            line = lines.next_line() => line?,
            _ = tokio::signal::ctrl_c() => None,
        };
        let Some(line) = line else {
            println!();
            break;
        };

        match parse_input(&line) {
            Input::Empty => {}
            Input::Quit => break,
            Input::Help => println!("{HELP}"),
            Input::NewChat => {
                session.new_chat();
                queued.clear();
                println!("New conversation.");
            }
            Input::ShowConfig => print!("{}", describe_config(session.config())),
            Input::Attach(path) => match load_attachment(&path) {
                Ok(att) => {
                    println!("{}", describe_attachment(&path, &att));
                    queued.push(att);
                }
                Err(e) => eprintln!("{e:#}"),
            },
            Input::Unknown(cmd) => eprintln!("Unknown command {cmd}. Try /help."),
            Input::Message(text) => {
                send(&mut session, &text, std::mem::take(&mut queued)).await;
            }
        }
    }
    Ok(())
}

async fn send(session: &mut ChatSession, text: &str, attachments: Vec<Attachment>) {
    let mut printer = TerminalPrinter::new(std::io::stdout());
    let cancel = CancellationToken::new();
    let watcher = cancel_on_ctrl_c(&cancel);

    match session
        .send_cancellable(text, attachments, &mut printer, cancel)
        .await
    {
        Ok(summary) => debug!(fragments = summary.fragment_count, "reply complete"),
        Err(e) => warn!(category = e.category(), "reply failed"),
    }
    watcher.abort();
}

fn prompt(queued: usize) {
    if queued > 0 {
        print!("[{queued} attached] > ");
    } else {
        print!("> ");
    }
    let _ = std::io::stdout().flush();
}

/// Confirmation line for a queued attachment.
fn describe_attachment(path: &Path, att: &Attachment) -> String {
    format!(
        "Attached {} ({}, {} bytes encoded)",
        path.display(),
        att.mime_type,
        att.encoded_len()
    )
}

/// Human-readable dump of a config.
fn describe_config(config: &GenerationConfig) -> String {
    let system = if config.system_instruction.is_empty() {
        "(none)".to_string()
    } else {
        truncate_with_suffix(&config.system_instruction, 60, "...")
    };
    let thinking = if config.use_thinking {
        format!("on, budget {}", config.thinking_budget)
    } else {
        "off".to_string()
    };
    let model = match find_model(&config.model_id) {
        Some(info) => format!("{} ({})", info.id, info.name),
        None => config.model_id.clone(),
    };
    format!(
        "model:       {model}\ntemperature: {}\ntop-k:       {}\ntop-p:       {}\nsystem:      {system}\nsearch:      {}\nthinking:    {thinking}\n",
        config.temperature,
        config.top_k,
        config.top_p,
        if config.use_search { "on" } else { "off" },
    )
}
