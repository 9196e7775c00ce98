//! Terminal rendering of a streamed reply.

use std::io::Write;

use chota_core::StreamSummary;
use chota_llm::{ChatError, ErrorKind, StreamCallbacks};

/// Prints chunks to stdout as they arrive.
pub struct TerminalPrinter<W: Write + Send> {
    out: W,
    wrote_text: bool,
}

impl<W: Write + Send> TerminalPrinter<W> {
    /// Print to `out`.
    pub fn new(out: W) -> Self {
        Self {
            out,
            wrote_text: false,
        }
    }

    fn finish_line(&mut self) {
        if self.wrote_text {
            let _ = writeln!(self.out);
        }
        let _ = self.out.flush();
    }
}

impl<W: Write + Send> StreamCallbacks for TerminalPrinter<W> {
    fn on_chunk(&mut self, text: &str) {
        self.wrote_text |= !text.is_empty();
        let _ = write!(self.out, "{text}");
        let _ = self.out.flush();
    }

    fn on_complete(&mut self, _summary: &StreamSummary) {
        self.finish_line();
    }

    fn on_error(&mut self, error: &ChatError) {
        self.finish_line();
        eprintln!("{}", describe_error(error));
    }
}

/// One-line message for a failed reply.
pub fn describe_error(error: &ChatError) -> String {
    match error.kind() {
        ErrorKind::MissingCredential => {
            "No API key. Run `chota key set <KEY>` or set GEMINI_API_KEY.".to_string()
        }
        ErrorKind::Cancelled => "[cancelled]".to_string(),
        ErrorKind::TransportOrServiceFailure => format!("error: {error}"),
    }
}
