//! Append-only logs: terminal output and chat transcript.

mod append_log;
mod message;

pub use append_log::AppendLog;
pub use message::{ChatMessage, LineKind, MessageRole, TerminalLine};
