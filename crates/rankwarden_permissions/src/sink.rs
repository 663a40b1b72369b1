//! Delivery of user-facing messages.

use derive_more::Display;
use rankwarden_core::{IdentityId, format_console_message};
use std::sync::Mutex;
use tracing::info;

/// Who invoked an operation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Display)]
pub enum CommandSender {
    /// The server console
    #[display("console")]
    Console,
    /// A connected identity
    #[display("{name} ({id})")]
    Identity {
        /// Stable identifier
        id: IdentityId,
        /// Current display name
        name: String,
    },
}

impl CommandSender {
    /// Convenience constructor for an identity sender.
    pub fn identity(id: IdentityId, name: impl Into<String>) -> Self {
        Self::Identity {
            id,
            name: name.into(),
        }
    }

    /// Whether this is the console.
    pub fn is_console(&self) -> bool {
        matches!(self, Self::Console)
    }
}

/// Sends text to a command sender.
///
/// Delivery is fire-and-forget; the host decides how color codes render.
pub trait MessageSink: Send + Sync {
    /// Deliver `message` to `recipient`.
    fn send(&self, recipient: &CommandSender, message: &str);
}

/// Writes every message to the log instead of a live session.
#[derive(Debug, Default, Clone, Copy)]
pub struct LoggingMessageSink;

impl MessageSink for LoggingMessageSink {
    fn send(&self, recipient: &CommandSender, message: &str) {
        info!(
            recipient = %recipient,
            "{}",
            format_console_message("Rankwarden", message, false)
        );
    }
}

/// Keeps every delivered message in memory.
#[derive(Debug, Default)]
pub struct RecordingMessageSink {
    messages: Mutex<Vec<(CommandSender, String)>>,
}

impl RecordingMessageSink {
    /// Create an empty sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// All messages delivered so far, in order.
    pub fn messages(&self) -> Vec<(CommandSender, String)> {
        match self.messages.lock() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    /// Messages delivered to `recipient`, in order.
    pub fn messages_for(&self, recipient: &CommandSender) -> Vec<String> {
        self.messages()
            .into_iter()
            .filter(|(to, _)| to == recipient)
            .map(|(_, message)| message)
            .collect()
    }
}

impl MessageSink for RecordingMessageSink {
    fn send(&self, recipient: &CommandSender, message: &str) {
        let entry = (recipient.clone(), message.to_string());
        match self.messages.lock() {
            Ok(mut guard) => guard.push(entry),
            Err(poisoned) => poisoned.into_inner().push(entry),
        }
    }
}
