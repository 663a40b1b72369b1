//! User-facing message formatting.
//!
//! Messages use `&`-prefixed legacy color codes; the host translates them.

use crate::Rank;

/// Sent when a caller's rank is not allowed to run a command.
pub const NO_PERMISSIONS_ERROR: &str =
    "&4&lERROR &r&8// &7Permissions &8// &7You do not have permission to execute this command.";

/// Sent when an unexpected failure prevented handling a request.
pub const UNKNOWN_ERROR: &str =
    "&4&lERROR &r&8// &7Core &8// &7An unknown error occurred. Please contact an administrator.";

/// Format a chat message from a named service.
///
/// # Examples
///
/// ```
/// use rankwarden_core::format_chat_message;
///
/// assert_eq!(
///     format_chat_message("Core", "Welcome back", false),
///     "&3&lCore&r &8// &7Welcome back"
/// );
/// assert_eq!(
///     format_chat_message("Core", "Oops", true),
///     "&4&lERROR &r&8// &7Core &8// &7Oops"
/// );
/// ```
pub fn format_chat_message(sender: &str, message: &str, error: bool) -> String {
    if error {
        format!("&4&lERROR &r&8// &7{} &8// &7{}", sender, message)
    } else {
        format!("&3&l{}&r &8// &7{}", sender, message)
    }
}

/// Format a message for the server console.
pub fn format_console_message(sender: &str, message: &str, error: bool) -> String {
    if error {
        format!("[{}] ERROR: {}", sender, message)
    } else {
        format!("[{}] {}", sender, message)
    }
}

/// Format a usage hint for a command invoked with bad arguments.
pub fn format_command_usage(usage: &str) -> String {
    format_chat_message("Usage", usage, true)
}

/// Render a chat line prefixed with the sender's rank.
///
/// # Examples
///
/// ```
/// use rankwarden_core::{Rank, format_chat_line};
///
/// assert_eq!(
///     format_chat_line(Rank::MvpPlus, "Steve", "hi"),
///     "&b&lMVP+ &r&7Steve &r&7// hi"
/// );
/// ```
pub fn format_chat_line(rank: Rank, name: &str, message: &str) -> String {
    format!(
        "&{}&l{} &r&7{} &r&7// {}",
        rank.color_code(),
        rank.display_name(),
        name,
        message
    )
}
