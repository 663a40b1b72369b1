//! Core data types for Rankwarden.
//!
//! This crate holds the fixed rank table, identity identifiers, and the
//! message formatting shared by the permission handlers.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod format;
mod identity;
mod rank;

pub use format::{
    NO_PERMISSIONS_ERROR, UNKNOWN_ERROR, format_chat_line, format_chat_message, format_command_usage,
    format_console_message,
};
pub use identity::{IdentityId, IdentityRankRecord, ParseIdentityError};
pub use rank::{
    ParseRankError, RANK_TABLE, Rank, RankRecord, all_ranks, rank_record,
    ranks_with_level_at_least,
};
