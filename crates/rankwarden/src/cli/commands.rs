//! CLI command definitions.

use clap::{Parser, Subcommand};
use rankwarden::{IdentityId, Rank};
use std::path::PathBuf;

/// Rankwarden - manage persisted identity ranks
#[derive(Parser, Debug)]
#[command(name = "rankwarden")]
#[command(about = "Manage persisted identity ranks", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Command to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Read configuration from this file instead of the standard locations
    #[arg(long, global = true, env = "RANKWARDEN_CONFIG")]
    pub config: Option<PathBuf>,

    /// Connection URL overriding the configured database settings
    #[arg(long, global = true, env = "DATABASE_URL", hide_env_values = true)]
    pub database_url: Option<String>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Check that the database is reachable
    Check,

    /// Create the rank table if it does not exist
    Init,

    /// Show the stored rank of an identity
    Get {
        /// Identity UUID
        identity: IdentityId,
    },

    /// Store a rank for an identity
    Set {
        /// Identity UUID
        identity: IdentityId,

        /// Rank key or display name (e.g. VIP_PLUS or VIP+)
        rank: Rank,
    },

    /// List the rank table
    Ranks {
        /// Only show ranks at or above this level
        #[arg(long, default_value_t = 0)]
        min_level: u8,
    },
}
