//! Rankwarden - rank-based authorization backed by PostgreSQL
//!
//! Rankwarden assigns every identity one rank from a fixed, ordered table,
//! persists it in PostgreSQL and caches it for connected identities so that
//! permission checks do not wait on the database.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use rankwarden::{
//!     CommandSender, ConnectedIdentities, LoggingMessageSink, OrchestratorSlot,
//!     PermissionSystem, RankwardenConfig, StaticIdentityResolver,
//! };
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = RankwardenConfig::load()?;
//!     let system = PermissionSystem::start(
//!         &config,
//!         OrchestratorSlot::process(),
//!         Arc::new(ConnectedIdentities::new()),
//!         Arc::new(LoggingMessageSink),
//!     )
//!     .await?;
//!
//!     let setrank = system.set_rank_command(Arc::new(StaticIdentityResolver::new()));
//!     let args = vec!["Steve".to_string(), "VIP".to_string()];
//!     system
//!         .gate()
//!         .dispatch(&setrank, "setrank", &CommandSender::Console, &args)
//!         .await;
//!
//!     system.shutdown();
//!     Ok(())
//! }
//! ```
//!
//! # Architecture
//!
//! - `rankwarden_error` - Error types
//! - `rankwarden_core` - Rank table, identities, message formatting
//! - `rankwarden_database` - Pooled store client and rank stores
//! - `rankwarden_permissions` - Cache, authorization gate, event handlers
//! - `rankwarden` (this crate) - Configuration, wiring and the CLI

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod config;
mod system;
mod telemetry;

pub use config::{
    DEFAULT_CONFIG, DatabaseSection, ENV_PREFIX, PoolSection, RankwardenConfig, WorkerSection,
};
pub use system::PermissionSystem;
pub use telemetry::init_tracing;

pub use rankwarden_core::*;
pub use rankwarden_database::{
    InMemoryRankStore, PostgresRankStore, RankStore, StoreClient, StoreConfig, StoreOperation,
};
pub use rankwarden_error::*;
pub use rankwarden_permissions::*;
