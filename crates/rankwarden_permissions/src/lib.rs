//! Rank-based authorization for Rankwarden.
//!
//! This crate sits between the host's event and command dispatch and the rank
//! store:
//!
//! - [`PermissionOrchestrator`] caches the rank of every connected identity
//!   and falls back to the [`RankStore`](rankwarden_database::RankStore) on a
//!   miss
//! - [`AuthorizationGate`] admits or refuses guarded operations by rank
//! - [`PermissionEvents`] keeps the cache in step with connects, disconnects
//!   and chat
//! - [`SetRankCommand`] lets owners assign ranks by name
//!
//! # Example
//!
//! ```
//! use rankwarden_core::{IdentityId, Rank};
//! use rankwarden_database::InMemoryRankStore;
//! use rankwarden_permissions::{ConnectedIdentities, OrchestratorSlot, PermissionOrchestrator};
//! use std::sync::Arc;
//!
//! # tokio::runtime::Builder::new_current_thread().build().unwrap().block_on(async {
//! let slot = OrchestratorSlot::new();
//! let presence = Arc::new(ConnectedIdentities::new());
//! let store = Arc::new(InMemoryRankStore::new());
//!
//! let orchestrator = PermissionOrchestrator::bootstrap(&slot, store, presence.clone())
//!     .await
//!     .unwrap();
//!
//! let id = IdentityId::new_random();
//! presence.connect(id);
//! assert!(orchestrator.seed_rank(id).await.unwrap());
//! assert_eq!(orchestrator.cached_rank(&id), Some(Rank::Member));
//! # });
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod gate;
mod handlers;
mod orchestrator;
mod presence;
mod set_rank;
mod sink;

pub use gate::{
    AuthorizationGate, Denial, GateConfig, GateConfigBuilder, GateConfigBuilderError,
    GateOutcome, GuardedCommand, PLAYER_ONLY_ERROR,
};
pub use handlers::{PROFILE_ERROR, PermissionEvents};
pub use orchestrator::{OrchestratorSlot, PermissionOrchestrator};
pub use presence::{ConnectedIdentities, PresenceDirectory};
pub use set_rank::{
    IdentityResolver, ResolveError, SET_RANK_COMMAND, SetRankCommand, StaticIdentityResolver,
};
pub use sink::{CommandSender, LoggingMessageSink, MessageSink, RecordingMessageSink};

use rankwarden_error::PermissionError;

/// Result type for permission operations.
pub type PermissionResult<T> = Result<T, PermissionError>;
