//! The `setrank` command.

use crate::{
    CommandSender, GateConfig, GuardedCommand, MessageSink,
    PermissionOrchestrator,
};
use async_trait::async_trait;
use rankwarden_core::{
    IdentityId, Rank, UNKNOWN_ERROR, format_chat_message, format_command_usage,
};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{error, info, instrument, warn};

/// Command token for [`SetRankCommand`].
pub const SET_RANK_COMMAND: &str = "setrank";

const SENDER: &str = "Rank";

/// Error raised by an [`IdentityResolver`] backend.
pub type ResolveError = Box<dyn std::error::Error + Send + Sync>;

/// Looks up an identity by display name.
#[async_trait]
pub trait IdentityResolver: Send + Sync {
    /// Identity currently known as `name`, or `None` if there is none.
    async fn resolve(&self, name: &str) -> Result<Option<IdentityId>, ResolveError>;
}

/// Resolver over a fixed name table. Lookups ignore ASCII case.
#[derive(Debug, Default, Clone)]
pub struct StaticIdentityResolver {
    names: HashMap<String, IdentityId>,
}

impl StaticIdentityResolver {
    /// Create an empty resolver.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `name` for `id`.
    pub fn with(mut self, name: &str, id: IdentityId) -> Self {
        self.names.insert(name.to_ascii_lowercase(), id);
        self
    }
}

#[async_trait]
impl IdentityResolver for StaticIdentityResolver {
    async fn resolve(&self, name: &str) -> Result<Option<IdentityId>, ResolveError> {
        Ok(self.names.get(&name.to_ascii_lowercase()).copied())
    }
}

/// `/setrank <player> <rank>`: assign a rank by display name.
///
/// Only OWNER may run it; the console always may.
pub struct SetRankCommand {
    gate: GateConfig,
    orchestrator: Arc<PermissionOrchestrator>,
    resolver: Arc<dyn IdentityResolver>,
    sink: Arc<dyn MessageSink>,
}

impl std::fmt::Debug for SetRankCommand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SetRankCommand")
            .field("gate", &self.gate)
            .finish_non_exhaustive()
    }
}

impl SetRankCommand {
    /// Create the command.
    pub fn new(
        orchestrator: Arc<PermissionOrchestrator>,
        resolver: Arc<dyn IdentityResolver>,
        sink: Arc<dyn MessageSink>,
    ) -> Self {
        Self {
            gate: GateConfig::new(SET_RANK_COMMAND, [Rank::Owner], true),
            orchestrator,
            resolver,
            sink,
        }
    }

    fn reply(&self, sender: &CommandSender, message: &str, error: bool) {
        self.sink
            .send(sender, &format_chat_message(SENDER, message, error));
    }
}

#[async_trait]
impl GuardedCommand for SetRankCommand {
    fn gate(&self) -> &GateConfig {
        &self.gate
    }

    #[instrument(skip_all, fields(sender = %sender))]
    async fn execute(&self, sender: &CommandSender, args: &[String]) -> bool {
        let [name, rank] = args else {
            self.sink
                .send(sender, &format_command_usage("/setrank <player> <rank>"));
            return false;
        };

        let rank = match Rank::parse(rank) {
            Ok(rank) => rank,
            Err(e) => {
                self.reply(sender, &format!("Unknown rank &c{}&7.", e.input), true);
                return false;
            }
        };

        let identity = match self.resolver.resolve(name).await {
            Ok(Some(identity)) => identity,
            Ok(None) => {
                self.reply(
                    sender,
                    &format!("Unable to locate a player with the name &c{}&7.", name),
                    true,
                );
                return false;
            }
            Err(e) => {
                error!(name = %name, error = %e, "Identity lookup failed");
                self.sink.send(sender, UNKNOWN_ERROR);
                return false;
            }
        };

        match self.orchestrator.upsert_rank(identity, rank).await {
            Ok(true) => {
                info!(identity = %identity, %rank, "Rank updated");
                self.reply(
                    sender,
                    &format!(
                        "&a{}&7's rank has successfully been updated to &a{}&7.",
                        name,
                        rank.display_name()
                    ),
                    false,
                );
                true
            }
            Ok(false) => {
                warn!(identity = %identity, %rank, "Rank store did not accept update");
                self.reply(sender, &format!("Failed to update &c{}&7's rank.", name), true);
                false
            }
            Err(e) => {
                error!(identity = %identity, %rank, error = %e, "Rank update failed");
                self.reply(sender, &format!("Failed to update &c{}&7's rank.", name), true);
                false
            }
        }
    }
}
