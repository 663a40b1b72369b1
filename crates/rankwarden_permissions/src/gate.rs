//! Rank-based admission for guarded operations.

use crate::{CommandSender, MessageSink, PermissionOrchestrator};
use async_trait::async_trait;
use derive_getters::Getters;
use rankwarden_core::{NO_PERMISSIONS_ERROR, Rank, UNKNOWN_ERROR, format_chat_message};
use std::collections::HashSet;
use std::future::Future;
use std::sync::Arc;
use tracing::{debug, error, instrument, warn};

/// Sent to the console when it invokes an identity-only operation.
pub const PLAYER_ONLY_ERROR: &str = "This command can only be executed by a player.";

/// Who may run a guarded operation.
///
/// # Example
///
/// ```
/// use rankwarden_core::Rank;
/// use rankwarden_permissions::GateConfigBuilder;
///
/// let config = GateConfigBuilder::default()
///     .command("setrank")
///     .allowed_ranks([Rank::Owner])
///     .console_bypass(true)
///     .build()
///     .unwrap();
///
/// assert!(config.admits(Rank::Owner));
/// assert!(!config.admits(Rank::Administrator));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Getters, derive_builder::Builder)]
#[builder(setter(into))]
pub struct GateConfig {
    /// Command token the operation is invoked by
    command: String,

    /// Ranks that are admitted
    #[builder(default, setter(custom))]
    allowed_ranks: HashSet<Rank>,

    /// Whether the console skips the rank check
    #[builder(default)]
    console_bypass: bool,
}

impl GateConfigBuilder {
    /// Set the admitted ranks.
    pub fn allowed_ranks(&mut self, ranks: impl IntoIterator<Item = Rank>) -> &mut Self {
        self.allowed_ranks = Some(ranks.into_iter().collect());
        self
    }
}

impl GateConfig {
    /// Create a configuration without going through the builder.
    pub fn new(
        command: impl Into<String>,
        allowed_ranks: impl IntoIterator<Item = Rank>,
        console_bypass: bool,
    ) -> Self {
        Self {
            command: command.into(),
            allowed_ranks: allowed_ranks.into_iter().collect(),
            console_bypass,
        }
    }

    /// Whether `rank` is in the allowed set.
    pub fn admits(&self, rank: Rank) -> bool {
        self.allowed_ranks.contains(&rank)
    }

    /// Whether `token` invokes this operation. Case-insensitive.
    pub fn matches(&self, token: &str) -> bool {
        self.command.eq_ignore_ascii_case(token)
    }
}

/// Why an invocation was refused.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display)]
pub enum Denial {
    /// The console invoked an operation that needs an identity
    #[display("console may not run this command")]
    ConsoleOnlyViolation,
    /// The caller's rank could not be determined
    #[display("rank resolution failed: {}", _0)]
    ResolutionFailed(String),
    /// The caller's rank is not in the allowed set
    #[display("rank {} is not permitted", _0)]
    PermissionDenied(Rank),
}

/// Terminal state of one gated invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GateOutcome<T> {
    /// The operation ran and produced `T`
    Admitted(T),
    /// The operation did not run
    Denied(Denial),
}

impl<T> GateOutcome<T> {
    /// Whether the operation ran.
    pub fn is_admitted(&self) -> bool {
        matches!(self, Self::Admitted(_))
    }

    /// The denial, if the operation did not run.
    pub fn denial(&self) -> Option<&Denial> {
        match self {
            Self::Admitted(_) => None,
            Self::Denied(denial) => Some(denial),
        }
    }
}

/// An operation with its own gate configuration.
#[async_trait]
pub trait GuardedCommand: Send + Sync {
    /// Admission rules for this command.
    fn gate(&self) -> &GateConfig;

    /// Run the command for an admitted sender. Returns whether it succeeded.
    async fn execute(&self, sender: &CommandSender, args: &[String]) -> bool;
}

/// Admits or refuses callers based on their rank.
///
/// Every invocation ends in exactly one of: admitted and run, or denied with
/// a message sent to the caller. Expected denials log at debug; only a failed
/// rank lookup logs at error.
#[derive(Clone)]
pub struct AuthorizationGate {
    orchestrator: Arc<PermissionOrchestrator>,
    sink: Arc<dyn MessageSink>,
}

impl std::fmt::Debug for AuthorizationGate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthorizationGate")
            .field("orchestrator", &self.orchestrator)
            .finish_non_exhaustive()
    }
}

impl AuthorizationGate {
    /// Create a gate resolving ranks through `orchestrator`.
    pub fn new(orchestrator: Arc<PermissionOrchestrator>, sink: Arc<dyn MessageSink>) -> Self {
        Self { orchestrator, sink }
    }

    /// Run `operation` if `sender` passes `config`.
    #[instrument(skip_all, fields(command = %config.command(), sender = %sender))]
    pub async fn invoke<F, Fut, T>(
        &self,
        config: &GateConfig,
        sender: &CommandSender,
        operation: F,
    ) -> GateOutcome<T>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = T>,
    {
        match self.admit(config, sender).await {
            Ok(()) => GateOutcome::Admitted(operation().await),
            Err(denial) => {
                self.sink.send(sender, &denial_message(&denial));
                GateOutcome::Denied(denial)
            }
        }
    }

    /// Route `token` to `command` if it matches, through the gate.
    ///
    /// Returns `None` when `token` names a different command.
    pub async fn dispatch(
        &self,
        command: &dyn GuardedCommand,
        token: &str,
        sender: &CommandSender,
        args: &[String],
    ) -> Option<GateOutcome<bool>> {
        if !command.gate().matches(token) {
            return None;
        }
        Some(
            self.invoke(command.gate(), sender, || command.execute(sender, args))
                .await,
        )
    }

    async fn admit(&self, config: &GateConfig, sender: &CommandSender) -> Result<(), Denial> {
        let identity = match sender {
            CommandSender::Console if *config.console_bypass() => {
                debug!("Console bypass");
                return Ok(());
            }
            CommandSender::Console => {
                debug!("Console refused");
                return Err(Denial::ConsoleOnlyViolation);
            }
            CommandSender::Identity { id, .. } => *id,
        };

        let rank = match self.orchestrator.get_rank(identity).await {
            Ok(Some(rank)) => rank,
            Ok(None) => {
                warn!(identity = %identity, "No stored rank, treating as {}", Rank::DEFAULT);
                Rank::DEFAULT
            }
            Err(e) => {
                error!(identity = %identity, error = %e, "Failed to resolve rank");
                return Err(Denial::ResolutionFailed(e.to_string()));
            }
        };

        if config.admits(rank) {
            debug!(%rank, "Admitted");
            Ok(())
        } else {
            debug!(%rank, "Rank not permitted");
            Err(Denial::PermissionDenied(rank))
        }
    }
}

fn denial_message(denial: &Denial) -> String {
    match denial {
        Denial::ConsoleOnlyViolation => {
            format_chat_message("Command Orchestrator", PLAYER_ONLY_ERROR, true)
        }
        Denial::ResolutionFailed(_) => UNKNOWN_ERROR.to_string(),
        Denial::PermissionDenied(_) => NO_PERMISSIONS_ERROR.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_token_is_case_insensitive() {
        let config = GateConfigBuilder::default()
            .command("setrank")
            .build()
            .unwrap();
        assert!(config.matches("SetRank"));
        assert!(!config.matches("rank"));
        assert!(!config.console_bypass());
        assert!(config.allowed_ranks().is_empty());
    }

    #[test]
    fn test_denial_messages() {
        assert_eq!(
            denial_message(&Denial::PermissionDenied(Rank::Member)),
            NO_PERMISSIONS_ERROR
        );
        assert_eq!(
            denial_message(&Denial::ResolutionFailed("boom".into())),
            UNKNOWN_ERROR
        );
        assert!(denial_message(&Denial::ConsoleOnlyViolation).contains(PLAYER_ONLY_ERROR));
    }
}
