//! Wiring of the permission subsystem for a host process.

use crate::RankwardenConfig;
use rankwarden_database::{PostgresRankStore, RankStore, StoreClient};
use rankwarden_error::{PermissionError, PermissionErrorKind, RankwardenResult};
use rankwarden_permissions::{
    AuthorizationGate, ConnectedIdentities, IdentityResolver, MessageSink, OrchestratorSlot,
    PermissionEvents, PermissionOrchestrator, SetRankCommand,
};
use std::sync::Arc;
use tracing::{error, info, instrument};

/// A running permission subsystem.
///
/// Holds the shared orchestrator and the pieces a host registers with its
/// event and command dispatch.
///
/// At most one system exists per slot. Hosts pass
/// [`OrchestratorSlot::process`] so that a second start anywhere in the
/// process fails with `DuplicateInitialization`.
pub struct PermissionSystem {
    client: Option<StoreClient>,
    orchestrator: Arc<PermissionOrchestrator>,
    presence: Arc<ConnectedIdentities>,
    sink: Arc<dyn MessageSink>,
    gate: AuthorizationGate,
    events: PermissionEvents,
}

impl std::fmt::Debug for PermissionSystem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PermissionSystem")
            .field("client", &self.client)
            .field("orchestrator", &self.orchestrator)
            .finish_non_exhaustive()
    }
}

impl PermissionSystem {
    /// Connect to PostgreSQL and bootstrap against `slot`, normally
    /// [`OrchestratorSlot::process`].
    ///
    /// # Errors
    ///
    /// - Configuration errors for invalid pool or worker sizes
    /// - `StoreUnavailable` if the health check fails
    /// - Any bootstrap error from [`PermissionOrchestrator::bootstrap`]
    ///
    /// The pool is closed before an error is returned.
    #[instrument(skip_all)]
    pub async fn start(
        config: &RankwardenConfig,
        slot: &OrchestratorSlot,
        presence: Arc<ConnectedIdentities>,
        sink: Arc<dyn MessageSink>,
    ) -> RankwardenResult<Self> {
        let store_config = config.store_config()?;
        let client = StoreClient::connect(&store_config)?;

        if !client.health_check().await {
            error!(url = %store_config.redacted_url(), "Rank store failed its health check");
            client.disconnect();
            return Err(PermissionError::new(PermissionErrorKind::StoreUnavailable(
                store_config.redacted_url(),
            ))
            .into());
        }

        let store = Arc::new(PostgresRankStore::new(client.clone()));
        match Self::with_store(store, slot, presence, sink).await {
            Ok(mut system) => {
                system.client = Some(client);
                Ok(system)
            }
            Err(e) => {
                client.disconnect();
                Err(e)
            }
        }
    }

    /// Bootstrap over an existing store, claiming `slot`.
    ///
    /// # Errors
    ///
    /// Any bootstrap error from [`PermissionOrchestrator::bootstrap`].
    pub async fn with_store(
        store: Arc<dyn RankStore>,
        slot: &OrchestratorSlot,
        presence: Arc<ConnectedIdentities>,
        sink: Arc<dyn MessageSink>,
    ) -> RankwardenResult<Self> {
        let orchestrator = Arc::new(
            PermissionOrchestrator::bootstrap(slot, store, presence.clone()).await?,
        );
        let gate = AuthorizationGate::new(orchestrator.clone(), sink.clone());
        let events = PermissionEvents::new(orchestrator.clone(), presence.clone(), sink.clone());

        info!(connected = presence.len(), "Permission system started");

        Ok(Self {
            client: None,
            orchestrator,
            presence,
            sink,
            gate,
            events,
        })
    }

    /// The shared orchestrator.
    pub fn orchestrator(&self) -> &Arc<PermissionOrchestrator> {
        &self.orchestrator
    }

    /// Connected identities.
    pub fn presence(&self) -> &Arc<ConnectedIdentities> {
        &self.presence
    }

    /// Gate for guarded operations.
    pub fn gate(&self) -> &AuthorizationGate {
        &self.gate
    }

    /// Connection and chat handlers.
    pub fn events(&self) -> &PermissionEvents {
        &self.events
    }

    /// Build the `setrank` command, resolving names through `resolver`.
    pub fn set_rank_command(&self, resolver: Arc<dyn IdentityResolver>) -> SetRankCommand {
        SetRankCommand::new(self.orchestrator.clone(), resolver, self.sink.clone())
    }

    /// Close the connection pool, if one is owned.
    pub fn shutdown(&self) {
        if let Some(client) = &self.client {
            client.disconnect();
        }
        info!("Permission system stopped");
    }
}
