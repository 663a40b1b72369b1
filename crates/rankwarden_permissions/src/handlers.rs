//! Connection and chat event handlers.

use crate::{CommandSender, ConnectedIdentities, MessageSink, PermissionOrchestrator};
use rankwarden_core::{IdentityId, Rank, format_chat_line};
use std::sync::Arc;
use tracing::{debug, error, info, instrument, warn};

/// Sent when an identity's rank could not be loaded or created.
pub const PROFILE_ERROR: &str =
    "An error occurred while trying to initialize your profile. Please contact an administrator.";

/// Keeps the cache and presence directory in step with the host's
/// connect, disconnect and chat events.
#[derive(Clone)]
pub struct PermissionEvents {
    orchestrator: Arc<PermissionOrchestrator>,
    presence: Arc<ConnectedIdentities>,
    sink: Arc<dyn MessageSink>,
}

impl std::fmt::Debug for PermissionEvents {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PermissionEvents")
            .field("orchestrator", &self.orchestrator)
            .field("connected", &self.presence.len())
            .finish_non_exhaustive()
    }
}

impl PermissionEvents {
    /// Create handlers over shared state.
    pub fn new(
        orchestrator: Arc<PermissionOrchestrator>,
        presence: Arc<ConnectedIdentities>,
        sink: Arc<dyn MessageSink>,
    ) -> Self {
        Self {
            orchestrator,
            presence,
            sink,
        }
    }

    /// An identity joined. Returns whether its rank was seeded.
    #[instrument(skip_all, fields(identity = %id, name = %name))]
    pub async fn on_connect(&self, id: IdentityId, name: &str) -> bool {
        self.presence.connect(id);

        let seeded = match self.orchestrator.seed_rank(id).await {
            Ok(true) => {
                info!("Loaded rank for connecting identity");
                true
            }
            Ok(false) => {
                warn!("Rank store did not accept a default rank");
                false
            }
            Err(e) => {
                warn!(error = %e, "Failed to seed rank");
                false
            }
        };

        if !seeded {
            self.sink
                .send(&CommandSender::identity(id, name), PROFILE_ERROR);
        }
        seeded
    }

    /// An identity left.
    #[instrument(skip_all, fields(identity = %id))]
    pub fn on_disconnect(&self, id: IdentityId) {
        self.presence.disconnect(&id);
        self.orchestrator.purge(&id);
        debug!("Identity disconnected");
    }

    /// Render a chat line with the sender's rank prefix.
    ///
    /// Identities without a stored rank are given MEMBER. Returns `None` when
    /// the rank could not be resolved; the sender is told and the message is
    /// dropped.
    #[instrument(skip_all, fields(identity = %id, name = %name))]
    pub async fn on_chat(&self, id: IdentityId, name: &str, message: &str) -> Option<String> {
        let rank = match self.orchestrator.get_rank(id).await {
            Ok(Some(rank)) => rank,
            Ok(None) => {
                match self.orchestrator.upsert_rank(id, Rank::DEFAULT).await {
                    Ok(true) => debug!("Created default rank on chat"),
                    Ok(false) => warn!("Rank store did not accept a default rank"),
                    Err(e) => warn!(error = %e, "Failed to create default rank"),
                }
                Rank::DEFAULT
            }
            Err(e) => {
                error!(error = %e, "Failed to resolve rank for chat");
                self.sink
                    .send(&CommandSender::identity(id, name), PROFILE_ERROR);
                return None;
            }
        };

        Some(format_chat_line(rank, name, message))
    }
}
