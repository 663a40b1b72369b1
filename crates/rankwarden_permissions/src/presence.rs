//! Which identities are currently connected.

use dashmap::DashSet;
use rankwarden_core::IdentityId;
use std::collections::HashSet;

/// Read access to the set of connected identities.
///
/// The orchestrator consults this to decide whether a rank write should also
/// refresh the cache, and to pick which identities to seed at bootstrap.
pub trait PresenceDirectory: Send + Sync {
    /// Whether `identity` is connected right now.
    fn is_connected(&self, identity: &IdentityId) -> bool;

    /// Snapshot of every connected identity.
    fn connected_identities(&self) -> HashSet<IdentityId>;
}

/// Concurrent set of connected identities, updated by the connection handlers.
///
/// # Example
///
/// ```
/// use rankwarden_core::IdentityId;
/// use rankwarden_permissions::{ConnectedIdentities, PresenceDirectory};
///
/// let presence = ConnectedIdentities::new();
/// let id = IdentityId::new_random();
///
/// presence.connect(id);
/// assert!(presence.is_connected(&id));
/// presence.disconnect(&id);
/// assert!(presence.connected_identities().is_empty());
/// ```
#[derive(Debug, Default)]
pub struct ConnectedIdentities {
    identities: DashSet<IdentityId>,
}

impl ConnectedIdentities {
    /// Create an empty directory.
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark `identity` connected. Returns false if it already was.
    pub fn connect(&self, identity: IdentityId) -> bool {
        self.identities.insert(identity)
    }

    /// Mark `identity` disconnected. Returns false if it was not connected.
    pub fn disconnect(&self, identity: &IdentityId) -> bool {
        self.identities.remove(identity).is_some()
    }

    /// Number of connected identities.
    pub fn len(&self) -> usize {
        self.identities.len()
    }

    /// Whether nobody is connected.
    pub fn is_empty(&self) -> bool {
        self.identities.is_empty()
    }
}

impl FromIterator<IdentityId> for ConnectedIdentities {
    fn from_iter<I: IntoIterator<Item = IdentityId>>(iter: I) -> Self {
        Self {
            identities: iter.into_iter().collect(),
        }
    }
}

impl PresenceDirectory for ConnectedIdentities {
    fn is_connected(&self, identity: &IdentityId) -> bool {
        self.identities.contains(identity)
    }

    fn connected_identities(&self) -> HashSet<IdentityId> {
        self.identities.iter().map(|entry| *entry.key()).collect()
    }
}
