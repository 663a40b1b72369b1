//! Cached rank lookups in front of a [`RankStore`].

use crate::{PermissionResult, PresenceDirectory};
use dashmap::DashMap;
use rankwarden_core::{IdentityId, Rank};
use rankwarden_database::RankStore;
use rankwarden_error::{PermissionError, PermissionErrorKind};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{debug, error, info, instrument, warn};

/// Guards against constructing more than one orchestrator per slot.
///
/// Production code bootstraps against [`OrchestratorSlot::process`]; tests
/// create their own slots. A claim is never released, so a failed bootstrap
/// still consumes the slot.
#[derive(Debug, Default)]
pub struct OrchestratorSlot {
    claimed: AtomicBool,
}

static PROCESS_SLOT: OrchestratorSlot = OrchestratorSlot::new();

impl OrchestratorSlot {
    /// Create an unclaimed slot.
    ///
    /// A fresh slot admits one more orchestrator, so hosts must use
    /// [`OrchestratorSlot::process`] instead. Separate slots exist for tests
    /// that need isolated orchestrators in one process.
    pub const fn new() -> Self {
        Self {
            claimed: AtomicBool::new(false),
        }
    }

    /// The slot shared by the whole process.
    pub fn process() -> &'static OrchestratorSlot {
        &PROCESS_SLOT
    }

    /// Whether an orchestrator has been bootstrapped against this slot.
    pub fn is_claimed(&self) -> bool {
        self.claimed.load(Ordering::SeqCst)
    }

    fn claim(&self) -> PermissionResult<()> {
        self.claimed
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .map(|_| ())
            .map_err(|_| PermissionError::new(PermissionErrorKind::DuplicateInitialization))
    }
}

/// Serves rank lookups from an in-memory cache, falling back to the store.
///
/// Each identity is either uncached or cached with one rank. Only connected
/// identities are expected to be cached; the disconnect handler purges them.
///
/// Known races, accepted: a lookup that completes after a concurrent
/// [`purge`](Self::purge) re-caches the identity (last writer wins), and
/// writes to the store that bypass [`upsert_rank`](Self::upsert_rank) leave a
/// cached entry stale until it is purged.
pub struct PermissionOrchestrator {
    store: Arc<dyn RankStore>,
    presence: Arc<dyn PresenceDirectory>,
    cache: DashMap<IdentityId, Rank>,
}

impl std::fmt::Debug for PermissionOrchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PermissionOrchestrator")
            .field("cached", &self.cache.len())
            .finish_non_exhaustive()
    }
}

impl PermissionOrchestrator {
    /// Claim `slot`, prepare the schema and seed the cache for everyone
    /// already connected.
    ///
    /// # Errors
    ///
    /// - `DuplicateInitialization` if `slot` was already claimed
    /// - `SchemaBootstrap` if the rank table could not be created
    /// - `SeedFailure` if ranks for connected identities could not be loaded
    ///
    /// All of these are fatal: no orchestrator exists afterwards and the
    /// caller must disable the permission subsystem.
    #[instrument(skip_all)]
    pub async fn bootstrap(
        slot: &OrchestratorSlot,
        store: Arc<dyn RankStore>,
        presence: Arc<dyn PresenceDirectory>,
    ) -> PermissionResult<Self> {
        slot.claim()?;

        store.ensure_schema().await.map_err(|e| {
            error!(error = %e, "Failed to create rank schema");
            PermissionError::new(PermissionErrorKind::SchemaBootstrap(e))
        })?;

        let connected = presence.connected_identities();
        let cache = DashMap::new();
        if !connected.is_empty() {
            let ranks = store.fetch_ranks(&connected).await.map_err(|e| {
                error!(error = %e, connected = connected.len(), "Failed to seed connected ranks");
                PermissionError::new(PermissionErrorKind::SeedFailure(e))
            })?;
            for (identity, rank) in ranks {
                cache.insert(identity, rank);
            }
        }

        info!(
            connected = connected.len(),
            seeded = cache.len(),
            "Permission orchestrator ready"
        );

        Ok(Self {
            store,
            presence,
            cache,
        })
    }

    /// Rank of `identity`, served from the cache when possible.
    ///
    /// A cache miss reads the store. A stored rank is cached before it is
    /// returned; `None` means no row exists and nothing is cached.
    ///
    /// # Errors
    ///
    /// Propagates store failures.
    #[instrument(skip_all, fields(identity = %identity))]
    pub async fn get_rank(&self, identity: IdentityId) -> PermissionResult<Option<Rank>> {
        if let Some(rank) = self.cached_rank(&identity) {
            debug!(%rank, "Cache hit");
            return Ok(Some(rank));
        }

        let stored = self.store.fetch_rank(identity).await?;
        if let Some(rank) = stored {
            self.cache.insert(identity, rank);
            debug!(%rank, "Cached stored rank");
        }
        Ok(stored)
    }

    /// Load `identity` into the cache, creating a MEMBER row when none exists.
    ///
    /// Returns whether the identity ended up cached.
    ///
    /// # Errors
    ///
    /// Propagates store failures.
    #[instrument(skip_all, fields(identity = %identity))]
    pub async fn seed_rank(&self, identity: IdentityId) -> PermissionResult<bool> {
        if let Some(rank) = self.store.fetch_rank(identity).await? {
            self.cache.insert(identity, rank);
            debug!(%rank, "Seeded stored rank");
            return Ok(true);
        }

        let created = self.store.upsert_rank(identity, Rank::DEFAULT).await?;
        if created {
            self.cache.insert(identity, Rank::DEFAULT);
            debug!(rank = %Rank::DEFAULT, "Seeded default rank");
        } else {
            warn!("Store did not accept default rank");
        }
        Ok(created)
    }

    /// Persist `rank` for `identity`.
    ///
    /// The cache is refreshed only when the write succeeded and the identity
    /// is connected. Returns the store's success flag.
    ///
    /// # Errors
    ///
    /// Propagates store failures; the cache is untouched in that case.
    #[instrument(skip_all, fields(identity = %identity, rank = %rank))]
    pub async fn upsert_rank(&self, identity: IdentityId, rank: Rank) -> PermissionResult<bool> {
        let written = self.store.upsert_rank(identity, rank).await?;
        if written && self.presence.is_connected(&identity) {
            self.cache.insert(identity, rank);
            debug!("Refreshed cached rank");
        }
        Ok(written)
    }

    /// Drop any cached rank for `identity`. Returns whether one was cached.
    #[instrument(skip_all, fields(identity = %identity))]
    pub fn purge(&self, identity: &IdentityId) -> bool {
        let removed = self.cache.remove(identity).is_some();
        if removed {
            debug!("Purged cached rank");
        }
        removed
    }

    /// Cached rank for `identity`, without touching the store.
    pub fn cached_rank(&self, identity: &IdentityId) -> Option<Rank> {
        self.cache.get(identity).map(|entry| *entry.value())
    }

    /// Number of cached identities.
    pub fn cached_len(&self) -> usize {
        self.cache.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ConnectedIdentities;
    use rankwarden_database::{InMemoryRankStore, StoreOperation};

    #[test]
    fn test_slot_claims_once() {
        let slot = OrchestratorSlot::new();
        assert!(!slot.is_claimed());
        assert!(slot.claim().is_ok());
        assert!(slot.is_claimed());

        let err = slot.claim().unwrap_err();
        assert!(matches!(
            err.kind(),
            PermissionErrorKind::DuplicateInitialization
        ));
    }

    #[tokio::test]
    async fn test_purge_is_noop_when_uncached() {
        let slot = OrchestratorSlot::new();
        let store = Arc::new(InMemoryRankStore::new());
        let orchestrator = PermissionOrchestrator::bootstrap(
            &slot,
            store.clone(),
            Arc::new(ConnectedIdentities::new()),
        )
        .await
        .unwrap();

        assert!(!orchestrator.purge(&IdentityId::new_random()));
        assert_eq!(orchestrator.cached_len(), 0);
        assert_eq!(store.calls(StoreOperation::FetchRanks), 0);
    }
}
