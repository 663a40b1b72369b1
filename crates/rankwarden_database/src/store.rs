//! The rank store contract.

use crate::DatabaseResult;
use async_trait::async_trait;
use rankwarden_core::{IdentityId, Rank};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

/// Durable storage for identity ranks.
///
/// A missing row is not an error: lookups return `None` (or omit the id from
/// a batch result). Implementations never create rows from a lookup.
#[async_trait]
pub trait RankStore: Send + Sync {
    /// Create the rank table if it does not exist. Safe to call on every boot.
    async fn ensure_schema(&self) -> DatabaseResult<()>;

    /// Fetch the stored rank for one identity.
    async fn fetch_rank(&self, identity: IdentityId) -> DatabaseResult<Option<Rank>>;

    /// Fetch stored ranks for a set of identities.
    ///
    /// Identities without a row are absent from the result. An empty input
    /// resolves to an empty map without issuing a query.
    async fn fetch_ranks(
        &self,
        identities: &HashSet<IdentityId>,
    ) -> DatabaseResult<HashMap<IdentityId, Rank>>;

    /// Insert or overwrite an identity's rank in one atomic statement.
    ///
    /// Returns true iff at least one row was affected.
    async fn upsert_rank(&self, identity: IdentityId, rank: Rank) -> DatabaseResult<bool>;
}

#[async_trait]
impl<S: RankStore + ?Sized> RankStore for Arc<S> {
    async fn ensure_schema(&self) -> DatabaseResult<()> {
        (**self).ensure_schema().await
    }

    async fn fetch_rank(&self, identity: IdentityId) -> DatabaseResult<Option<Rank>> {
        (**self).fetch_rank(identity).await
    }

    async fn fetch_ranks(
        &self,
        identities: &HashSet<IdentityId>,
    ) -> DatabaseResult<HashMap<IdentityId, Rank>> {
        (**self).fetch_ranks(identities).await
    }

    async fn upsert_rank(&self, identity: IdentityId, rank: Rank) -> DatabaseResult<bool> {
        (**self).upsert_rank(identity, rank).await
    }
}
