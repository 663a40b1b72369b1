//! In-memory implementation of [`RankStore`].

use crate::{DatabaseResult, RankStore};
use async_trait::async_trait;
use dashmap::{DashMap, DashSet};
use rankwarden_core::{IdentityId, Rank};
use rankwarden_error::{DatabaseError, DatabaseErrorKind};
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use tracing::{debug, instrument};

/// Store operations, used to count issued queries and inject failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, derive_more::Display)]
pub enum StoreOperation {
    /// [`RankStore::ensure_schema`]
    #[display("ensure_schema")]
    EnsureSchema,
    /// [`RankStore::fetch_rank`]
    #[display("fetch_rank")]
    FetchRank,
    /// [`RankStore::fetch_ranks`]
    #[display("fetch_ranks")]
    FetchRanks,
    /// [`RankStore::upsert_rank`]
    #[display("upsert_rank")]
    UpsertRank,
}

/// Rank store held entirely in memory.
///
/// Counts every statement it would have issued and can be told to fail
/// specific operations, which makes it the store of choice for tests and
/// offline runs.
///
/// # Example
///
/// ```
/// use rankwarden_core::{IdentityId, Rank};
/// use rankwarden_database::{InMemoryRankStore, RankStore, StoreOperation};
///
/// # tokio_test_block(async {
/// let store = InMemoryRankStore::new();
/// let id = IdentityId::new_random();
/// assert!(store.upsert_rank(id, Rank::Vip).await.unwrap());
/// assert_eq!(store.fetch_rank(id).await.unwrap(), Some(Rank::Vip));
/// assert_eq!(store.calls(StoreOperation::FetchRank), 1);
/// # });
/// # fn tokio_test_block<F: std::future::Future>(f: F) -> F::Output {
/// #     tokio::runtime::Builder::new_current_thread().build().unwrap().block_on(f)
/// # }
/// ```
#[derive(Debug, Default)]
pub struct InMemoryRankStore {
    rows: DashMap<IdentityId, Rank>,
    schema_ready: AtomicBool,
    failing: DashSet<StoreOperation>,
    ensure_schema_calls: AtomicUsize,
    fetch_rank_calls: AtomicUsize,
    fetch_ranks_calls: AtomicUsize,
    upsert_rank_calls: AtomicUsize,
}

impl InMemoryRankStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store pre-populated with rows.
    pub fn with_rows(rows: impl IntoIterator<Item = (IdentityId, Rank)>) -> Self {
        let store = Self::default();
        for (identity, rank) in rows {
            store.rows.insert(identity, rank);
        }
        store
    }

    /// Make `operation` fail with a query error until cleared.
    pub fn set_failing(&self, operation: StoreOperation, failing: bool) {
        if failing {
            self.failing.insert(operation);
        } else {
            self.failing.remove(&operation);
        }
    }

    /// Number of statements issued for `operation`.
    pub fn calls(&self, operation: StoreOperation) -> usize {
        self.counter(operation).load(Ordering::SeqCst)
    }

    /// Number of statements issued across all operations.
    pub fn total_calls(&self) -> usize {
        [
            StoreOperation::EnsureSchema,
            StoreOperation::FetchRank,
            StoreOperation::FetchRanks,
            StoreOperation::UpsertRank,
        ]
        .into_iter()
        .map(|operation| self.calls(operation))
        .sum()
    }

    /// Stored rank, read directly without counting a statement.
    pub fn stored_rank(&self, identity: &IdentityId) -> Option<Rank> {
        self.rows.get(identity).map(|entry| *entry.value())
    }

    /// Number of stored rows.
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Whether [`RankStore::ensure_schema`] has succeeded at least once.
    pub fn schema_ready(&self) -> bool {
        self.schema_ready.load(Ordering::SeqCst)
    }

    fn counter(&self, operation: StoreOperation) -> &AtomicUsize {
        match operation {
            StoreOperation::EnsureSchema => &self.ensure_schema_calls,
            StoreOperation::FetchRank => &self.fetch_rank_calls,
            StoreOperation::FetchRanks => &self.fetch_ranks_calls,
            StoreOperation::UpsertRank => &self.upsert_rank_calls,
        }
    }

    fn issue(&self, operation: StoreOperation) -> DatabaseResult<()> {
        self.counter(operation).fetch_add(1, Ordering::SeqCst);
        if self.failing.contains(&operation) {
            debug!(%operation, "Injected store failure");
            return Err(DatabaseError::new(DatabaseErrorKind::Query(format!(
                "injected failure for {}",
                operation
            ))));
        }
        Ok(())
    }
}

#[async_trait]
impl RankStore for InMemoryRankStore {
    #[instrument(skip(self))]
    async fn ensure_schema(&self) -> DatabaseResult<()> {
        self.issue(StoreOperation::EnsureSchema)?;
        self.schema_ready.store(true, Ordering::SeqCst);
        Ok(())
    }

    #[instrument(skip_all, fields(identity = %identity))]
    async fn fetch_rank(&self, identity: IdentityId) -> DatabaseResult<Option<Rank>> {
        self.issue(StoreOperation::FetchRank)?;
        Ok(self.stored_rank(&identity))
    }

    #[instrument(skip_all, fields(count = identities.len()))]
    async fn fetch_ranks(
        &self,
        identities: &HashSet<IdentityId>,
    ) -> DatabaseResult<HashMap<IdentityId, Rank>> {
        if identities.is_empty() {
            return Ok(HashMap::new());
        }
        self.issue(StoreOperation::FetchRanks)?;
        Ok(identities
            .iter()
            .filter_map(|identity| self.stored_rank(identity).map(|rank| (*identity, rank)))
            .collect())
    }

    #[instrument(skip_all, fields(identity = %identity, rank = %rank))]
    async fn upsert_rank(&self, identity: IdentityId, rank: Rank) -> DatabaseResult<bool> {
        self.issue(StoreOperation::UpsertRank)?;
        self.rows.insert(identity, rank);
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_empty_batch_issues_no_statement() {
        let store = InMemoryRankStore::new();
        let ranks = store.fetch_ranks(&HashSet::new()).await.unwrap();
        assert!(ranks.is_empty());
        assert_eq!(store.total_calls(), 0);
    }

    #[tokio::test]
    async fn test_injected_failure_is_counted() {
        let store = InMemoryRankStore::new();
        store.set_failing(StoreOperation::UpsertRank, true);

        let id = IdentityId::new_random();
        assert!(store.upsert_rank(id, Rank::Owner).await.is_err());
        assert_eq!(store.calls(StoreOperation::UpsertRank), 1);
        assert_eq!(store.stored_rank(&id), None);

        store.set_failing(StoreOperation::UpsertRank, false);
        assert!(store.upsert_rank(id, Rank::Owner).await.unwrap());
    }
}
