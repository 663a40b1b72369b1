//! PostgreSQL implementation of [`RankStore`].

use crate::{DatabaseResult, RankStore, StoreClient};
use async_trait::async_trait;
use diesel::prelude::*;
use diesel::sql_types::{Array, Text};
use rankwarden_core::{IdentityId, IdentityRankRecord, Rank};
use rankwarden_error::{DatabaseError, DatabaseErrorKind};
use std::collections::{HashMap, HashSet};
use tracing::{debug, info, instrument};

/// Name of the rank table.
pub const RANK_TABLE_NAME: &str = "rank_permissions";

const CREATE_RANK_TABLE_SQL: &str = "CREATE TABLE IF NOT EXISTS rank_permissions (\
     identity_id VARCHAR(36) PRIMARY KEY, \
     rank VARCHAR(16) NOT NULL DEFAULT 'MEMBER')";

const SELECT_RANK_SQL: &str =
    "SELECT identity_id, rank FROM rank_permissions WHERE identity_id = $1";

const SELECT_RANKS_SQL: &str =
    "SELECT identity_id, rank FROM rank_permissions WHERE identity_id = ANY($1)";

const UPSERT_RANK_SQL: &str = "INSERT INTO rank_permissions (identity_id, rank) VALUES ($1, $2) \
     ON CONFLICT (identity_id) DO UPDATE SET rank = EXCLUDED.rank";

#[derive(Debug, QueryableByName)]
struct RankRow {
    #[diesel(sql_type = Text)]
    identity_id: String,
    #[diesel(sql_type = Text)]
    rank: String,
}

impl RankRow {
    fn decode(self) -> DatabaseResult<IdentityRankRecord> {
        let identity = self.identity_id.parse::<IdentityId>().map_err(|e| {
            DatabaseError::new(DatabaseErrorKind::Serialization(e.to_string()))
        })?;
        let rank = Rank::from_storage_key(&self.rank).map_err(|e| {
            DatabaseError::new(DatabaseErrorKind::Serialization(format!(
                "{} for identity {}",
                e, identity
            )))
        })?;
        Ok(IdentityRankRecord::new(identity, rank))
    }
}

/// Rank store backed by the `rank_permissions` table.
///
/// # Example
///
/// ```rust,no_run
/// use rankwarden_database::{PostgresRankStore, RankStore, StoreClient, StoreConfig};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let client = StoreClient::connect(&StoreConfig::default())?;
/// let store = PostgresRankStore::new(client);
/// store.ensure_schema().await?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct PostgresRankStore {
    client: StoreClient,
}

impl PostgresRankStore {
    /// Create a store over a pooled client.
    pub fn new(client: StoreClient) -> Self {
        Self { client }
    }

    /// The underlying client.
    pub fn client(&self) -> &StoreClient {
        &self.client
    }
}

#[async_trait]
impl RankStore for PostgresRankStore {
    #[instrument(skip(self))]
    async fn ensure_schema(&self) -> DatabaseResult<()> {
        self.client
            .update("ensure_schema", |conn| {
                diesel::sql_query(CREATE_RANK_TABLE_SQL).execute(conn)
            })
            .await?;
        info!(table = RANK_TABLE_NAME, "Rank table ready");
        Ok(())
    }

    #[instrument(skip_all, fields(identity = %identity))]
    async fn fetch_rank(&self, identity: IdentityId) -> DatabaseResult<Option<Rank>> {
        let key = identity.to_string();
        let row = self
            .client
            .query("fetch_rank", move |conn| {
                diesel::sql_query(SELECT_RANK_SQL)
                    .bind::<Text, _>(key)
                    .get_result::<RankRow>(conn)
                    .optional()
            })
            .await?;

        match row {
            Some(row) => {
                let rank = *row.decode()?.rank();
                debug!(%rank, "Stored rank found");
                Ok(Some(rank))
            }
            None => {
                debug!("No stored rank");
                Ok(None)
            }
        }
    }

    #[instrument(skip_all, fields(count = identities.len()))]
    async fn fetch_ranks(
        &self,
        identities: &HashSet<IdentityId>,
    ) -> DatabaseResult<HashMap<IdentityId, Rank>> {
        if identities.is_empty() {
            debug!("Empty identity set, skipping query");
            return Ok(HashMap::new());
        }

        let keys: Vec<String> = identities.iter().map(IdentityId::to_string).collect();
        let rows = self
            .client
            .query("fetch_ranks", move |conn| {
                diesel::sql_query(SELECT_RANKS_SQL)
                    .bind::<Array<Text>, _>(keys)
                    .load::<RankRow>(conn)
            })
            .await?;

        let ranks = rows
            .into_iter()
            .map(|row| {
                row.decode()
                    .map(|record| (*record.identity_id(), *record.rank()))
            })
            .collect::<DatabaseResult<HashMap<_, _>>>()?;
        debug!(found = ranks.len(), "Fetched stored ranks");
        Ok(ranks)
    }

    #[instrument(skip_all, fields(identity = %identity, rank = %rank))]
    async fn upsert_rank(&self, identity: IdentityId, rank: Rank) -> DatabaseResult<bool> {
        let key = identity.to_string();
        let rows_affected = self
            .client
            .update("upsert_rank", move |conn| {
                diesel::sql_query(UPSERT_RANK_SQL)
                    .bind::<Text, _>(key)
                    .bind::<Text, _>(rank.storage_key())
                    .execute(conn)
            })
            .await?;
        Ok(rows_affected > 0)
    }
}
