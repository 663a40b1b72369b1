//! Store client behavior that does not need a reachable database.

use rankwarden_core::{IdentityId, Rank};
use rankwarden_database::{
    PostgresRankStore, RankStore, StoreClient, StoreConfig, StoreConfigBuilder,
};
use rankwarden_error::DatabaseErrorKind;
use std::collections::HashSet;

fn unreachable_config() -> StoreConfig {
    StoreConfigBuilder::default()
        .url(Some("postgres://rankwarden@127.0.0.1:1/unreachable".to_string()))
        .max_pool_size(1u32)
        .connection_timeout_millis(200u64)
        .worker_threads(1usize)
        .build()
        .expect("Valid store config")
}

#[tokio::test]
async fn test_connect_rejects_zero_pool_size() {
    let config = StoreConfigBuilder::default()
        .max_pool_size(0u32)
        .build()
        .expect("Valid store config");
    let err = StoreClient::connect(&config).unwrap_err();
    assert!(matches!(err.kind, DatabaseErrorKind::Connection(_)));
}

#[tokio::test]
async fn test_connect_rejects_zero_workers() {
    let config = StoreConfigBuilder::default()
        .worker_threads(0usize)
        .build()
        .expect("Valid store config");
    assert!(StoreClient::connect(&config).is_err());
}

#[tokio::test]
async fn test_disconnected_client_fails_fast() {
    let client = StoreClient::connect(&unreachable_config()).expect("Pool builds lazily");
    assert!(!client.is_closed());

    client.disconnect();
    assert!(client.is_closed());

    let err = client
        .query("noop", |_conn| Ok(1usize))
        .await
        .unwrap_err();
    assert!(err.is_closed());

    let err = client.update("noop", |_conn| Ok(1usize)).await.unwrap_err();
    assert!(err.is_closed());

    assert!(!client.health_check().await);
}

#[tokio::test]
async fn test_disconnect_is_idempotent() {
    let client = StoreClient::connect(&unreachable_config()).expect("Pool builds lazily");
    client.disconnect();
    client.disconnect();
    assert!(client.is_closed());
}

#[tokio::test]
async fn test_store_operations_surface_closed_error() {
    let client = StoreClient::connect(&unreachable_config()).expect("Pool builds lazily");
    let store = PostgresRankStore::new(client.clone());
    client.disconnect();

    let id = IdentityId::new_random();
    assert!(store.fetch_rank(id).await.unwrap_err().is_closed());
    assert!(store.upsert_rank(id, Rank::Vip).await.unwrap_err().is_closed());
    assert!(store.ensure_schema().await.unwrap_err().is_closed());
}

#[tokio::test]
async fn test_empty_batch_fetch_never_touches_the_client() {
    let client = StoreClient::connect(&unreachable_config()).expect("Pool builds lazily");
    let store = PostgresRankStore::new(client.clone());
    client.disconnect();

    // A closed client fails every statement, so success proves no query ran.
    let ranks = store
        .fetch_ranks(&HashSet::new())
        .await
        .expect("Empty set short-circuits");
    assert!(ranks.is_empty());
}
