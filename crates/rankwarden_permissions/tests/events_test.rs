//! Connect, disconnect and chat handling.

use rankwarden_core::{IdentityId, Rank};
use rankwarden_database::{InMemoryRankStore, StoreOperation};
use rankwarden_permissions::{
    CommandSender, ConnectedIdentities, OrchestratorSlot, PROFILE_ERROR, PermissionEvents,
    PermissionOrchestrator, PresenceDirectory, RecordingMessageSink,
};
use std::sync::Arc;

struct Fixture {
    store: Arc<InMemoryRankStore>,
    presence: Arc<ConnectedIdentities>,
    orchestrator: Arc<PermissionOrchestrator>,
    sink: Arc<RecordingMessageSink>,
    events: PermissionEvents,
}

async fn fixture(store: InMemoryRankStore) -> Fixture {
    let slot = OrchestratorSlot::new();
    let store = Arc::new(store);
    let presence = Arc::new(ConnectedIdentities::new());
    let orchestrator = Arc::new(
        PermissionOrchestrator::bootstrap(&slot, store.clone(), presence.clone())
            .await
            .expect("bootstrap should succeed"),
    );
    let sink = Arc::new(RecordingMessageSink::new());
    let events = PermissionEvents::new(orchestrator.clone(), presence.clone(), sink.clone());
    Fixture {
        store,
        presence,
        orchestrator,
        sink,
        events,
    }
}

#[tokio::test]
async fn test_first_connect_creates_member() {
    let f = fixture(InMemoryRankStore::new()).await;
    let id = IdentityId::new_random();

    assert!(f.events.on_connect(id, "Steve").await);

    assert!(f.presence.is_connected(&id));
    assert_eq!(f.store.stored_rank(&id), Some(Rank::Member));
    assert_eq!(f.orchestrator.cached_rank(&id), Some(Rank::Member));
    assert!(f.sink.messages().is_empty());
}

#[tokio::test]
async fn test_connect_loads_stored_rank() {
    let id = IdentityId::new_random();
    let f = fixture(InMemoryRankStore::with_rows([(id, Rank::Builder)])).await;

    assert!(f.events.on_connect(id, "Builder").await);
    assert_eq!(f.orchestrator.cached_rank(&id), Some(Rank::Builder));
    assert_eq!(f.store.calls(StoreOperation::UpsertRank), 0);
}

#[tokio::test]
async fn test_connect_failure_tells_the_identity() {
    let f = fixture(InMemoryRankStore::new()).await;
    f.store.set_failing(StoreOperation::FetchRank, true);
    let id = IdentityId::new_random();

    assert!(!f.events.on_connect(id, "Alex").await);

    let sender = CommandSender::identity(id, "Alex");
    assert_eq!(f.sink.messages_for(&sender), vec![PROFILE_ERROR]);
    assert_eq!(f.orchestrator.cached_rank(&id), None);
}

#[tokio::test]
async fn test_disconnect_purges_and_later_writes_skip_cache() {
    let id = IdentityId::new_random();
    let f = fixture(InMemoryRankStore::with_rows([(id, Rank::VipPlus)])).await;

    f.events.on_connect(id, "Sam").await;
    assert_eq!(f.orchestrator.cached_rank(&id), Some(Rank::VipPlus));

    f.events.on_disconnect(id);
    assert!(!f.presence.is_connected(&id));
    assert_eq!(f.orchestrator.cached_rank(&id), None);

    assert!(f.orchestrator.upsert_rank(id, Rank::Mvp).await.unwrap());
    assert_eq!(f.orchestrator.cached_rank(&id), None);
    assert_eq!(f.store.stored_rank(&id), Some(Rank::Mvp));
}

#[tokio::test]
async fn test_chat_renders_rank_prefix() {
    let id = IdentityId::new_random();
    let f = fixture(InMemoryRankStore::with_rows([(id, Rank::Owner)])).await;
    f.events.on_connect(id, "Notch").await;

    let line = f.events.on_chat(id, "Notch", "hello").await;

    assert_eq!(line.as_deref(), Some("&4&lOWNER &r&7Notch &r&7// hello"));
    assert_eq!(f.store.calls(StoreOperation::FetchRank), 1);
}

#[tokio::test]
async fn test_chat_without_rank_creates_member() {
    let f = fixture(InMemoryRankStore::new()).await;
    let id = IdentityId::new_random();
    f.presence.connect(id);

    let line = f.events.on_chat(id, "Fresh", "hi").await;

    assert_eq!(line.as_deref(), Some("&8&lMEMBER &r&7Fresh &r&7// hi"));
    assert_eq!(f.store.stored_rank(&id), Some(Rank::Member));
    assert_eq!(f.orchestrator.cached_rank(&id), Some(Rank::Member));
}

#[tokio::test]
async fn test_chat_failure_drops_message() {
    let f = fixture(InMemoryRankStore::new()).await;
    f.store.set_failing(StoreOperation::FetchRank, true);
    let id = IdentityId::new_random();

    assert_eq!(f.events.on_chat(id, "Lost", "anyone?").await, None);
    assert_eq!(
        f.sink.messages_for(&CommandSender::identity(id, "Lost")),
        vec![PROFILE_ERROR]
    );
}
