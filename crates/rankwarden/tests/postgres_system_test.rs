//! Permission system against a live PostgreSQL at `DATABASE_URL`.
//!
//! Run with `--features postgres-tests`.

use rankwarden::{
    CommandSender, ConnectedIdentities, GateOutcome, IdentityId, OrchestratorSlot,
    PermissionSystem, Rank, RankwardenConfig, RecordingMessageSink, StaticIdentityResolver,
};
use std::sync::Arc;

#[tokio::test]
#[cfg_attr(not(feature = "postgres-tests"), ignore)]
async fn test_start_seed_promote_and_shutdown() {
    dotenvy::dotenv().ok();
    let url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");
    let config = RankwardenConfig::load_layered(
        &[],
        RankwardenConfig::environment().source(Some(config::Map::new())),
    )
    .expect("Bundled defaults parse")
    .with_database_url(url);
    let slot = OrchestratorSlot::new();
    let sink = Arc::new(RecordingMessageSink::new());

    let system = PermissionSystem::start(
        &config,
        &slot,
        Arc::new(ConnectedIdentities::new()),
        sink.clone(),
    )
    .await
    .expect("system should start");
    assert!(slot.is_claimed());

    let player = IdentityId::new_random();
    assert!(system.events().on_connect(player, "Live").await);
    assert_eq!(system.orchestrator().cached_rank(&player), Some(Rank::Member));

    let setrank =
        system.set_rank_command(Arc::new(StaticIdentityResolver::new().with("Live", player)));
    let args = vec!["Live".to_string(), "HELPER".to_string()];
    let outcome = system
        .gate()
        .dispatch(&setrank, "setrank", &CommandSender::Console, &args)
        .await;
    assert_eq!(outcome, Some(GateOutcome::Admitted(true)));
    assert_eq!(system.orchestrator().cached_rank(&player), Some(Rank::Helper));

    system.events().on_disconnect(player);
    assert_eq!(
        system.orchestrator().get_rank(player).await.expect("store read"),
        Some(Rank::Helper)
    );

    system.shutdown();
}
