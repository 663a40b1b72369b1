//! Command handlers.

use super::{Cli, Commands};
use rankwarden::{
    ConnectedIdentities, IdentityId, LoggingMessageSink, OrchestratorSlot, PermissionError,
    PermissionErrorKind, PermissionSystem, Rank, RankwardenConfig, RankwardenResult, StoreClient,
    ranks_with_level_at_least,
};
use std::sync::Arc;
use tracing::{debug, instrument};

/// Run the parsed command line.
pub async fn execute(cli: Cli) -> RankwardenResult<()> {
    if let Commands::Ranks { min_level } = cli.command {
        list_ranks(min_level);
        return Ok(());
    }

    let config = load_config(&cli)?;
    match cli.command {
        Commands::Check => check(&config).await,
        Commands::Init => init(&config).await,
        Commands::Get { identity } => get(&config, identity).await,
        Commands::Set { identity, rank } => set(&config, identity, rank).await,
        Commands::Ranks { .. } => Ok(()),
    }
}

fn load_config(cli: &Cli) -> RankwardenResult<RankwardenConfig> {
    let config = match &cli.config {
        Some(path) => RankwardenConfig::from_file(path)?,
        None => RankwardenConfig::load()?,
    };
    Ok(match &cli.database_url {
        Some(url) => {
            debug!("Using database URL from command line or environment");
            config.with_database_url(url.clone())
        }
        None => config,
    })
}

#[instrument(skip_all)]
async fn check(config: &RankwardenConfig) -> RankwardenResult<()> {
    let store_config = config.store_config()?;
    let client = StoreClient::connect(&store_config)?;
    let healthy = client.health_check().await;
    client.disconnect();

    if healthy {
        println!("Database reachable at {}", store_config.redacted_url());
        Ok(())
    } else {
        Err(PermissionError::new(PermissionErrorKind::StoreUnavailable(
            store_config.redacted_url(),
        ))
        .into())
    }
}

async fn start(config: &RankwardenConfig) -> RankwardenResult<PermissionSystem> {
    PermissionSystem::start(
        config,
        OrchestratorSlot::process(),
        Arc::new(ConnectedIdentities::new()),
        Arc::new(LoggingMessageSink),
    )
    .await
}

#[instrument(skip_all)]
async fn init(config: &RankwardenConfig) -> RankwardenResult<()> {
    let system = start(config).await?;
    system.shutdown();
    println!("Rank table ready");
    Ok(())
}

#[instrument(skip(config))]
async fn get(config: &RankwardenConfig, identity: IdentityId) -> RankwardenResult<()> {
    let system = start(config).await?;
    let rank = system.orchestrator().get_rank(identity).await;
    system.shutdown();

    match rank? {
        Some(rank) => println!("{}: {} (level {})", identity, rank.display_name(), rank.level()),
        None => println!("{}: no stored rank ({} applies)", identity, Rank::DEFAULT),
    }
    Ok(())
}

#[instrument(skip(config))]
async fn set(config: &RankwardenConfig, identity: IdentityId, rank: Rank) -> RankwardenResult<()> {
    let system = start(config).await?;
    let written = system.orchestrator().upsert_rank(identity, rank).await;
    system.shutdown();

    if written? {
        println!("{} is now {}", identity, rank.display_name());
    } else {
        println!("Rank store did not accept the update for {}", identity);
    }
    Ok(())
}

fn list_ranks(min_level: u8) {
    for rank in ranks_with_level_at_least(min_level) {
        println!(
            "{:<14} {:<14} level {:>3}  color &{}",
            rank.storage_key(),
            rank.display_name(),
            rank.level(),
            rank.color_code()
        );
    }
}
