//! Bootstrap a fresh account and print the resulting profile.
//!
//! Runs against an in-process mock server unless `--url` points at a live one.

use anyhow::Context;
use clap::Parser;
use std::path::PathBuf;
use tracing::{info, warn};
use wildlink_client::{
    mocks::MockServer, Config, Currency, Dispatcher, HttpDispatcher, LevelRewards, Session,
};

#[derive(Parser, Debug)]
#[command(author, version, about = "Bootstrap a fresh account")]
struct Args {
    /// Path to the YAML config file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Server base URL (defaults to an in-process mock server)
    #[arg(short, long)]
    url: Option<String>,

    /// Bearer token sent with every batch
    #[arg(short, long, requires = "url")]
    token: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Parse args
    let args = Args::parse();

    // Load config
    let config = match &args.config {
        Some(path) => {
            let contents = std::fs::read_to_string(path)
                .with_context(|| format!("could not read config file {}", path.display()))?;
            Config::from_yaml(&contents)?
        }
        None => Config::default(),
    };
    let config = config.validate()?;

    // Setup logging
    tracing_subscriber::fmt()
        .with_max_level(config.log_level)
        .init();

    match args.url {
        Some(url) => {
            info!(%url, "bootstrapping against server");
            let mut dispatcher = HttpDispatcher::new(&url)?;
            if let Some(token) = args.token {
                dispatcher = dispatcher.with_auth_token(token);
            }
            run(Session::new(dispatcher, config)).await
        }
        None => {
            info!("bootstrapping against mock server");
            run(Session::new(MockServer::new(), config)).await
        }
    }
}

async fn run<D: Dispatcher>(session: Session<D>) -> anyhow::Result<()> {
    let report = session.bootstrap().await.context("bootstrap failed")?;
    for (milestone, outcome) in &report.steps {
        info!(?milestone, ?outcome, "bootstrap step");
    }
    if !report.is_complete() {
        warn!(codename = ?report.codename, "bootstrap incomplete");
    }

    match session.accept_level_rewards(1).await? {
        LevelRewards::NotYetUnlocked => info!("level 1 rewards not yet unlocked"),
        LevelRewards::Accepted {
            result,
            items_awarded,
            ..
        } => info!(?result, awarded = items_awarded.len(), "level 1 rewards"),
    }
    let badges = session.sync_awarded_badges().await?;
    info!(equipped = ?badges.equipped, "badges synced");

    let profile = session.profile().await;
    info!(
        username = ?profile.username(),
        level = profile.current_level(),
        stardust = profile.currencies().balance(Currency::Stardust),
        pokecoin = profile.currencies().balance(Currency::Pokecoin),
        next_step = ?profile.tutorial().next_bootstrap_step(),
        "profile"
    );
    for (item_id, count) in session.inventories().await.items() {
        info!(item = item_id.0, count, "inventory");
    }
    Ok(())
}
