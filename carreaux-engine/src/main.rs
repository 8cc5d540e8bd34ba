//! Carreaux engine binary
//!
//! Wires configuration, the session engine, and the idle-session reaper
//! together with graceful shutdown. Chat-command parsing and reply
//! rendering belong to the hosting bot, which drives `GameEngine` directly.

use anyhow::Result;
use clap::Parser;
use tokio::signal;
use tracing::info;

use carreaux_engine::{Config, GameEngine, Reaper};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    let config = Config::parse();
    config.validate()?;

    let engine = GameEngine::new(config.rules());
    let reaper = Reaper::new(
        engine.clone(),
        config.sweep_interval(),
        config.idle_timeout(),
    );
    let reaper_handle = reaper.spawn();

    info!(
        grid_size = config.grid_size,
        win_score = config.win_score,
        idle_timeout_secs = config.idle_timeout_secs,
        sweep_interval_secs = config.sweep_interval_secs,
        "carreaux engine started"
    );

    signal::ctrl_c().await?;
    info!("shutdown signal received, stopping reaper");

    reaper_handle.stop().await;
    engine.clear();
    info!("all sessions released");

    Ok(())
}
