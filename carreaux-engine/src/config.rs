use anyhow::{anyhow, Result};
use carreaux_core::Rules;
use clap::Parser;
use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Parser, Debug, Clone, Serialize, Deserialize)]
#[command(name = "carreaux-engine")]
#[command(about = "Carreaux game session engine")]
#[command(long_about = "Session engine for the carreaux grid game.

Holds one game per conversation, applies moves and scoring on behalf of
the chat-command dispatcher, and sweeps sessions that have gone idle.")]
pub struct Config {
    /// Board dimension (cells per side)
    #[arg(long, env = "CARREAUX_GRID_SIZE", default_value = "5")]
    pub grid_size: usize,

    /// Points needed to win a game
    #[arg(long, env = "CARREAUX_WIN_SCORE", default_value = "5")]
    pub win_score: u32,

    /// Seconds of inactivity before a session expires
    #[arg(long, env = "CARREAUX_IDLE_TIMEOUT", default_value = "1800")]
    pub idle_timeout_secs: u64,

    /// Seconds between idle-session sweeps
    #[arg(long, env = "CARREAUX_SWEEP_INTERVAL", default_value = "300")]
    pub sweep_interval_secs: u64,
}

impl Config {
    pub fn validate(&self) -> Result<()> {
        if self.grid_size < 2 {
            return Err(anyhow!("grid_size must be at least 2"));
        }

        if self.win_score == 0 {
            return Err(anyhow!("win_score must be greater than 0"));
        }

        if self.idle_timeout_secs == 0 {
            return Err(anyhow!("idle_timeout_secs must be greater than 0"));
        }

        if self.sweep_interval_secs == 0 {
            return Err(anyhow!("sweep_interval_secs must be greater than 0"));
        }

        Ok(())
    }

    pub fn rules(&self) -> Rules {
        Rules {
            grid_size: self.grid_size,
            win_score: self.win_score,
        }
    }

    pub fn idle_timeout(&self) -> Duration {
        Duration::from_secs(self.idle_timeout_secs)
    }

    pub fn sweep_interval(&self) -> Duration {
        Duration::from_secs(self.sweep_interval_secs)
    }
}
