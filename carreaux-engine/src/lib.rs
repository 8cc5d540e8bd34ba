//! Carreaux session engine
//!
//! This crate hosts the per-conversation session table for the carreaux
//! game, the move orchestration consumed by an external chat-command
//! dispatcher, and the reaper that expires idle sessions.

pub mod config;
pub mod engine;
pub mod error;
pub mod reaper;

// Re-export main types
pub use config::Config;
pub use engine::{GameEngine, GameStatus, MoveOutcome, MAX_HINTS};
pub use error::EngineError;
pub use reaper::{Reaper, ReaperHandle};
