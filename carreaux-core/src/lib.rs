//! Carreaux game rules
//!
//! Pure rules for the carreaux grid game: two players alternately place
//! markers on a square grid and score a point for every 2x2 square completed
//! in their color; first to the win threshold takes the game. This crate
//! owns board state, move validation, square detection, hint generation,
//! and progress stats. Session management, idle cleanup, and configuration
//! live in `carreaux-engine`.

pub mod board;
pub mod error;
pub mod state;

// Re-export main types for convenience
pub use board::{Grid, Marker};
pub use error::MoveError;
pub use state::{GameState, Hint, LastMove, Rules, Score, Stats};
