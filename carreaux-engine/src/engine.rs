//! Session engine for carreaux games
//!
//! `GameEngine` owns the process-wide session table, one game per
//! conversation identifier. Cloning the engine shares the table, so the
//! dispatcher and the reaper operate on the same sessions. A single table
//! lock serializes every read-modify-write: two commands for the same
//! conversation can never interleave, and a sweep can never race an
//! in-flight move.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use tracing::debug;

use carreaux_core::{GameState, Hint, Marker, Rules, Stats};

use crate::error::EngineError;

/// Number of hint entries returned per request
pub const MAX_HINTS: usize = 3;

/// Result of an accepted move
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MoveOutcome {
    /// Squares completed by this move, credited to the mover
    pub squares_formed: u32,
    pub status: GameStatus,
}

impl MoveOutcome {
    /// Whether the move ended the game (and destroyed the session)
    pub fn game_over(&self) -> bool {
        !matches!(self.status, GameStatus::InProgress { .. })
    }
}

/// Where the game stands after a move
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GameStatus {
    InProgress { next_turn: Marker },
    Won { winner: Marker, final_stats: Stats },
    Draw { final_stats: Stats },
}

/// Thread-safe session table plus the move orchestration on top of it
#[derive(Debug, Clone)]
pub struct GameEngine {
    rules: Rules,
    sessions: Arc<Mutex<HashMap<String, GameState>>>,
}

impl GameEngine {
    /// Create an engine with an empty session table
    pub fn new(rules: Rules) -> Self {
        Self {
            rules,
            sessions: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Create or reset the session for a conversation. Always succeeds;
    /// any existing game for the id is overwritten.
    pub fn new_session(&self, id: &str) {
        let mut sessions = self.sessions.lock().unwrap();
        sessions.insert(id.to_string(), GameState::new(self.rules));
        debug!(conversation = id, "session created");
    }

    pub fn has_session(&self, id: &str) -> bool {
        self.sessions.lock().unwrap().contains_key(id)
    }

    /// Cloned snapshot of a session, e.g. for board rendering
    pub fn session(&self, id: &str) -> Option<GameState> {
        self.sessions.lock().unwrap().get(id).cloned()
    }

    /// Remove a session, returning its final stats
    pub fn end_session(&self, id: &str) -> Option<Stats> {
        let removed = self.sessions.lock().unwrap().remove(id);
        if removed.is_some() {
            debug!(conversation = id, "session ended");
        }
        removed.map(|state| state.stats())
    }

    pub fn session_count(&self) -> usize {
        self.sessions.lock().unwrap().len()
    }

    /// Drop every session. Called on process shutdown.
    pub fn clear(&self) {
        self.sessions.lock().unwrap().clear();
    }

    /// Validate and apply one move for a conversation
    ///
    /// The full move flow the dispatcher must not re-implement: place the
    /// current player's marker, count the squares it completes, credit the
    /// mover, then resolve the game end. The win check runs before the draw
    /// check, so a move that fills the grid while reaching the threshold
    /// declares a winner. Terminal moves destroy the session after
    /// producing final stats; otherwise the turn flips.
    ///
    /// # Errors
    ///
    /// `InvalidMove` for out-of-bounds or occupied coordinates and
    /// `UnknownSession` when no game exists; neither mutates anything.
    pub fn apply_move(&self, id: &str, x: i32, y: i32) -> Result<MoveOutcome, EngineError> {
        let mut sessions = self.sessions.lock().unwrap();
        let state = sessions
            .get_mut(id)
            .ok_or_else(|| EngineError::UnknownSession(id.to_string()))?;

        let mover = state.turn();
        state.apply_move(x, y)?;

        let squares_formed = state.squares_with(x as usize, y as usize, mover);
        if squares_formed > 0 {
            state.add_score(mover, squares_formed);
        }
        debug!(
            conversation = id,
            x,
            y,
            marker = %mover,
            squares_formed,
            "move applied"
        );

        if let Some(winner) = state.winner() {
            let final_stats = state.stats();
            sessions.remove(id);
            debug!(conversation = id, winner = %winner, "game won");
            return Ok(MoveOutcome {
                squares_formed,
                status: GameStatus::Won {
                    winner,
                    final_stats,
                },
            });
        }

        if state.is_full() {
            let final_stats = state.stats();
            sessions.remove(id);
            debug!(conversation = id, "game drawn");
            return Ok(MoveOutcome {
                squares_formed,
                status: GameStatus::Draw { final_stats },
            });
        }

        state.advance_turn();
        let next_turn = state.turn();
        Ok(MoveOutcome {
            squares_formed,
            status: GameStatus::InProgress { next_turn },
        })
    }

    /// Up to [`MAX_HINTS`] suggested placements for the current player
    pub fn hints(&self, id: &str) -> Result<Vec<Hint>, EngineError> {
        let sessions = self.sessions.lock().unwrap();
        let state = sessions
            .get(id)
            .ok_or_else(|| EngineError::UnknownSession(id.to_string()))?;
        Ok(state.hints(MAX_HINTS))
    }

    /// Progress snapshot for a conversation's game
    pub fn stats(&self, id: &str) -> Result<Stats, EngineError> {
        let sessions = self.sessions.lock().unwrap();
        let state = sessions
            .get(id)
            .ok_or_else(|| EngineError::UnknownSession(id.to_string()))?;
        Ok(state.stats())
    }

    /// Remove sessions whose last activity is older than `idle_timeout`
    /// at `now`, returning how many were removed
    pub fn sweep_idle(&self, now: Instant, idle_timeout: Duration) -> usize {
        let mut sessions = self.sessions.lock().unwrap();
        let before = sessions.len();
        sessions.retain(|_, state| now.duration_since(state.last_activity()) <= idle_timeout);
        before - sessions.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use carreaux_core::MoveError;

    fn engine_with_rules(grid_size: usize, win_score: u32) -> GameEngine {
        GameEngine::new(Rules {
            grid_size,
            win_score,
        })
    }

    #[test]
    fn test_session_lifecycle() {
        let engine = GameEngine::new(Rules::default());
        assert!(!engine.has_session("chat-1"));
        assert_eq!(engine.session_count(), 0);

        engine.new_session("chat-1");
        assert!(engine.has_session("chat-1"));
        assert_eq!(engine.session_count(), 1);

        let stats = engine.end_session("chat-1").unwrap();
        assert_eq!(stats.total_moves, 0);
        assert!(!engine.has_session("chat-1"));
        assert_eq!(engine.end_session("chat-1"), None);
    }

    #[test]
    fn test_new_session_overwrites_existing() {
        let engine = GameEngine::new(Rules::default());
        engine.new_session("chat-1");
        engine.apply_move("chat-1", 0, 0).unwrap();
        assert_eq!(engine.stats("chat-1").unwrap().total_moves, 1);

        engine.new_session("chat-1");
        let stats = engine.stats("chat-1").unwrap();
        assert_eq!(stats.total_moves, 0);
        assert_eq!(stats.turn, Marker::Red);
    }

    #[test]
    fn test_unknown_session_errors() {
        let engine = GameEngine::new(Rules::default());
        assert_eq!(
            engine.apply_move("nobody", 0, 0),
            Err(EngineError::UnknownSession("nobody".to_string()))
        );
        assert_eq!(
            engine.hints("nobody"),
            Err(EngineError::UnknownSession("nobody".to_string()))
        );
        assert_eq!(
            engine.stats("nobody"),
            Err(EngineError::UnknownSession("nobody".to_string()))
        );
    }

    #[test]
    fn test_invalid_move_rejected_without_mutation() {
        let engine = GameEngine::new(Rules::default());
        engine.new_session("chat-1");
        engine.apply_move("chat-1", 2, 2).unwrap();

        let before = engine.session("chat-1").unwrap();

        // Out of bounds
        assert_eq!(
            engine.apply_move("chat-1", 9, 9),
            Err(EngineError::InvalidMove(MoveError::OutOfBounds {
                x: 9,
                y: 9,
                size: 5
            }))
        );
        // Occupied
        assert_eq!(
            engine.apply_move("chat-1", 2, 2),
            Err(EngineError::InvalidMove(MoveError::Occupied { x: 2, y: 2 }))
        );

        let after = engine.session("chat-1").unwrap();
        assert_eq!(after, before);
        assert_eq!(after.turn(), Marker::Blue); // Unchanged by the rejections
    }

    #[test]
    fn test_turn_alternates_on_accepted_moves() {
        let engine = GameEngine::new(Rules::default());
        engine.new_session("chat-1");

        let outcome = engine.apply_move("chat-1", 0, 0).unwrap();
        assert_eq!(outcome.squares_formed, 0);
        assert_eq!(
            outcome.status,
            GameStatus::InProgress {
                next_turn: Marker::Blue
            }
        );

        let outcome = engine.apply_move("chat-1", 1, 1).unwrap();
        assert_eq!(
            outcome.status,
            GameStatus::InProgress {
                next_turn: Marker::Red
            }
        );
    }

    #[test]
    fn test_square_completion_scores_the_mover() {
        let engine = GameEngine::new(Rules::default());
        engine.new_session("chat-1");

        // Red builds the square anchored at (0, 0); Blue plays far away
        engine.apply_move("chat-1", 0, 0).unwrap(); // R
        engine.apply_move("chat-1", 3, 3).unwrap(); // B
        engine.apply_move("chat-1", 1, 0).unwrap(); // R
        engine.apply_move("chat-1", 4, 3).unwrap(); // B
        engine.apply_move("chat-1", 0, 1).unwrap(); // R
        engine.apply_move("chat-1", 3, 4).unwrap(); // B

        let outcome = engine.apply_move("chat-1", 1, 1).unwrap(); // R completes
        assert_eq!(outcome.squares_formed, 1);
        assert!(!outcome.game_over());

        let stats = engine.stats("chat-1").unwrap();
        assert_eq!(stats.score.red, 1);
        assert_eq!(stats.score.blue, 0);
    }

    #[test]
    fn test_win_destroys_session() {
        let engine = engine_with_rules(5, 1);
        engine.new_session("chat-1");

        engine.apply_move("chat-1", 0, 0).unwrap(); // R
        engine.apply_move("chat-1", 3, 3).unwrap(); // B
        engine.apply_move("chat-1", 1, 0).unwrap(); // R
        engine.apply_move("chat-1", 4, 3).unwrap(); // B
        engine.apply_move("chat-1", 0, 1).unwrap(); // R
        engine.apply_move("chat-1", 3, 4).unwrap(); // B

        let outcome = engine.apply_move("chat-1", 1, 1).unwrap();
        assert_eq!(outcome.squares_formed, 1);
        assert!(outcome.game_over());
        match outcome.status {
            GameStatus::Won {
                winner,
                final_stats,
            } => {
                assert_eq!(winner, Marker::Red);
                assert_eq!(final_stats.score.red, 1);
                assert_eq!(final_stats.total_moves, 7);
            }
            other => panic!("expected a win, got {:?}", other),
        }
        assert!(!engine.has_session("chat-1"));
    }

    #[test]
    fn test_full_grid_without_winner_is_a_draw() {
        // On a 2x2 board the alternating fill can never produce a
        // same-colored square
        let engine = engine_with_rules(2, 5);
        engine.new_session("chat-1");

        engine.apply_move("chat-1", 0, 0).unwrap(); // R
        engine.apply_move("chat-1", 1, 0).unwrap(); // B
        engine.apply_move("chat-1", 0, 1).unwrap(); // R
        let outcome = engine.apply_move("chat-1", 1, 1).unwrap(); // B fills

        assert!(outcome.game_over());
        match outcome.status {
            GameStatus::Draw { final_stats } => {
                assert_eq!(final_stats.total_moves, 4);
                assert_eq!(final_stats.empty_cells, 0);
                assert_eq!(final_stats.score.red, 0);
                assert_eq!(final_stats.score.blue, 0);
            }
            other => panic!("expected a draw, got {:?}", other),
        }
        assert!(!engine.has_session("chat-1"));
    }

    #[test]
    fn test_win_takes_precedence_over_draw() {
        // Red's ninth move fills the 3x3 board and completes a square at
        // the same time; the winner is declared, not a draw.
        let engine = engine_with_rules(3, 1);
        engine.new_session("chat-1");

        engine.apply_move("chat-1", 0, 0).unwrap(); // R
        engine.apply_move("chat-1", 2, 0).unwrap(); // B
        engine.apply_move("chat-1", 1, 0).unwrap(); // R
        engine.apply_move("chat-1", 2, 1).unwrap(); // B
        engine.apply_move("chat-1", 0, 1).unwrap(); // R
        engine.apply_move("chat-1", 0, 2).unwrap(); // B
        engine.apply_move("chat-1", 1, 2).unwrap(); // R
        engine.apply_move("chat-1", 2, 2).unwrap(); // B

        let outcome = engine.apply_move("chat-1", 1, 1).unwrap(); // R
        assert_eq!(outcome.squares_formed, 1);
        match outcome.status {
            GameStatus::Won { winner, .. } => assert_eq!(winner, Marker::Red),
            other => panic!("expected a win, got {:?}", other),
        }
    }

    #[test]
    fn test_hints_through_engine() {
        let engine = GameEngine::new(Rules::default());
        engine.new_session("chat-1");
        assert!(engine.hints("chat-1").unwrap().is_empty());

        engine.apply_move("chat-1", 0, 0).unwrap(); // R
        engine.apply_move("chat-1", 3, 3).unwrap(); // B
        engine.apply_move("chat-1", 1, 0).unwrap(); // R
        engine.apply_move("chat-1", 4, 4).unwrap(); // B
        engine.apply_move("chat-1", 0, 1).unwrap(); // R
        engine.apply_move("chat-1", 4, 0).unwrap(); // B

        // Red to move: (1, 1) completes the square anchored at (0, 0)
        let hints = engine.hints("chat-1").unwrap();
        assert_eq!(hints.len(), 1);
        assert_eq!((hints[0].x, hints[0].y, hints[0].squares), (1, 1, 1));

        // Hint generation leaves the session untouched
        let stats = engine.stats("chat-1").unwrap();
        assert_eq!(stats.total_moves, 6);
        assert_eq!(stats.empty_cells, 19);
    }

    #[test]
    fn test_sweep_idle_removes_only_stale_sessions() {
        let engine = GameEngine::new(Rules::default());
        engine.new_session("stale");
        engine.new_session("fresh");

        let idle_timeout = Duration::from_secs(1800);

        // Both sessions were just created, nothing is stale yet
        assert_eq!(engine.sweep_idle(Instant::now(), idle_timeout), 0);
        assert_eq!(engine.session_count(), 2);

        // From the vantage point of 31 minutes later both have expired
        let later = Instant::now() + Duration::from_secs(31 * 60);
        assert_eq!(engine.sweep_idle(later, idle_timeout), 2);
        assert_eq!(engine.session_count(), 0);
    }

    #[test]
    fn test_sweep_retains_recently_active_session() {
        let engine = GameEngine::new(Rules::default());
        engine.new_session("chat-1");

        // A move refreshes the activity timestamp
        engine.apply_move("chat-1", 0, 0).unwrap();

        assert_eq!(
            engine.sweep_idle(Instant::now(), Duration::from_secs(1800)),
            0
        );
        assert!(engine.has_session("chat-1"));
    }

    #[test]
    fn test_clones_share_the_session_table() {
        let engine = GameEngine::new(Rules::default());
        let other = engine.clone();

        engine.new_session("chat-1");
        assert!(other.has_session("chat-1"));

        other.clear();
        assert_eq!(engine.session_count(), 0);
    }

    #[test]
    fn test_independent_conversations() {
        let engine = GameEngine::new(Rules::default());
        engine.new_session("chat-1");
        engine.new_session("chat-2");

        engine.apply_move("chat-1", 0, 0).unwrap();

        assert_eq!(engine.stats("chat-1").unwrap().total_moves, 1);
        assert_eq!(engine.stats("chat-2").unwrap().total_moves, 0);
        assert_eq!(engine.stats("chat-2").unwrap().turn, Marker::Red);
    }
}
