//! Game state for a single carreaux session
//!
//! `GameState` holds everything one game needs: the grid, per-player
//! scores, whose turn it is, and activity timestamps. Move orchestration
//! (scoring, win/draw resolution, turn flipping) is driven by the engine
//! crate; this module provides the primitive operations it composes.

use std::time::Instant;

use serde::{Deserialize, Serialize};

use crate::board::{Grid, Marker};
use crate::error::MoveError;

/// Fixed per-game rule parameters
///
/// Captured at session creation and constant for the game's lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rules {
    /// Board dimension (cells per side)
    pub grid_size: usize,
    /// Points needed to win
    pub win_score: u32,
}

impl Default for Rules {
    fn default() -> Self {
        Self {
            grid_size: 5,
            win_score: 5,
        }
    }
}

/// Per-player point counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Score {
    pub red: u32,
    pub blue: u32,
}

impl Score {
    /// Points held by the given player
    pub fn get(&self, marker: Marker) -> u32 {
        match marker {
            Marker::Red => self.red,
            Marker::Blue => self.blue,
        }
    }

    fn add(&mut self, marker: Marker, points: u32) {
        match marker {
            Marker::Red => self.red += points,
            Marker::Blue => self.blue += points,
        }
    }
}

/// The most recently applied move
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LastMove {
    pub x: usize,
    pub y: usize,
    pub marker: Marker,
}

/// A suggested placement and the number of squares it would complete
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Hint {
    pub x: usize,
    pub y: usize,
    pub squares: u32,
}

/// Read-only snapshot of session progress
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stats {
    pub total_moves: u32,
    pub empty_cells: u32,
    pub elapsed_secs: u64,
    pub score: Score,
    pub turn: Marker,
}

impl Stats {
    /// Elapsed play time formatted as minutes and seconds, e.g. "4m 32s"
    pub fn game_time(&self) -> String {
        format!("{}m {}s", self.elapsed_secs / 60, self.elapsed_secs % 60)
    }
}

/// Complete state of one carreaux game
///
/// Invariants:
/// - the grid dimension never changes after construction
/// - an occupied cell is never cleared
/// - scores only ever increase
#[derive(Debug, Clone, PartialEq)]
pub struct GameState {
    rules: Rules,
    grid: Grid,
    score: Score,
    turn: Marker,
    move_count: u32,
    last_move: Option<LastMove>,
    started_at: Instant,
    last_activity: Instant,
}

impl GameState {
    /// Create a fresh game: empty grid, zero scores, Red to move
    pub fn new(rules: Rules) -> Self {
        let now = Instant::now();
        Self {
            rules,
            grid: Grid::new(rules.grid_size),
            score: Score::default(),
            turn: Marker::Red,
            move_count: 0,
            last_move: None,
            started_at: now,
            last_activity: now,
        }
    }

    pub fn rules(&self) -> Rules {
        self.rules
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    /// Marker whose turn it currently is
    pub fn turn(&self) -> Marker {
        self.turn
    }

    pub fn score(&self) -> Score {
        self.score
    }

    pub fn move_count(&self) -> u32 {
        self.move_count
    }

    pub fn last_move(&self) -> Option<LastMove> {
        self.last_move
    }

    /// When the last move was applied (session creation time if none yet)
    pub fn last_activity(&self) -> Instant {
        self.last_activity
    }

    /// True iff (x, y) are inside the grid and the target cell is empty.
    /// Never mutates.
    pub fn is_valid_move(&self, x: i32, y: i32) -> bool {
        self.grid.in_bounds(x, y) && self.grid.cell(x as usize, y as usize).is_none()
    }

    /// Place the current turn's marker at (x, y)
    ///
    /// Records the move, bumps the move counter, and refreshes the activity
    /// timestamp. Does not score or advance the turn; the caller composes
    /// those via [`squares_with`](Self::squares_with),
    /// [`add_score`](Self::add_score), and [`advance_turn`](Self::advance_turn).
    ///
    /// # Errors
    ///
    /// Returns `MoveError` and leaves the state untouched when the
    /// coordinates are out of bounds or the cell is occupied.
    pub fn apply_move(&mut self, x: i32, y: i32) -> Result<(), MoveError> {
        if !self.grid.in_bounds(x, y) {
            return Err(MoveError::OutOfBounds {
                x,
                y,
                size: self.grid.size(),
            });
        }
        let (cx, cy) = (x as usize, y as usize);
        if self.grid.cell(cx, cy).is_some() {
            return Err(MoveError::Occupied { x, y });
        }

        self.grid.set(cx, cy, self.turn);
        self.last_move = Some(LastMove {
            x: cx,
            y: cy,
            marker: self.turn,
        });
        self.move_count += 1;
        self.last_activity = Instant::now();
        Ok(())
    }

    /// Count the 2x2 squares completed by `marker` occupying (x, y)
    ///
    /// Examines the four candidate sub-squares anchored at (x-1, y-1),
    /// (x, y-1), (x-1, y), and (x, y); an anchor counts when it is fully on
    /// the board and all four of its corners hold `marker`. The cell at
    /// (x, y) is treated as holding `marker` whether or not it is occupied,
    /// so the same function scores a real placement and evaluates a
    /// hypothetical one without mutating the grid. The result is always in
    /// [0, 4].
    pub fn squares_with(&self, x: usize, y: usize, marker: Marker) -> u32 {
        let size = self.grid.size() as i32;
        let (px, py) = (x as i32, y as i32);
        let anchors = [(px - 1, py - 1), (px, py - 1), (px - 1, py), (px, py)];

        let mut found = 0;
        for (ax, ay) in anchors {
            if ax < 0 || ay < 0 || ax + 1 >= size || ay + 1 >= size {
                continue;
            }
            let corners = [(ax, ay), (ax + 1, ay), (ax, ay + 1), (ax + 1, ay + 1)];
            let complete = corners.iter().all(|&(cx, cy)| {
                if (cx, cy) == (px, py) {
                    true
                } else {
                    self.grid.cell(cx as usize, cy as usize) == Some(marker)
                }
            });
            if complete {
                found += 1;
            }
        }
        found
    }

    /// Suggested placements for the current player, best first
    ///
    /// Scans empty cells in row-major order, keeps those that would complete
    /// at least one square, sorts descending by square count (ties keep scan
    /// order), and returns at most `max` entries. Never mutates.
    pub fn hints(&self, max: usize) -> Vec<Hint> {
        let mut hints = Vec::new();
        for y in 0..self.grid.size() {
            for x in 0..self.grid.size() {
                if self.grid.cell(x, y).is_none() {
                    let squares = self.squares_with(x, y, self.turn);
                    if squares > 0 {
                        hints.push(Hint { x, y, squares });
                    }
                }
            }
        }
        // sort_by is stable, so equal counts keep row-major scan order
        hints.sort_by(|a, b| b.squares.cmp(&a.squares));
        hints.truncate(max);
        hints
    }

    /// Derive a progress snapshot. Pure/read-only.
    pub fn stats(&self) -> Stats {
        Stats {
            total_moves: self.move_count,
            empty_cells: self.grid.empty_cells() as u32,
            elapsed_secs: self.started_at.elapsed().as_secs(),
            score: self.score,
            turn: self.turn,
        }
    }

    /// Credit points to a player
    pub fn add_score(&mut self, marker: Marker, points: u32) {
        self.score.add(marker, points);
    }

    /// Flip the turn to the other player
    pub fn advance_turn(&mut self) {
        self.turn = self.turn.other();
    }

    /// Player who has reached the win threshold, if any
    ///
    /// A single move raises only one player's score, so at most one side can
    /// have crossed the threshold.
    pub fn winner(&self) -> Option<Marker> {
        if self.score.red >= self.rules.win_score {
            Some(Marker::Red)
        } else if self.score.blue >= self.rules.win_score {
            Some(Marker::Blue)
        } else {
            None
        }
    }

    /// Whether every cell is occupied
    pub fn is_full(&self) -> bool {
        self.grid.is_full()
    }
}
