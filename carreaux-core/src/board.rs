//! Board primitives: player markers and the play grid.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Player marker. Red always opens a fresh game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Marker {
    Red,
    Blue,
}

impl Marker {
    /// Get the opposing marker
    pub fn other(self) -> Self {
        match self {
            Marker::Red => Marker::Blue,
            Marker::Blue => Marker::Red,
        }
    }
}

impl fmt::Display for Marker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Marker::Red => write!(f, "R"),
            Marker::Blue => write!(f, "B"),
        }
    }
}

/// Square play grid with row-major cell storage.
///
/// Dimensions are fixed at construction and never change for the lifetime
/// of a game. An occupied cell is never cleared; hypothetical placements
/// (hint evaluation) are computed without touching the grid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grid {
    size: usize,
    cells: Vec<Option<Marker>>,
}

impl Grid {
    /// Create an empty grid of the given dimension
    pub fn new(size: usize) -> Self {
        Self {
            size,
            cells: vec![None; size * size],
        }
    }

    /// Grid dimension (cells per side)
    pub fn size(&self) -> usize {
        self.size
    }

    /// Cell contents at (x, y); x is the column, y the row, both in [0, size)
    pub fn cell(&self, x: usize, y: usize) -> Option<Marker> {
        self.cells[y * self.size + x]
    }

    pub(crate) fn set(&mut self, x: usize, y: usize, marker: Marker) {
        self.cells[y * self.size + x] = Some(marker);
    }

    /// Whether signed coordinates fall inside the grid
    pub fn in_bounds(&self, x: i32, y: i32) -> bool {
        x >= 0 && y >= 0 && (x as usize) < self.size && (y as usize) < self.size
    }

    /// Number of unoccupied cells
    pub fn empty_cells(&self) -> usize {
        self.cells.iter().filter(|cell| cell.is_none()).count()
    }

    /// Whether every cell is occupied
    pub fn is_full(&self) -> bool {
        self.cells.iter().all(|cell| cell.is_some())
    }
}
