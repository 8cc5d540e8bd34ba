//! Error types for move validation

/// Why a move was rejected
///
/// The game state is guaranteed untouched when one of these is returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum MoveError {
    #[error("coordinates ({x}, {y}) are outside the {size}x{size} grid")]
    OutOfBounds { x: i32, y: i32, size: usize },
    #[error("cell ({x}, {y}) is already occupied")]
    Occupied { x: i32, y: i32 },
}
