//! Engine error taxonomy
//!
//! Both variants leave every session untouched. Unknown sessions are not
//! fatal; the dispatcher is expected to lazily create a game and retry.

use carreaux_core::MoveError;

/// Errors surfaced to the command dispatcher
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EngineError {
    #[error("invalid move: {0}")]
    InvalidMove(#[from] MoveError),
    #[error("no active game for conversation '{0}'")]
    UnknownSession(String),
}
