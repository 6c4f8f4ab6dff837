//! Error types for the rule engine and its configuration.
//!
//! Illegal selections during play are not errors; these variants only
//! describe caller bugs (bad coordinates, stale pieces) and bad config files.

use crate::piece::PieceId;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum EngineError {
    #[error("square ({row}, {col}) is off the board")]
    OutOfBounds { row: usize, col: usize },

    #[error("piece {id:?} is not at ({row}, {col})")]
    InvalidPiece { id: PieceId, row: usize, col: usize },

    #[error("square ({row}, {col}) is already occupied")]
    SquareOccupied { row: usize, col: usize },

    #[error("no piece ids left on this board")]
    IdsExhausted,

    #[error("inconsistent board: {0}")]
    Inconsistent(String),
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}
