//! Error types
//!
//! Parse failures and rejected moves. Search and classification never fail.

use thiserror::Error;

use crate::types::{Color, Square};

/// Errors produced at the engine boundary
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ChessError {
    /// Square text or coordinates outside the board
    #[error("Invalid square: {0}")]
    InvalidSquare(String),

    /// Promotion letter that is not one of q, r, b, n
    #[error("Invalid promotion piece: {0}")]
    InvalidPromotion(String),

    /// Malformed FEN string
    #[error("Invalid FEN: {0}")]
    InvalidFen(String),

    /// Malformed coordinate move such as "e2e4" or "e7e8q"
    #[error("Invalid move text: {0}")]
    InvalidMoveText(String),

    /// Source square is empty
    #[error("No piece at {0}")]
    NoPiece(Square),

    /// Source square holds a piece of the side not on move
    #[error("Piece at {square} belongs to {color}, not the side to move")]
    WrongTurn { square: Square, color: Color },

    /// Destination not among the piece's legal destinations
    #[error("Illegal move: {from}{to}")]
    IllegalMove { from: Square, to: Square },

    /// Replay failed at the given half-move index
    #[error("Move {index} ({text}) could not be applied: {source}")]
    Replay {
        index: usize,
        text: String,
        #[source]
        source: Box<ChessError>,
    },
}

/// Result alias used across the crate
pub type Result<T> = std::result::Result<T, ChessError>;
