//! Chess AI Engine
//!
//! Rules engine (legal moves, castling, en passant, promotion, draw rules)
//! and a minimax / alpha-beta AI with an opening book. FEN in and out.

pub mod ai;
pub mod board;
pub mod error;
pub mod fen;
pub mod movegen;
pub mod piece;
pub mod rules;
pub mod test_positions;
pub mod types;

pub use ai::{
    get_node_count, reset_node_count, strategies_help, AIConfig, AIEngine, AIStrategy,
    Difficulty, EvalBreakdown, Evaluator, MinimaxAI, OpeningBook, ScoredMove,
    AVAILABLE_STRATEGIES, DEFAULT_STRATEGY,
};
pub use board::{Board, CastlingRights, Undo};
pub use error::{ChessError, Result};
pub use fen::placement_of;
pub use movegen::perft;
pub use piece::Piece;
pub use rules::{classify_state, winner, GameStatus};
pub use types::{Color, Move, MoveRecord, PieceKind, Square};

/// Legal moves for the side to move, as coordinate text
pub fn get_legal_moves_from_fen(fen: &str) -> Result<Vec<String>> {
    let board = Board::from_fen(fen)?;
    Ok(board
        .legal_moves(board.side_to_move())
        .iter()
        .map(Move::to_uci)
        .collect())
}

/// Apply a move to a FEN position and return the new FEN
pub fn apply_move_to_fen(fen: &str, mv: &str) -> Result<String> {
    let mut board = Board::from_fen(fen)?;
    board.try_apply_move(Move::parse(mv)?)?;
    Ok(board.to_fen())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_positions::{EARLY_1, START_FEN};

    #[test]
    fn test_legal_moves_from_fen() {
        let moves = get_legal_moves_from_fen(START_FEN).unwrap();
        assert_eq!(moves.len(), 20);
        assert!(moves.contains(&"g1f3".to_string()));
        assert!(get_legal_moves_from_fen("bad").is_err());
    }

    #[test]
    fn test_apply_move_to_fen() {
        assert_eq!(apply_move_to_fen(START_FEN, "e2e4").unwrap(), EARLY_1);
        assert!(matches!(
            apply_move_to_fen(START_FEN, "e2e5"),
            Err(ChessError::IllegalMove { .. })
        ));
        assert!(matches!(
            apply_move_to_fen(START_FEN, "e2e9"),
            Err(ChessError::InvalidSquare(_))
        ));
    }
}
