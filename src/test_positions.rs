//! Named test positions
//!
//! FEN fixtures shared by unit tests and benchmarks.
//!
//! Naming:
//! - START_FEN: initial position
//! - EARLY_n: first few moves of common openings
//! - perft reference positions by their usual names
//! - CHECK / CHECKMATE / STALEMATE / INSUFFICIENT: terminal-state fixtures
//! - tactical fixtures named after the move they test

// =============================================================================
// Openings
// =============================================================================

/// Initial position
pub const START_FEN: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

/// 1.e4
pub const EARLY_1: &str = "rnbqkbnr/pppppppp/8/8/4P3/8/PPPP1PPP/RNBQKBNR b KQkq e3 0 1";

/// 1.e4 e5 2.Nf3 Nc6
pub const EARLY_2: &str = "r1bqkbnr/pppp1ppp/2n5/4p3/4P3/5N2/PPPP1PPP/RNBQKB1R w KQkq - 2 3";

/// 1.d4 d5 2.c4 (Queen's Gambit)
pub const EARLY_3: &str = "rnbqkbnr/ppp1pppp/8/3p4/2PP4/8/PP2PPPP/RNBQKBNR b KQkq c3 0 2";

pub const EARLY_POSITIONS: [&str; 3] = [EARLY_1, EARLY_2, EARLY_3];

// =============================================================================
// Perft reference positions
// =============================================================================

/// Castling, en passant and pins everywhere
pub const KIWIPETE: &str = "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1";

/// Rook and pawn endgame with en passant discovered checks
pub const POSITION_3: &str = "8/2p5/3p4/KP5r/1R3p1k/8/4P1P1/8 w - - 0 1";

/// Promotions and checks
pub const POSITION_4: &str = "r3k2r/Pppp1ppp/1b3nbN/nP6/BBP1P3/q4N2/Pp1P2PP/R2Q1RK1 w kq - 0 1";

pub const PERFT_POSITIONS: [&str; 3] = [KIWIPETE, POSITION_3, POSITION_4];

// =============================================================================
// Game states
// =============================================================================

/// White king attacked by a rook it can capture
pub const CHECK_1: &str = "4k3/8/8/8/8/8/4r3/R3K2R w KQ - 0 1";

/// Fool's mate: 1.f3 e5 2.g4 Qh4#
pub const CHECKMATE_1: &str = "rnb1kbnr/pppp1ppp/8/4p3/6Pq/5P2/PPPPP2P/RNBQKBNR w KQkq - 1 3";

/// Black to move, no legal moves, not in check
pub const STALEMATE_1: &str = "7k/5Q2/6K1/8/8/8/8/8 b - - 0 1";

/// King and bishop against king
pub const INSUFFICIENT_1: &str = "4k3/8/8/8/8/8/8/2B1K3 w - - 0 1";

// =============================================================================
// Tactics
// =============================================================================

/// White rook wins an undefended queen: d1d5
pub const FREE_QUEEN: &str = "4k3/8/8/3q4/8/8/8/3RK3 w - - 0 1";

/// Back-rank mate in one: a1a8
pub const MATE_IN_ONE: &str = "6k1/5ppp/8/8/8/8/8/R5K1 w - - 0 1";

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::GameStatus;
    use crate::types::{MoveRecord, PieceKind};
    use crate::Board;

    #[test]
    fn test_start_position_valid() {
        let board = Board::from_fen(START_FEN);
        assert!(board.is_ok(), "START_FEN invalid: {:?}", board.err());
    }

    #[test]
    fn test_all_early_positions_valid() {
        for (i, fen) in EARLY_POSITIONS.iter().enumerate() {
            let board = Board::from_fen(fen);
            assert!(board.is_ok(), "EARLY_{} invalid: {:?}", i + 1, board.err());
        }
    }

    #[test]
    fn test_early_positions_match_replay() {
        let cases: [(&str, &[&str]); 3] = [
            (EARLY_1, &["e2e4"]),
            (EARLY_2, &["e2e4", "e7e5", "g1f3", "b8c6"]),
            (EARLY_3, &["d2d4", "d7d5", "c2c4"]),
        ];
        for (fen, moves) in cases {
            assert_eq!(Board::from_move_texts(moves).unwrap().to_fen(), fen);
        }
    }

    #[test]
    fn test_all_perft_positions_valid() {
        for (i, fen) in PERFT_POSITIONS.iter().enumerate() {
            let board = Board::from_fen(fen);
            assert!(board.is_ok(), "PERFT_{} invalid: {:?}", i + 1, board.err());
        }
    }

    #[test]
    fn test_game_state_fixtures() {
        let status = |fen: &str| Board::from_fen(fen).unwrap().game_status();
        assert_eq!(status(CHECK_1), GameStatus::Check);
        assert_eq!(status(CHECKMATE_1), GameStatus::Checkmate);
        assert_eq!(status(STALEMATE_1), GameStatus::Stalemate);
        assert_eq!(status(INSUFFICIENT_1), GameStatus::DrawInsufficient);
        assert_eq!(status(FREE_QUEEN), GameStatus::Playing);
        assert_eq!(status(MATE_IN_ONE), GameStatus::Playing);
    }

    #[test]
    fn test_replaying_move_log_reproduces_position() {
        let texts = [
            "e2e4", "d7d5", "e4d5", "c7c6", "d5c6", "g8f6", "c6b7", "e7e6", "b7a8q", "f8e7",
            "g1f3", "e8g8", "f1e2", "b8c6", "e1g1",
        ];
        let board = Board::from_move_texts(&texts).unwrap();
        let log = board.move_log();
        assert_eq!(log.iter().filter(|r| r.captured.is_some()).count(), 4);
        assert_eq!(log.iter().filter(|r| r.is_castling).count(), 2);
        assert_eq!(log[8].promotion, Some(PieceKind::Queen));

        let moves: Vec<_> = log.iter().map(MoveRecord::as_move).collect();
        let replayed = Board::from_moves(&moves).unwrap();
        assert_eq!(replayed.to_fen(), board.to_fen());
        assert_eq!(replayed.position_history(), board.position_history());
        assert_eq!(replayed.castling_rights(), board.castling_rights());
    }

    #[test]
    fn test_replay_matches_checkmate_fixture() {
        let board = Board::from_move_texts(&["f2f3", "e7e5", "g2g4", "d8h4"]).unwrap();
        assert_eq!(board.to_fen(), CHECKMATE_1);
    }
}
