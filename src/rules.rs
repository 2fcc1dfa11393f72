//! Game rules: terminal-state classification
//!
//! Checked for the side to move in this order: checkmate, stalemate,
//! threefold repetition, fifty-move rule, insufficient material, check.

use std::fmt;

use serde::Serialize;

use crate::board::Board;
use crate::fen::placement_of;
use crate::types::{Color, Move, PieceKind};

/// Halfmove clock value that ends the game
pub const FIFTY_MOVE_LIMIT: u32 = 100;

/// Occurrences of a placement that draw the game
pub const REPETITION_LIMIT: u32 = 3;

/// Game status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GameStatus {
    Playing,
    Check,
    Checkmate,
    Stalemate,
    DrawRepetition,
    DrawFiftyMove,
    DrawInsufficient,
}

impl GameStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            GameStatus::Playing => "playing",
            GameStatus::Check => "check",
            GameStatus::Checkmate => "checkmate",
            GameStatus::Stalemate => "stalemate",
            GameStatus::DrawRepetition => "draw_repetition",
            GameStatus::DrawFiftyMove => "draw_fifty_move",
            GameStatus::DrawInsufficient => "draw_insufficient",
        }
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(self, GameStatus::Playing | GameStatus::Check)
    }

    pub fn is_draw(&self) -> bool {
        matches!(
            self,
            GameStatus::Stalemate
                | GameStatus::DrawRepetition
                | GameStatus::DrawFiftyMove
                | GameStatus::DrawInsufficient
        )
    }
}

impl fmt::Display for GameStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl Board {
    /// Classify the current position for the side to move
    pub fn game_status(&self) -> GameStatus {
        self.game_status_with_moves(None)
    }

    /// Same as `game_status`, reusing an already generated move list
    pub fn game_status_with_moves(&self, legal_moves: Option<&[Move]>) -> GameStatus {
        let color = self.side_to_move();
        let has_moves = match legal_moves {
            Some(moves) => !moves.is_empty(),
            None => self.has_legal_moves(color),
        };
        let in_check = self.is_in_check(color);

        if !has_moves {
            return if in_check {
                GameStatus::Checkmate
            } else {
                GameStatus::Stalemate
            };
        }
        if self.is_draw_by_repetition() {
            return GameStatus::DrawRepetition;
        }
        if self.halfmove_clock() >= FIFTY_MOVE_LIMIT {
            return GameStatus::DrawFiftyMove;
        }
        if self.is_insufficient_material() {
            return GameStatus::DrawInsufficient;
        }
        if in_check {
            GameStatus::Check
        } else {
            GameStatus::Playing
        }
    }

    /// The side that delivered checkmate, if any
    pub fn winner(&self) -> Option<Color> {
        match self.game_status() {
            GameStatus::Checkmate => Some(self.side_to_move().opposite()),
            _ => None,
        }
    }

    pub fn is_game_over(&self) -> bool {
        self.game_status().is_terminal()
    }

    /// Current placement occurs at least three times in the history
    pub fn is_draw_by_repetition(&self) -> bool {
        match self.position_history().last() {
            Some(fen) => self.repetition_count(placement_of(fen)) >= REPETITION_LIMIT,
            None => false,
        }
    }

    /// K v K, K+minor v K, or K+B v K+B with bishops on same-colored squares
    pub fn is_insufficient_material(&self) -> bool {
        let mut white = Vec::new();
        let mut black = Vec::new();
        for piece in self.grid().pieces(None) {
            if piece.kind() == PieceKind::King {
                continue;
            }
            match piece.color() {
                Color::White => white.push(piece),
                Color::Black => black.push(piece),
            }
        }

        let is_minor = |kind: PieceKind| matches!(kind, PieceKind::Knight | PieceKind::Bishop);

        match (white.as_slice(), black.as_slice()) {
            ([], []) => true,
            ([p], []) | ([], [p]) => is_minor(p.kind()),
            ([w], [b]) => {
                w.kind() == PieceKind::Bishop
                    && b.kind() == PieceKind::Bishop
                    && w.position.is_light() == b.position.is_light()
            }
            _ => false,
        }
    }
}

/// Classify a board; the free-function form of `Board::game_status`
pub fn classify_state(board: &Board) -> GameStatus {
    board.game_status()
}

/// Free-function form of `Board::winner`
pub fn winner(board: &Board) -> Option<Color> {
    board.winner()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Square;

    fn status(fen: &str) -> GameStatus {
        Board::from_fen(fen).unwrap().game_status()
    }

    #[test]
    fn test_initial_status() {
        let board = Board::new();
        assert_eq!(board.game_status(), GameStatus::Playing);
        assert_eq!(board.winner(), None);
        assert!(!board.is_game_over());
    }

    #[test]
    fn test_fools_mate() {
        let board = Board::from_move_texts(&["f2f3", "e7e5", "g2g4", "d8h4"]).unwrap();
        assert_eq!(board.game_status(), GameStatus::Checkmate);
        assert_eq!(board.winner(), Some(Color::Black));
        assert!(board.is_game_over());
        assert_eq!(classify_state(&board).as_str(), "checkmate");
        assert_eq!(winner(&board), Some(Color::Black));
    }

    #[test]
    fn test_queen_mate_and_check() {
        let board = Board::from_move_texts(&["e2e4", "f7f6", "d2d4", "g7g5", "d1h5"]).unwrap();
        assert_eq!(board.game_status(), GameStatus::Checkmate);

        assert_eq!(
            status("4k3/8/8/8/8/8/4r3/R3K2R w KQ - 0 1"),
            GameStatus::Check
        );
    }

    #[test]
    fn test_stalemate() {
        let board = Board::from_fen("7k/5Q2/6K1/8/8/8/8/8 b - - 0 1").unwrap();
        assert_eq!(board.game_status(), GameStatus::Stalemate);
        assert_eq!(board.winner(), None);
    }

    #[test]
    fn test_threefold_repetition() {
        let shuffle = ["g1f3", "g8f6", "f3g1", "f6g8"];
        let mut board = Board::new();
        for text in shuffle.iter().chain(shuffle.iter()) {
            assert!(board.try_apply_move(Move::parse(text).unwrap()).is_ok());
            assert_ne!(board.game_status(), GameStatus::DrawRepetition);
        }
        assert_eq!(board.repetition_count(&board.placement_fen()), 2);

        // Nf3 now appears for the third time
        assert!(board.try_apply_move(Move::parse("g1f3").unwrap()).is_ok());
        assert_eq!(board.game_status(), GameStatus::DrawRepetition);
        assert!(board.winner().is_none());

        for text in &shuffle[1..] {
            assert!(board.try_apply_move(Move::parse(text).unwrap()).is_ok());
        }
        assert_eq!(board.position_history().len(), 12);
        assert_eq!(board.placement_fen(), Board::new().placement_fen());
        assert_eq!(board.game_status(), GameStatus::DrawRepetition);
    }

    #[test]
    fn test_fifty_move_rule() {
        // rook cycles 9 squares, king rings 8: no placement is seen 3 times
        let rook = ["a1", "a2", "a3", "a4", "b4", "b3", "b2", "b1", "c1"];
        let king = ["e6", "e7", "f7", "g7", "g6", "g5", "f5", "e5"];
        let mut board = Board::from_fen("8/8/4k3/8/8/8/7K/R7 w - - 0 1").unwrap();

        for t in 1..=50 {
            for (squares, len) in [(&rook[..], 9), (&king[..], 8)] {
                assert_eq!(board.game_status(), GameStatus::Playing, "move {}", t);
                let text = format!("{}{}", squares[(t - 1) % len], squares[t % len]);
                assert!(board.try_apply_move(Move::parse(&text).unwrap()).is_ok(), "{}", text);
            }
        }
        assert_eq!(board.halfmove_clock(), 100);
        assert_eq!(board.game_status(), GameStatus::DrawFiftyMove);
        assert!(board.winner().is_none());
    }

    #[test]
    fn test_fifty_move_rule_near_limit() {
        let mut board = Board::from_fen("4k3/8/8/8/8/8/8/R3K3 w - - 90 80").unwrap();
        let quiet = [
            "a1a2", "e8d8", "a2a3", "d8c8", "a3a4", "c8d8", "a4a5", "d8c8", "a5a6", "c8d8",
        ];
        for text in quiet {
            assert_eq!(board.game_status(), GameStatus::Playing);
            assert!(board.try_apply_move(Move::parse(text).unwrap()).is_ok());
        }
        assert_eq!(board.halfmove_clock(), 100);
        assert_eq!(board.game_status(), GameStatus::DrawFiftyMove);
    }

    #[test]
    fn test_pawn_move_resets_clock() {
        let mut board = Board::from_fen("4k3/8/8/8/8/8/4P3/R3K3 w - - 99 80").unwrap();
        assert!(board.apply_move(Square::parse("e2").unwrap(), Square::parse("e4").unwrap(), None));
        assert_eq!(board.halfmove_clock(), 0);
        assert_eq!(board.game_status(), GameStatus::Playing);
    }

    #[test]
    fn test_insufficient_material() {
        assert_eq!(status("4k3/8/8/8/8/8/8/4K3 w - - 0 1"), GameStatus::DrawInsufficient);
        assert_eq!(status("4k3/8/8/8/8/8/8/2B1K3 w - - 0 1"), GameStatus::DrawInsufficient);
        assert_eq!(status("4k3/8/8/8/8/8/8/1N2K3 w - - 0 1"), GameStatus::DrawInsufficient);
        assert_eq!(status("4kn2/8/8/8/8/8/8/4K3 w - - 0 1"), GameStatus::DrawInsufficient);

        // a second minor keeps mating chances
        assert_eq!(status("4k3/8/8/8/8/8/8/1NB1K3 w - - 0 1"), GameStatus::Playing);
        assert_eq!(status("4k3/8/8/8/8/8/8/2BBK3 w - - 0 1"), GameStatus::Playing);
        assert_eq!(status("4k3/8/8/8/8/8/4P3/4K3 w - - 0 1"), GameStatus::Playing);
    }

    #[test]
    fn test_opposing_bishops() {
        // c1 and f8 are both dark squares
        assert_eq!(status("4kb2/8/8/8/8/8/8/2B1K3 w - - 0 1"), GameStatus::DrawInsufficient);
        // c1 dark, c8 light
        assert_eq!(status("2b1k3/8/8/8/8/8/8/2B1K3 w - - 0 1"), GameStatus::Playing);
    }

    #[test]
    fn test_checkmate_beats_other_draws() {
        // mate delivered with the clock already past the limit
        let board = Board::from_fen("7k/6Q1/6K1/8/8/8/8/8 b - - 120 90").unwrap();
        assert_eq!(board.game_status(), GameStatus::Checkmate);
    }

    #[test]
    fn test_status_with_precomputed_moves() {
        let board = Board::new();
        let moves = board.legal_moves(Color::White);
        assert_eq!(board.game_status_with_moves(Some(&moves)), GameStatus::Playing);
        assert_eq!(board.game_status_with_moves(Some(&[])), GameStatus::Stalemate);
    }

    #[test]
    fn test_wire_names() {
        assert_eq!(GameStatus::DrawFiftyMove.as_str(), "draw_fifty_move");
        assert_eq!(
            serde_json::to_string(&GameStatus::DrawRepetition).unwrap(),
            "\"draw_repetition\""
        );
    }
}
