//! Opening book
//!
//! Keys are built from the destination squares of the moves played so far
//! ("e4", "e4e5", "d4d5c4"); the empty game uses "start". The book is only
//! consulted during the first eight half-moves.

use std::collections::HashMap;

use log::debug;
use rand::prelude::*;

use crate::board::Board;
use crate::error::Result;
use crate::types::{Move, MoveRecord};

/// Half-moves after which the book is no longer consulted
pub const BOOK_MAX_PLY: usize = 8;

const START_KEY: &str = "start";

const DEFAULT_LINES: &[(&str, &[&str])] = &[
    (START_KEY, &["e2e4", "d2d4", "g1f3", "c2c4"]),
    // 1.e4: open game, Sicilian, French, Caro-Kann
    ("e4", &["e7e5", "c7c5", "e7e6", "c7c6"]),
    ("d4", &["d7d5", "g8f6", "g7g6"]),
    ("c4", &["e7e5", "g8f6", "c7c5"]),
    ("f3", &["d7d5", "g8f6"]),
    ("e4e5", &["g1f3", "f1c4"]),
    ("e4c5", &["g1f3", "b1c3"]),
    ("e4e5f3", &["b8c6", "g8f6"]),
    // Ruy Lopez, Italian, Scotch
    ("e4e5f3c6", &["f1b5", "f1c4", "d2d4"]),
    ("d4d5", &["c2c4", "g1f3", "b1c3"]),
    // Queen's Gambit
    ("d4d5c4", &["e7e6", "c7c6", "d5c4"]),
    ("d4d5c4e6", &["b1c3", "g1f3"]),
];

lazy_static::lazy_static! {
    static ref DEFAULT_BOOK: HashMap<String, Vec<Move>> = {
        let mut lines = HashMap::new();
        for (key, moves) in DEFAULT_LINES {
            let parsed: Vec<Move> = moves.iter().filter_map(|m| Move::parse(m).ok()).collect();
            lines.insert(key.to_string(), parsed);
        }
        lines
    };
}

/// Opening book key for a move history
pub fn opening_key(history: &[MoveRecord]) -> String {
    if history.is_empty() {
        return START_KEY.to_string();
    }
    history.iter().map(|r| r.to.to_algebraic()).collect()
}

/// Opening book
#[derive(Debug, Clone)]
pub struct OpeningBook {
    lines: HashMap<String, Vec<Move>>,
}

impl Default for OpeningBook {
    fn default() -> Self {
        OpeningBook::new()
    }
}

impl OpeningBook {
    /// Book with the built-in lines
    pub fn new() -> Self {
        OpeningBook {
            lines: DEFAULT_BOOK.clone(),
        }
    }

    pub fn empty() -> Self {
        OpeningBook {
            lines: HashMap::new(),
        }
    }

    /// Append moves to a line, creating it if needed
    pub fn add_line(&mut self, key: &str, moves: &[Move]) {
        self.lines
            .entry(key.to_string())
            .or_default()
            .extend_from_slice(moves);
    }

    /// `add_line` from coordinate-notation text
    pub fn add_line_text(&mut self, key: &str, moves: &[&str]) -> Result<()> {
        let parsed = moves
            .iter()
            .map(|m| Move::parse(m))
            .collect::<Result<Vec<_>>>()?;
        self.add_line(key, &parsed);
        Ok(())
    }

    pub fn candidates(&self, key: &str) -> &[Move] {
        self.lines.get(key).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Uniform pick among the legal book moves for this game, if any
    pub fn book_move<R: Rng>(&self, board: &Board, rng: &mut R) -> Option<Move> {
        let history = board.move_log();
        if history.len() > BOOK_MAX_PLY {
            return None;
        }

        let key = opening_key(history);
        let legal = board.legal_moves(board.side_to_move());
        let playable: Vec<Move> = self
            .candidates(&key)
            .iter()
            .filter_map(|m| {
                legal
                    .iter()
                    .find(|l| l.from == m.from && l.to == m.to)
                    .copied()
            })
            .collect();

        let choice = playable.choose(rng).copied();
        match choice {
            Some(mv) => debug!("Book move {} for key '{}'", mv, key),
            None => debug!("No book move for key '{}'", key),
        }
        choice
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rng() -> StdRng {
        StdRng::seed_from_u64(17)
    }

    #[test]
    fn test_keys() {
        assert_eq!(opening_key(&[]), "start");
        let board = Board::from_move_texts(&["e2e4", "e7e5", "g1f3"]).unwrap();
        assert_eq!(opening_key(board.move_log()), "e4e5f3");
    }

    #[test]
    fn test_start_move_comes_from_book() {
        let book = OpeningBook::new();
        let board = Board::new();
        let mut rng = rng();
        for _ in 0..20 {
            let mv = book.book_move(&board, &mut rng).unwrap();
            assert!(book.candidates("start").contains(&mv));
        }
    }

    #[test]
    fn test_reply_to_e4() {
        let book = OpeningBook::new();
        let board = Board::from_move_texts(&["e2e4"]).unwrap();
        let mv = book.book_move(&board, &mut rng()).unwrap();
        assert!(["e7e5", "c7c5", "e7e6", "c7c6"].contains(&mv.to_uci().as_str()));
    }

    #[test]
    fn test_unknown_line_falls_through() {
        let book = OpeningBook::new();
        let board = Board::from_move_texts(&["a2a3"]).unwrap();
        assert!(book.book_move(&board, &mut rng()).is_none());
    }

    #[test]
    fn test_book_stops_after_eight_plies() {
        let mut book = OpeningBook::new();
        let texts = [
            "g1f3", "g8f6", "f3g1", "f6g8", "g1f3", "g8f6", "f3g1", "f6g8", "g1f3",
        ];
        let board = Board::from_move_texts(&texts).unwrap();
        let key = opening_key(board.move_log());
        book.add_line_text(&key, &["f6g8"]).unwrap();
        assert!(book.book_move(&board, &mut rng()).is_none());

        let board = Board::from_move_texts(&texts[..8]).unwrap();
        let key = opening_key(board.move_log());
        book.add_line_text(&key, &["b1c3"]).unwrap();
        assert_eq!(
            book.book_move(&board, &mut rng()),
            Some(Move::parse("b1c3").unwrap())
        );
    }

    #[test]
    fn test_illegal_book_moves_are_skipped() {
        let mut book = OpeningBook::empty();
        book.add_line_text("start", &["e2e5", "e1e2"]).unwrap();
        assert!(book.book_move(&Board::new(), &mut rng()).is_none());

        book.add_line_text("start", &["b1c3"]).unwrap();
        assert_eq!(
            book.book_move(&Board::new(), &mut rng()),
            Some(Move::parse("b1c3").unwrap())
        );
    }

    #[test]
    fn test_every_default_line_is_playable() {
        let book = OpeningBook::new();
        for (key, moves) in DEFAULT_LINES {
            assert_eq!(book.candidates(key).len(), moves.len(), "line {}", key);
        }
        // the Queen's Gambit line is reachable and legal
        let board = Board::from_move_texts(&["d2d4", "d7d5", "c2c4"]).unwrap();
        assert!(book.book_move(&board, &mut rng()).is_some());
    }
}
