//! AI module
//!
//! Minimax search with an opening book in front of it.

mod book;
mod eval;
mod minimax;

pub use book::{opening_key, OpeningBook, BOOK_MAX_PLY};
pub use eval::{is_endgame, EvalBreakdown, Evaluator};
pub use minimax::{best_move, MinimaxAI, MATE_SCORE};

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};

use log::debug;
use rand::prelude::*;

use crate::board::Board;
use crate::error::Result;
use crate::types::Move;

/// Global node counter
pub static NODE_COUNT: AtomicU64 = AtomicU64::new(0);

pub fn reset_node_count() {
    NODE_COUNT.store(0, AtomicOrdering::Relaxed);
}

pub fn get_node_count() -> u64 {
    NODE_COUNT.load(AtomicOrdering::Relaxed)
}

pub const AVAILABLE_STRATEGIES: &[&str] = &["minimax"];
pub const DEFAULT_STRATEGY: &str = "minimax";

/// Difficulty level, expressed as search depth in plies
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

impl Difficulty {
    pub fn depth(&self) -> u32 {
        match self {
            Difficulty::Easy => 2,
            Difficulty::Medium => 3,
            Difficulty::Hard => 4,
        }
    }
}

impl FromStr for Difficulty {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "easy" | "2" => Ok(Difficulty::Easy),
            "medium" | "3" => Ok(Difficulty::Medium),
            "hard" | "4" => Ok(Difficulty::Hard),
            _ => Err(format!(
                "Unknown difficulty: {}. Available: easy, medium, hard",
                s
            )),
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Difficulty::Easy => "easy",
            Difficulty::Medium => "medium",
            Difficulty::Hard => "hard",
        };
        write!(f, "{}", name)
    }
}

/// AI configuration
#[derive(Debug, Clone)]
pub struct AIConfig {
    /// Search depth in plies
    pub depth: u32,
    /// Random seed; None seeds from entropy
    pub seed: Option<u64>,
    /// Consult the opening book before searching
    pub use_book: bool,
    /// Shuffle root moves so equal scores do not always pick the same move
    pub randomize: bool,
}

impl Default for AIConfig {
    fn default() -> Self {
        AIConfig {
            depth: Difficulty::Medium.depth(),
            seed: None,
            use_book: true,
            randomize: true,
        }
    }
}

impl AIConfig {
    pub fn with_difficulty(difficulty: Difficulty) -> Self {
        AIConfig {
            depth: difficulty.depth(),
            ..Default::default()
        }
    }
}

/// A move with its score
#[derive(Debug, Clone)]
pub struct ScoredMove {
    pub mv: Move,
    pub score: f64,
}

/// AI strategy interface
pub trait AIStrategy {
    /// Up to `n` moves for the side to move, best first
    fn select_moves(&mut self, board: &Board, n: usize) -> Vec<ScoredMove>;

    fn select_best_move(&mut self, board: &Board) -> Option<Move> {
        self.select_moves(board, 1).first().map(|sm| sm.mv)
    }
}

/// Sort descending by score and keep the first `n`
pub(crate) fn sort_and_truncate(scored: &mut Vec<ScoredMove>, n: usize) {
    scored.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(Ordering::Equal));
    scored.truncate(n);
}

/// AI engine - a strategy with an optional opening book in front of it
pub struct AIEngine {
    strategy: Box<dyn AIStrategy>,
    book: Option<OpeningBook>,
    rng: StdRng,
}

impl AIEngine {
    fn with_strategy(strategy: Box<dyn AIStrategy>, config: &AIConfig) -> Self {
        let rng = match config.seed {
            Some(s) => StdRng::seed_from_u64(s),
            None => StdRng::from_entropy(),
        };
        AIEngine {
            strategy,
            book: config.use_book.then(OpeningBook::new),
            rng,
        }
    }

    pub fn minimax(config: &AIConfig) -> Self {
        Self::with_strategy(Box::new(MinimaxAI::new(config)), config)
    }

    /// Create from a strategy name
    pub fn from_strategy(name: &str, config: &AIConfig) -> std::result::Result<Self, String> {
        match name.to_lowercase().as_str() {
            "minimax" | "alphabeta" => Ok(Self::minimax(config)),
            _ => Err(format!(
                "Unknown strategy: {}. Available: {}",
                name,
                AVAILABLE_STRATEGIES.join(", ")
            )),
        }
    }

    /// Replace the opening book (None disables it)
    pub fn set_book(&mut self, book: Option<OpeningBook>) {
        self.book = book;
    }

    /// Book move if one applies, otherwise the strategy's best move
    pub fn choose_move(&mut self, board: &Board) -> Option<Move> {
        if let Some(book) = &self.book {
            if let Some(mv) = book.book_move(board, &mut self.rng) {
                return Some(mv);
            }
        }
        let mv = self.strategy.select_best_move(board);
        debug!("Search chose {:?}", mv.map(|m| m.to_uci()));
        mv
    }

    /// Ranked moves from the strategy; the book is not consulted
    pub fn select_moves(&mut self, board: &Board, n: usize) -> Vec<ScoredMove> {
        self.strategy.select_moves(board, n)
    }

    /// Ranked moves for a FEN position, as coordinate text
    pub fn select_moves_fen(&mut self, fen: &str, n: usize) -> Result<Vec<(String, f64)>> {
        let board = Board::from_fen(fen)?;
        Ok(self
            .select_moves(&board, n)
            .into_iter()
            .map(|sm| (sm.mv.to_uci(), sm.score))
            .collect())
    }

    /// Chosen move for a FEN position, as coordinate text
    pub fn select_best_move_fen(&mut self, fen: &str) -> Result<Option<String>> {
        let board = Board::from_fen(fen)?;
        Ok(self.choose_move(&board).map(|m| m.to_uci()))
    }
}

pub fn strategies_help() -> String {
    format!(
        "Available strategies: {} (default: {})",
        AVAILABLE_STRATEGIES.join(", "),
        DEFAULT_STRATEGY
    )
}
