//! Minimax AI with alpha-beta pruning
//!
//! Scores come from the evaluator and are always from White's perspective:
//! White maximizes, Black minimizes. The root shuffles its candidates with
//! the strategy's own random source, so a fixed seed gives a fixed choice.
//!
//! Search runs on one private copy of the caller's board and walks the tree
//! with make/unmake.

use log::{debug, trace, warn};
use rand::prelude::*;

use super::{sort_and_truncate, AIConfig, AIStrategy, ScoredMove, NODE_COUNT};
use crate::ai::eval::Evaluator;
use crate::board::Board;
use crate::rules::GameStatus;
use crate::types::{Color, Move};
use std::sync::atomic::Ordering;

/// Score of a won position
pub const MATE_SCORE: f64 = 100000.0;

/// Minimax AI
pub struct MinimaxAI {
    depth: u32,
    rng: StdRng,
    randomize: bool,
    evaluator: Evaluator,
    nodes_searched: u64,
}

impl MinimaxAI {
    pub fn new(config: &AIConfig) -> Self {
        let rng = match config.seed {
            Some(s) => StdRng::seed_from_u64(s),
            None => StdRng::from_entropy(),
        };
        MinimaxAI {
            depth: config.depth.max(1),
            rng,
            randomize: config.randomize,
            evaluator: Evaluator::new(),
            nodes_searched: 0,
        }
    }

    pub fn depth(&self) -> u32 {
        self.depth
    }

    /// Nodes visited by the most recent search
    pub fn nodes_searched(&self) -> u64 {
        self.nodes_searched
    }

    /// Best move for `color` at the configured depth.
    ///
    /// None when `color` has no legal move, and also when `color` is not the
    /// side to move: the search never plays out of turn.
    pub fn best_move(&mut self, board: &Board, color: Color) -> Option<Move> {
        self.best_move_at_depth(board, color, self.depth)
    }

    /// Best move for `color` searching `depth` plies.
    ///
    /// None when `color` is not on move or has no legal move.
    pub fn best_move_at_depth(&mut self, board: &Board, color: Color, depth: u32) -> Option<Move> {
        self.search_root(board, color, depth.max(1)).map(|sm| sm.mv)
    }

    fn search_root(&mut self, board: &Board, color: Color, depth: u32) -> Option<ScoredMove> {
        self.nodes_searched = 0;
        if color != board.side_to_move() {
            warn!("{} asked to move but {} is on move", color, board.side_to_move());
            return None;
        }

        let mut moves = board.legal_moves(color);
        if moves.is_empty() {
            return None;
        }
        if self.randomize {
            moves.shuffle(&mut self.rng);
        }

        let maximizing = color == Color::White;
        let mut alpha = f64::NEG_INFINITY;
        let mut beta = f64::INFINITY;
        let mut best: Option<ScoredMove> = None;
        let mut scratch = board.clone();

        for mv in moves {
            let Some(undo) = scratch.make_move(mv) else {
                continue;
            };
            let score = self.minimax(&mut scratch, depth - 1, alpha, beta, !maximizing);
            scratch.unmake_move(undo);
            trace!("root {} -> {:.1}", mv, score);

            let better = match &best {
                None => true,
                Some(b) if maximizing => score > b.score,
                Some(b) => score < b.score,
            };
            if better {
                best = Some(ScoredMove { mv, score });
            }
            if maximizing {
                alpha = alpha.max(score);
            } else {
                beta = beta.min(score);
            }
        }

        if let Some(b) = &best {
            debug!(
                "Best move for {}: {} score={:.1} depth={} nodes={}",
                color, b.mv, b.score, depth, self.nodes_searched
            );
        }
        best
    }

    /// Score every root move with a full window, from White's perspective
    fn score_root_moves(&mut self, board: &Board) -> Vec<ScoredMove> {
        self.nodes_searched = 0;
        let color = board.side_to_move();
        let mut moves = board.legal_moves(color);
        if self.randomize {
            moves.shuffle(&mut self.rng);
        }

        let mut scratch = board.clone();
        let mut scored = Vec::with_capacity(moves.len());
        for mv in moves {
            let Some(undo) = scratch.make_move(mv) else {
                continue;
            };
            let score = self.minimax(
                &mut scratch,
                self.depth - 1,
                f64::NEG_INFINITY,
                f64::INFINITY,
                color == Color::Black,
            );
            scratch.unmake_move(undo);
            scored.push(ScoredMove { mv, score });
        }
        scored
    }

    fn minimax(
        &mut self,
        board: &mut Board,
        depth: u32,
        mut alpha: f64,
        mut beta: f64,
        maximizing: bool,
    ) -> f64 {
        self.nodes_searched += 1;
        NODE_COUNT.fetch_add(1, Ordering::Relaxed);

        if depth == 0 {
            return self.evaluator.evaluate(board);
        }

        let color = board.side_to_move();
        let moves = board.legal_moves(color);
        let status = board.game_status_with_moves(Some(&moves));
        if status.is_terminal() {
            return match status {
                GameStatus::Checkmate => match color {
                    // side to move is the side that got mated
                    Color::White => -MATE_SCORE,
                    Color::Black => MATE_SCORE,
                },
                _ => 0.0,
            };
        }

        if maximizing {
            let mut max_eval = f64::NEG_INFINITY;
            for mv in moves {
                let Some(undo) = board.make_move(mv) else {
                    continue;
                };
                let eval = self.minimax(board, depth - 1, alpha, beta, false);
                board.unmake_move(undo);

                max_eval = max_eval.max(eval);
                alpha = alpha.max(eval);
                if beta <= alpha {
                    break;
                }
            }
            max_eval
        } else {
            let mut min_eval = f64::INFINITY;
            for mv in moves {
                let Some(undo) = board.make_move(mv) else {
                    continue;
                };
                let eval = self.minimax(board, depth - 1, alpha, beta, true);
                board.unmake_move(undo);

                min_eval = min_eval.min(eval);
                beta = beta.min(eval);
                if beta <= alpha {
                    break;
                }
            }
            min_eval
        }
    }
}

impl AIStrategy for MinimaxAI {
    /// Scores are relative to the side to move: higher is better for it
    fn select_moves(&mut self, board: &Board, n: usize) -> Vec<ScoredMove> {
        let side = match board.side_to_move() {
            Color::White => 1.0,
            Color::Black => -1.0,
        };
        let mut scored: Vec<ScoredMove> = self
            .score_root_moves(board)
            .into_iter()
            .map(|sm| ScoredMove {
                mv: sm.mv,
                score: sm.score * side,
            })
            .collect();
        sort_and_truncate(&mut scored, n);
        scored
    }

    fn select_best_move(&mut self, board: &Board) -> Option<Move> {
        self.best_move(board, board.side_to_move())
    }
}

/// One-shot search with an explicit random source
pub fn best_move<R: Rng>(board: &Board, color: Color, depth: u32, rng: &mut R) -> Option<Move> {
    let config = AIConfig {
        depth,
        seed: Some(rng.gen()),
        ..Default::default()
    };
    MinimaxAI::new(&config).best_move(board, color)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Square;

    fn ai(depth: u32, seed: u64) -> MinimaxAI {
        MinimaxAI::new(&AIConfig {
            depth,
            seed: Some(seed),
            ..Default::default()
        })
    }

    fn mv(s: &str) -> Move {
        Move::parse(s).unwrap()
    }

    #[test]
    fn test_takes_free_queen_at_depth_one() {
        let board = Board::from_fen("4k3/8/8/3q4/8/8/8/3RK3 w - - 0 1").unwrap();
        for seed in 0..5 {
            let best = ai(1, seed).best_move(&board, Color::White).unwrap();
            assert_eq!(best, mv("d1d5"));
        }
    }

    #[test]
    fn test_black_takes_free_queen() {
        let board = Board::from_fen("3rk3/8/8/3Q4/8/8/8/4K3 b - - 0 1").unwrap();
        let best = ai(1, 7).best_move(&board, Color::Black).unwrap();
        assert_eq!(best, mv("d8d5"));
    }

    #[test]
    fn test_finds_back_rank_mate() {
        let board = Board::from_fen("6k1/5ppp/8/8/8/8/8/R5K1 w - - 0 1").unwrap();
        let best = ai(2, 3).best_move(&board, Color::White).unwrap();
        assert_eq!(best, mv("a1a8"));
    }

    #[test]
    fn test_no_move_when_mated_or_stalemated() {
        let mated = Board::from_move_texts(&["f2f3", "e7e5", "g2g4", "d8h4"]).unwrap();
        assert!(ai(2, 1).best_move(&mated, Color::White).is_none());

        let stalemate = Board::from_fen("7k/5Q2/6K1/8/8/8/8/8 b - - 0 1").unwrap();
        assert!(ai(2, 1).best_move(&stalemate, Color::Black).is_none());
    }

    #[test]
    fn test_wrong_color_returns_none() {
        let board = Board::new();
        assert!(ai(1, 1).best_move(&board, Color::Black).is_none());
    }

    #[test]
    fn test_seeded_search_is_deterministic() {
        let board = Board::new();
        let a = ai(2, 42).best_move(&board, Color::White);
        let b = ai(2, 42).best_move(&board, Color::White);
        assert!(a.is_some());
        assert_eq!(a, b);
    }

    #[test]
    fn test_search_leaves_board_untouched() {
        let board = Board::from_move_texts(&["e2e4", "e7e5", "g1f3"]).unwrap();
        let fen = board.to_fen();
        let mut engine = ai(2, 9);
        let best = engine.best_move(&board, Color::Black).unwrap();
        assert_eq!(board.to_fen(), fen);
        assert!(engine.nodes_searched() > 0);

        let mut next = board.clone();
        assert!(next.try_apply_move(best).is_ok());
    }

    #[test]
    fn test_select_moves_ranks_capture_first() {
        let board = Board::from_fen("4k3/8/8/3q4/8/8/8/3RK3 w - - 0 1").unwrap();
        let ranked = ai(1, 5).select_moves(&board, 3);
        assert_eq!(ranked.len(), 3);
        assert_eq!(ranked[0].mv, mv("d1d5"));
        assert!(ranked[0].score >= ranked[1].score);
        assert!(ranked[1].score >= ranked[2].score);
    }

    #[test]
    fn test_promotes_to_queen() {
        let board = Board::from_fen("8/4P3/8/8/8/8/k7/4K3 w - - 0 1").unwrap();
        let best = ai(1, 11).best_move(&board, Color::White).unwrap();
        assert_eq!(best.from, Square::parse("e7").unwrap());
        assert_eq!(best.to, Square::parse("e8").unwrap());
        assert_eq!(best.promotion, Some(crate::types::PieceKind::Queen));
    }

    #[test]
    fn test_free_function_with_injected_rng() {
        let board = Board::from_fen("4k3/8/8/3q4/8/8/8/3RK3 w - - 0 1").unwrap();
        let mut rng = StdRng::seed_from_u64(1);
        assert_eq!(
            best_move(&board, Color::White, 1, &mut rng),
            Some(mv("d1d5"))
        );
    }
}
