//! Static position evaluation
//!
//! Scores are in centipawns from White's perspective: positive favors White.
//! Components are material, piece-square tables, pawn structure, king pawn
//! shield and mobility.

use serde::Serialize;

use crate::board::Board;
use crate::piece::Piece;
use crate::types::{Color, PieceKind, Square};

type Table = [[i32; 8]; 8];

// Tables are written from White's side: row 0 is rank 8.

const PAWN_TABLE: Table = [
    [0, 0, 0, 0, 0, 0, 0, 0],
    [50, 50, 50, 50, 50, 50, 50, 50],
    [10, 10, 20, 30, 30, 20, 10, 10],
    [5, 5, 10, 25, 25, 10, 5, 5],
    [0, 0, 0, 20, 20, 0, 0, 0],
    [5, -5, -10, 0, 0, -10, -5, 5],
    [5, 10, 10, -20, -20, 10, 10, 5],
    [0, 0, 0, 0, 0, 0, 0, 0],
];

const KNIGHT_TABLE: Table = [
    [-50, -40, -30, -30, -30, -30, -40, -50],
    [-40, -20, 0, 0, 0, 0, -20, -40],
    [-30, 0, 10, 15, 15, 10, 0, -30],
    [-30, 5, 15, 20, 20, 15, 5, -30],
    [-30, 0, 15, 20, 20, 15, 0, -30],
    [-30, 5, 10, 15, 15, 10, 5, -30],
    [-40, -20, 0, 5, 5, 0, -20, -40],
    [-50, -40, -30, -30, -30, -30, -40, -50],
];

const BISHOP_TABLE: Table = [
    [-20, -10, -10, -10, -10, -10, -10, -20],
    [-10, 0, 0, 0, 0, 0, 0, -10],
    [-10, 0, 5, 10, 10, 5, 0, -10],
    [-10, 5, 5, 10, 10, 5, 5, -10],
    [-10, 0, 10, 10, 10, 10, 0, -10],
    [-10, 10, 10, 10, 10, 10, 10, -10],
    [-10, 5, 0, 0, 0, 0, 5, -10],
    [-20, -10, -10, -10, -10, -10, -10, -20],
];

const ROOK_TABLE: Table = [
    [0, 0, 0, 0, 0, 0, 0, 0],
    [5, 10, 10, 10, 10, 10, 10, 5],
    [-5, 0, 0, 0, 0, 0, 0, -5],
    [-5, 0, 0, 0, 0, 0, 0, -5],
    [-5, 0, 0, 0, 0, 0, 0, -5],
    [-5, 0, 0, 0, 0, 0, 0, -5],
    [-5, 0, 0, 0, 0, 0, 0, -5],
    [0, 0, 0, 5, 5, 0, 0, 0],
];

const QUEEN_TABLE: Table = [
    [-20, -10, -10, -5, -5, -10, -10, -20],
    [-10, 0, 0, 0, 0, 0, 0, -10],
    [-10, 0, 5, 5, 5, 5, 0, -10],
    [-5, 0, 5, 5, 5, 5, 0, -5],
    [0, 0, 5, 5, 5, 5, 0, -5],
    [-10, 5, 5, 5, 5, 5, 0, -10],
    [-10, 0, 5, 0, 0, 0, 0, -10],
    [-20, -10, -10, -5, -5, -10, -10, -20],
];

const KING_MIDDLE_TABLE: Table = [
    [-30, -40, -40, -50, -50, -40, -40, -30],
    [-30, -40, -40, -50, -50, -40, -40, -30],
    [-30, -40, -40, -50, -50, -40, -40, -30],
    [-30, -40, -40, -50, -50, -40, -40, -30],
    [-20, -30, -30, -40, -40, -30, -30, -20],
    [-10, -20, -20, -20, -20, -20, -20, -10],
    [20, 20, 0, 0, 0, 0, 20, 20],
    [20, 30, 10, 0, 0, 10, 30, 20],
];

const KING_END_TABLE: Table = [
    [-50, -40, -30, -20, -20, -30, -40, -50],
    [-30, -20, -10, 0, 0, -10, -20, -30],
    [-30, -10, 20, 30, 30, 20, -10, -30],
    [-30, -10, 30, 40, 40, 30, -10, -30],
    [-30, -10, 30, 40, 40, 30, -10, -30],
    [-30, -10, 20, 30, 30, 20, -10, -30],
    [-30, -30, 0, 0, 0, 0, -30, -30],
    [-50, -30, -30, -30, -30, -30, -30, -50],
];

const DOUBLED_PAWN_PENALTY: f64 = 10.0;
const ISOLATED_PAWN_PENALTY: f64 = 15.0;
const PASSED_PAWN_STEP: f64 = 10.0;
const PAWN_SHIELD_BONUS: f64 = 5.0;
const MOBILITY_WEIGHT: f64 = 0.1;

/// Pieces other than pawns and kings at or below which the game is an endgame
const ENDGAME_PIECE_LIMIT: usize = 6;

/// Per-component breakdown, for diagnostics
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct EvalBreakdown {
    pub material: f64,
    pub position: f64,
    pub pawn_structure: f64,
    pub king_safety: f64,
    pub mobility: f64,
    pub total: f64,
}

#[inline]
fn sign(color: Color) -> f64 {
    match color {
        Color::White => 1.0,
        Color::Black => -1.0,
    }
}

/// Position evaluator
#[derive(Debug, Clone, Copy, Default)]
pub struct Evaluator;

impl Evaluator {
    pub fn new() -> Self {
        Evaluator
    }

    pub fn evaluate(&self, board: &Board) -> f64 {
        self.breakdown(board).total
    }

    pub fn breakdown(&self, board: &Board) -> EvalBreakdown {
        let endgame = is_endgame(board);
        let mut b = EvalBreakdown {
            material: material(board),
            position: piece_squares(board, endgame),
            pawn_structure: pawn_structure(board),
            king_safety: if endgame { 0.0 } else { king_safety(board) },
            mobility: mobility(board),
            total: 0.0,
        };
        b.total = b.material + b.position + b.pawn_structure + b.king_safety + b.mobility;
        b
    }
}

/// No queens left, or at most six knights, bishops, rooks and queens combined
pub fn is_endgame(board: &Board) -> bool {
    let mut queens = 0;
    let mut pieces = 0;
    for p in board.grid().pieces(None) {
        match p.kind() {
            PieceKind::Queen => {
                queens += 1;
                pieces += 1;
            }
            PieceKind::Knight | PieceKind::Bishop | PieceKind::Rook => pieces += 1,
            _ => {}
        }
    }
    queens == 0 || pieces <= ENDGAME_PIECE_LIMIT
}

fn material(board: &Board) -> f64 {
    board
        .grid()
        .pieces(None)
        .map(|p| sign(p.color()) * p.kind().value() as f64)
        .sum()
}

fn table_for(kind: PieceKind, endgame: bool) -> &'static Table {
    match kind {
        PieceKind::Pawn => &PAWN_TABLE,
        PieceKind::Knight => &KNIGHT_TABLE,
        PieceKind::Bishop => &BISHOP_TABLE,
        PieceKind::Rook => &ROOK_TABLE,
        PieceKind::Queen => &QUEEN_TABLE,
        PieceKind::King if endgame => &KING_END_TABLE,
        PieceKind::King => &KING_MIDDLE_TABLE,
    }
}

/// Table bonus for one piece; Black reads the table mirrored vertically
fn square_bonus(piece: &Piece, endgame: bool) -> f64 {
    let table = table_for(piece.kind(), endgame);
    let Square { row, col } = piece.position;
    let row = match piece.color() {
        Color::White => row,
        Color::Black => 7 - row,
    };
    table[row as usize][col as usize] as f64
}

fn piece_squares(board: &Board, endgame: bool) -> f64 {
    board
        .grid()
        .pieces(None)
        .map(|p| sign(p.color()) * square_bonus(p, endgame))
        .sum()
}

fn pawn_structure(board: &Board) -> f64 {
    let mut score = 0.0;

    for color in [Color::White, Color::Black] {
        let pawns: Vec<&Piece> = board
            .grid()
            .pieces(Some(color))
            .filter(|p| p.kind() == PieceKind::Pawn)
            .collect();

        let mut files = [0u32; 8];
        for p in &pawns {
            files[p.position.col as usize] += 1;
        }

        // doubled
        let extra: u32 = files.iter().filter(|&&n| n > 1).map(|n| n - 1).sum();
        score -= sign(color) * DOUBLED_PAWN_PENALTY * extra as f64;

        for p in &pawns {
            let col = p.position.col;
            let neighbors = [col - 1, col + 1]
                .iter()
                .filter(|&&c| (0..8).contains(&c))
                .any(|&c| files[c as usize] > 0);
            if !neighbors {
                score -= sign(color) * ISOLATED_PAWN_PENALTY;
            }

            if is_passed(board, p) {
                let steps = match color {
                    Color::White => 7 - p.position.row,
                    Color::Black => p.position.row,
                };
                score += sign(color) * PASSED_PAWN_STEP * steps as f64;
            }
        }
    }

    score
}

/// No enemy pawn ahead on the same or an adjacent file
fn is_passed(board: &Board, pawn: &Piece) -> bool {
    let color = pawn.color();
    let Square { row, col } = pawn.position;
    let ahead = |r: i8| match color {
        Color::White => r < row,
        Color::Black => r > row,
    };
    !board.grid().pieces(Some(color.opposite())).any(|p| {
        p.kind() == PieceKind::Pawn && (p.position.col - col).abs() <= 1 && ahead(p.position.row)
    })
}

fn king_safety(board: &Board) -> f64 {
    let mut score = 0.0;
    for color in [Color::White, Color::Black] {
        let Some(king) = board.find_king(color) else {
            continue;
        };
        let forward = color.forward();
        let mut shield = 0.0;
        for dc in -1..=1 {
            for dr in 1..=2 {
                let sq = king.offset(forward * dr, dc);
                if board
                    .piece_at(sq)
                    .is_some_and(|p| p.is(PieceKind::Pawn, color))
                {
                    shield += PAWN_SHIELD_BONUS;
                }
            }
        }
        score += sign(color) * shield;
    }
    score
}

fn mobility(board: &Board) -> f64 {
    let count = |color: Color| -> usize {
        board
            .grid()
            .pieces(Some(color))
            .map(|p| p.possible_destinations(board.grid()).len())
            .sum()
    };
    (count(Color::White) as f64 - count(Color::Black) as f64) * MOBILITY_WEIGHT
}
