//! Legal move generation
//!
//! Pseudo-legal destinations come from the piece model. A destination is
//! legal when relocating the piece on a scratch copy of the grid leaves the
//! mover's king unattacked. Castling is appended here because it depends on
//! board-wide attack information.

use crate::board::{Board, CastleSide, Grid};
use crate::piece::Piece;
use crate::types::{Color, Move, PieceKind, Square};

/// Whether any piece of `by` attacks `sq`
pub fn square_attacked_by(grid: &Grid, sq: Square, by: Color) -> bool {
    grid.pieces(Some(by)).any(|p| p.attacks(grid, sq))
}

/// Simulate the raw relocation and test the mover's king
fn leaves_king_safe(grid: &Grid, piece: &Piece, to: Square) -> bool {
    let mut scratch = *grid;
    let from = piece.position;
    let Some(moving) = scratch.take(from) else {
        return false;
    };

    if moving.kind() == PieceKind::Pawn && from.col != to.col && scratch.get(to).is_none() {
        scratch.take(Square::new(from.row, to.col));
    }
    scratch.put(to, moving);

    match scratch.find_king(piece.color()) {
        Some(king) => !square_attacked_by(&scratch, king, piece.color().opposite()),
        None => true,
    }
}

impl Board {
    #[inline]
    pub fn is_square_attacked(&self, sq: Square, by: Color) -> bool {
        square_attacked_by(self.grid(), sq, by)
    }

    pub fn is_in_check(&self, color: Color) -> bool {
        self.find_king(color)
            .is_some_and(|king| self.is_square_attacked(king, color.opposite()))
    }

    /// Legal destinations for a piece, castling included
    pub fn legal_destinations(&self, piece: &Piece) -> Vec<Square> {
        let grid = self.grid();
        let mut dests: Vec<Square> = piece
            .possible_destinations(grid)
            .into_iter()
            .filter(|&to| leaves_king_safe(grid, piece, to))
            .collect();

        if piece.kind() == PieceKind::King {
            dests.extend(self.castling_destinations(piece));
        }
        dests
    }

    /// Legal destinations for whatever stands on `sq`
    pub fn legal_destinations_from(&self, sq: Square) -> Vec<Square> {
        match self.piece_at(sq) {
            Some(piece) => self.legal_destinations(piece),
            None => Vec::new(),
        }
    }

    /// Every piece of `color` paired with its legal destinations.
    /// Pieces without a legal move are omitted.
    pub fn all_legal_moves(&self, color: Color) -> Vec<(Piece, Vec<Square>)> {
        self.grid()
            .pieces(Some(color))
            .filter_map(|p| {
                let dests = self.legal_destinations(p);
                if dests.is_empty() {
                    None
                } else {
                    Some((*p, dests))
                }
            })
            .collect()
    }

    /// Flat move list. Promotions are generated as queen promotions.
    pub fn legal_moves(&self, color: Color) -> Vec<Move> {
        let mut moves = Vec::with_capacity(48);
        for (piece, dests) in self.all_legal_moves(color) {
            let promotes =
                |to: Square| piece.kind() == PieceKind::Pawn && to.row == color.promotion_row();
            for to in dests {
                if promotes(to) {
                    moves.push(Move::with_promotion(piece.position, to, PieceKind::Queen));
                } else {
                    moves.push(Move::new(piece.position, to));
                }
            }
        }
        moves
    }

    pub fn has_legal_moves(&self, color: Color) -> bool {
        self.grid()
            .pieces(Some(color))
            .any(|p| !self.legal_destinations(p).is_empty())
    }

    fn castling_destinations(&self, king: &Piece) -> Vec<Square> {
        let color = king.color();
        let home = color.home_row();
        let mut dests = Vec::new();

        if king.has_moved || king.position != Square::new(home, 4) {
            return dests;
        }
        let enemy = color.opposite();
        let rights = self.castling_rights();

        for side in [CastleSide::KingSide, CastleSide::QueenSide] {
            if !rights.has(color, side) {
                continue;
            }
            let rook_sq = Square::new(home, side.rook_col());
            let rook_ready = self
                .piece_at(rook_sq)
                .is_some_and(|r| r.is(PieceKind::Rook, color) && !r.has_moved);
            if !rook_ready {
                continue;
            }

            let (lo, hi) = if side.rook_col() > 4 {
                (5, side.rook_col())
            } else {
                (side.rook_col() + 1, 4)
            };
            if (lo..hi).any(|col| self.piece_at(Square::new(home, col)).is_some()) {
                continue;
            }

            // no castling out of, through, or into check
            let step = if side.rook_col() > 4 { 1 } else { -1 };
            let path = [4, 4 + step, side.king_target_col()];
            if path
                .iter()
                .any(|&col| self.is_square_attacked(Square::new(home, col), enemy))
            {
                continue;
            }

            dests.push(Square::new(home, side.king_target_col()));
        }
        dests
    }
}

/// Moves for perft, with every promotion choice expanded
fn perft_moves(board: &Board) -> Vec<Move> {
    let color = board.side_to_move();
    let mut moves = Vec::new();
    for mv in board.legal_moves(color) {
        if mv.promotion.is_some() {
            for kind in [
                PieceKind::Queen,
                PieceKind::Rook,
                PieceKind::Bishop,
                PieceKind::Knight,
            ] {
                moves.push(Move::with_promotion(mv.from, mv.to, kind));
            }
        } else {
            moves.push(mv);
        }
    }
    moves
}

/// Count leaf nodes of the legal move tree to `depth` plies
pub fn perft(board: &mut Board, depth: u32) -> u64 {
    if depth == 0 {
        return 1;
    }
    let moves = perft_moves(board);
    if depth == 1 {
        return moves.len() as u64;
    }

    let mut nodes = 0;
    for mv in moves {
        if let Some(undo) = board.make_move(mv) {
            nodes += perft(board, depth - 1);
            board.unmake_move(undo);
        }
    }
    nodes
}
