//! Piece model
//!
//! A piece keeps its kind and color for life; position and movement flags
//! change as the board relocates it. Move shapes here are pseudo-legal:
//! they respect the board edge and friendly occupancy but not king safety.

use crate::board::Grid;
use crate::types::{Color, PieceKind, Square};

const KNIGHT_OFFSETS: [(i8, i8); 8] = [
    (-2, -1),
    (-2, 1),
    (-1, -2),
    (-1, 2),
    (1, -2),
    (1, 2),
    (2, -1),
    (2, 1),
];

const KING_OFFSETS: [(i8, i8); 8] = [
    (-1, -1),
    (-1, 0),
    (-1, 1),
    (0, -1),
    (0, 1),
    (1, -1),
    (1, 0),
    (1, 1),
];

const ORTHOGONALS: [(i8, i8); 4] = [(0, 1), (0, -1), (1, 0), (-1, 0)];
const DIAGONALS: [(i8, i8); 4] = [(1, 1), (1, -1), (-1, 1), (-1, -1)];

/// A chess piece on the board
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Piece {
    kind: PieceKind,
    color: Color,
    pub position: Square,
    pub has_moved: bool,
    /// Only ever set on a pawn, for the half-move right after its double step
    pub en_passant_vulnerable: bool,
}

impl Piece {
    pub fn new(kind: PieceKind, color: Color, position: Square) -> Self {
        Piece {
            kind,
            color,
            position,
            has_moved: false,
            en_passant_vulnerable: false,
        }
    }

    #[inline]
    pub fn kind(&self) -> PieceKind {
        self.kind
    }

    #[inline]
    pub fn color(&self) -> Color {
        self.color
    }

    #[inline]
    pub fn is(&self, kind: PieceKind, color: Color) -> bool {
        self.kind == kind && self.color == color
    }

    /// FEN letter: uppercase for White, lowercase for Black
    pub fn to_fen_char(&self) -> char {
        let ch = self.kind.to_fen_char();
        match self.color {
            Color::White => ch.to_ascii_uppercase(),
            Color::Black => ch,
        }
    }

    /// Pseudo-legal destinations. Castling is added by the move generator.
    pub fn possible_destinations(&self, grid: &Grid) -> Vec<Square> {
        match self.kind {
            PieceKind::Pawn => self.pawn_destinations(grid),
            PieceKind::Knight => self.step_destinations(grid, &KNIGHT_OFFSETS),
            PieceKind::Bishop => self.ray_destinations(grid, &DIAGONALS),
            PieceKind::Rook => self.ray_destinations(grid, &ORTHOGONALS),
            PieceKind::Queen => {
                let mut moves = self.ray_destinations(grid, &ORTHOGONALS);
                moves.extend(self.ray_destinations(grid, &DIAGONALS));
                moves
            }
            PieceKind::King => self.step_destinations(grid, &KING_OFFSETS),
        }
    }

    /// Whether this piece attacks `target`.
    ///
    /// Pawns attack their two forward diagonals whether or not anything
    /// stands there. Every other kind attacks exactly its pseudo-legal
    /// destinations.
    pub fn attacks(&self, grid: &Grid, target: Square) -> bool {
        if !target.is_valid() || target == self.position {
            return false;
        }
        if grid.get(target).is_some_and(|p| p.color == self.color) {
            return false;
        }
        let dr = target.row - self.position.row;
        let dc = target.col - self.position.col;
        match self.kind {
            PieceKind::Pawn => dr == self.color.forward() && dc.abs() == 1,
            PieceKind::Knight => KNIGHT_OFFSETS.contains(&(dr, dc)),
            PieceKind::King => dr.abs() <= 1 && dc.abs() <= 1,
            PieceKind::Bishop => dr.abs() == dc.abs() && self.ray_is_clear(grid, dr, dc),
            PieceKind::Rook => (dr == 0 || dc == 0) && self.ray_is_clear(grid, dr, dc),
            PieceKind::Queen => {
                (dr == 0 || dc == 0 || dr.abs() == dc.abs()) && self.ray_is_clear(grid, dr, dc)
            }
        }
    }

    /// Every square strictly between this piece and the target along a line is empty
    fn ray_is_clear(&self, grid: &Grid, dr: i8, dc: i8) -> bool {
        let (sr, sc) = (dr.signum(), dc.signum());
        let steps = dr.abs().max(dc.abs());
        (1..steps).all(|i| grid.get(self.position.offset(sr * i, sc * i)).is_none())
    }

    #[inline]
    fn can_move_to(&self, grid: &Grid, sq: Square) -> bool {
        if !sq.is_valid() {
            return false;
        }
        match grid.get(sq) {
            None => true,
            Some(target) => target.color != self.color,
        }
    }

    fn step_destinations(&self, grid: &Grid, offsets: &[(i8, i8)]) -> Vec<Square> {
        offsets
            .iter()
            .map(|&(dr, dc)| self.position.offset(dr, dc))
            .filter(|&sq| self.can_move_to(grid, sq))
            .collect()
    }

    fn ray_destinations(&self, grid: &Grid, directions: &[(i8, i8)]) -> Vec<Square> {
        let mut moves = Vec::with_capacity(14);

        for &(dr, dc) in directions {
            let mut sq = self.position.offset(dr, dc);
            while sq.is_valid() {
                match grid.get(sq) {
                    None => moves.push(sq),
                    Some(target) => {
                        if target.color != self.color {
                            moves.push(sq);
                        }
                        break;
                    }
                }
                sq = sq.offset(dr, dc);
            }
        }

        moves
    }

    fn pawn_destinations(&self, grid: &Grid) -> Vec<Square> {
        let mut moves = Vec::with_capacity(4);
        let pos = self.position;
        let forward = self.color.forward();

        // pushes
        let one = pos.offset(forward, 0);
        if one.is_valid() && grid.get(one).is_none() {
            moves.push(one);

            let two = pos.offset(2 * forward, 0);
            if !self.has_moved
                && pos.row == self.color.pawn_row()
                && two.is_valid()
                && grid.get(two).is_none()
            {
                moves.push(two);
            }
        }

        // captures, including en passant through an adjacent pawn
        for dc in [-1, 1] {
            let target = pos.offset(forward, dc);
            if !target.is_valid() {
                continue;
            }
            match grid.get(target) {
                Some(victim) => {
                    if victim.color != self.color {
                        moves.push(target);
                    }
                }
                None => {
                    let beside = pos.offset(0, dc);
                    if grid.get(beside).is_some_and(|p| {
                        p.kind == PieceKind::Pawn
                            && p.color != self.color
                            && p.en_passant_vulnerable
                    }) {
                        moves.push(target);
                    }
                }
            }
        }

        moves
    }
}
