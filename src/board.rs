//! Chess board
//!
//! A dense 8x8 grid of pieces plus side to move, castling rights, move
//! clocks, the move log and the position history. Owns move execution,
//! including castling, en passant and promotion side effects.

use std::collections::HashMap;
use std::fmt;

use log::debug;

use crate::error::{ChessError, Result};
use crate::piece::Piece;
use crate::types::{Color, Move, MoveRecord, PieceKind, Square};

/// Back-rank layout from file a to file h
const BACK_RANK: [PieceKind; 8] = [
    PieceKind::Rook,
    PieceKind::Knight,
    PieceKind::Bishop,
    PieceKind::Queen,
    PieceKind::King,
    PieceKind::Bishop,
    PieceKind::Knight,
    PieceKind::Rook,
];

/// 8x8 piece grid, row-major from a8
///
/// Every occupied cell holds a piece whose `position` equals that cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Grid {
    squares: [Option<Piece>; 64],
}

impl Grid {
    pub fn empty() -> Self {
        Grid {
            squares: [None; 64],
        }
    }

    /// Piece on a square; None for empty or off-board squares
    #[inline]
    pub fn get(&self, sq: Square) -> Option<&Piece> {
        if !sq.is_valid() {
            return None;
        }
        self.squares[sq.to_index()].as_ref()
    }

    #[inline]
    fn get_mut(&mut self, sq: Square) -> Option<&mut Piece> {
        if !sq.is_valid() {
            return None;
        }
        self.squares[sq.to_index()].as_mut()
    }

    /// Place a piece, updating its position to match the cell
    #[inline]
    pub(crate) fn put(&mut self, sq: Square, mut piece: Piece) {
        debug_assert!(sq.is_valid());
        piece.position = sq;
        self.squares[sq.to_index()] = Some(piece);
    }

    #[inline]
    pub(crate) fn take(&mut self, sq: Square) -> Option<Piece> {
        if !sq.is_valid() {
            return None;
        }
        self.squares[sq.to_index()].take()
    }

    /// All pieces, optionally filtered by color, in a8..h1 order
    pub fn pieces(&self, color: Option<Color>) -> impl Iterator<Item = &Piece> + '_ {
        self.squares
            .iter()
            .filter_map(|p| p.as_ref())
            .filter(move |p| color.map_or(true, |c| p.color() == c))
    }

    pub fn find_king(&self, color: Color) -> Option<Square> {
        self.pieces(Some(color))
            .find(|p| p.kind() == PieceKind::King)
            .map(|p| p.position)
    }

    /// Check the position invariant for every occupied cell
    pub fn is_consistent(&self) -> bool {
        self.squares.iter().enumerate().all(|(idx, cell)| {
            cell.map_or(true, |p| p.position == Square::from_index(idx))
        })
    }
}

/// Castling side
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CastleSide {
    KingSide,
    QueenSide,
}

impl CastleSide {
    /// File the rook starts on
    pub fn rook_col(&self) -> i8 {
        match self {
            CastleSide::KingSide => 7,
            CastleSide::QueenSide => 0,
        }
    }

    /// File the king lands on
    pub fn king_target_col(&self) -> i8 {
        match self {
            CastleSide::KingSide => 6,
            CastleSide::QueenSide => 2,
        }
    }

    /// File the rook lands on
    pub fn rook_target_col(&self) -> i8 {
        match self {
            CastleSide::KingSide => 5,
            CastleSide::QueenSide => 3,
        }
    }
}

/// Four independent castling rights. Once cleared a right never returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CastlingRights {
    pub white_kingside: bool,
    pub white_queenside: bool,
    pub black_kingside: bool,
    pub black_queenside: bool,
}

impl CastlingRights {
    pub fn all() -> Self {
        CastlingRights {
            white_kingside: true,
            white_queenside: true,
            black_kingside: true,
            black_queenside: true,
        }
    }

    pub fn none() -> Self {
        CastlingRights {
            white_kingside: false,
            white_queenside: false,
            black_kingside: false,
            black_queenside: false,
        }
    }

    pub fn has(&self, color: Color, side: CastleSide) -> bool {
        match (color, side) {
            (Color::White, CastleSide::KingSide) => self.white_kingside,
            (Color::White, CastleSide::QueenSide) => self.white_queenside,
            (Color::Black, CastleSide::KingSide) => self.black_kingside,
            (Color::Black, CastleSide::QueenSide) => self.black_queenside,
        }
    }

    pub fn has_any(&self, color: Color) -> bool {
        self.has(color, CastleSide::KingSide) || self.has(color, CastleSide::QueenSide)
    }

    pub fn clear(&mut self, color: Color, side: CastleSide) {
        match (color, side) {
            (Color::White, CastleSide::KingSide) => self.white_kingside = false,
            (Color::White, CastleSide::QueenSide) => self.white_queenside = false,
            (Color::Black, CastleSide::KingSide) => self.black_kingside = false,
            (Color::Black, CastleSide::QueenSide) => self.black_queenside = false,
        }
    }

    pub fn clear_color(&mut self, color: Color) {
        self.clear(color, CastleSide::KingSide);
        self.clear(color, CastleSide::QueenSide);
    }

    /// Clear the right tied to a corner square, if `sq` is one
    pub fn clear_corner(&mut self, sq: Square) {
        for color in [Color::White, Color::Black] {
            if sq.row != color.home_row() {
                continue;
            }
            for side in [CastleSide::KingSide, CastleSide::QueenSide] {
                if sq.col == side.rook_col() {
                    self.clear(color, side);
                }
            }
        }
    }
}

/// Everything `unmake_move` needs to restore the board exactly
#[derive(Debug, Clone)]
pub struct Undo {
    record: MoveRecord,
    /// Moving piece as it stood before the move
    moved: Piece,
    captured: Option<Piece>,
    /// Castling rook as it stood before the move
    rook: Option<(Square, Piece)>,
    cleared_en_passant: Option<Square>,
    castling: CastlingRights,
    halfmove_clock: u32,
    fullmove_number: u32,
}

/// Chess board
#[derive(Debug, Clone)]
pub struct Board {
    grid: Grid,
    side_to_move: Color,
    castling: CastlingRights,
    halfmove_clock: u32,
    fullmove_number: u32,
    move_log: Vec<MoveRecord>,
    /// Full FEN after every applied move
    position_history: Vec<String>,
    /// Placement fingerprint -> occurrences in `position_history`
    repetitions: HashMap<String, u32>,
    captured_pieces: Vec<Piece>,
}

impl Default for Board {
    fn default() -> Self {
        Board::new()
    }
}

impl Board {
    /// Standard initial position
    pub fn new() -> Self {
        let mut grid = Grid::empty();
        for (col, kind) in BACK_RANK.iter().enumerate() {
            let col = col as i8;
            for color in [Color::White, Color::Black] {
                let home = Square::new(color.home_row(), col);
                grid.put(home, Piece::new(*kind, color, home));
                let pawn = Square::new(color.pawn_row(), col);
                grid.put(pawn, Piece::new(PieceKind::Pawn, color, pawn));
            }
        }
        Board::from_parts(grid, Color::White, CastlingRights::all(), 0, 1)
    }

    /// Assemble a board from an explicit position with empty history
    pub(crate) fn from_parts(
        grid: Grid,
        side_to_move: Color,
        castling: CastlingRights,
        halfmove_clock: u32,
        fullmove_number: u32,
    ) -> Self {
        Board {
            grid,
            side_to_move,
            castling,
            halfmove_clock,
            fullmove_number,
            move_log: Vec::new(),
            position_history: Vec::new(),
            repetitions: HashMap::new(),
            captured_pieces: Vec::new(),
        }
    }

    /// Rebuild a game by replaying moves from the initial position
    pub fn from_moves(moves: &[Move]) -> Result<Board> {
        let mut board = Board::new();
        for (index, mv) in moves.iter().enumerate() {
            board
                .try_apply_move(*mv)
                .map_err(|e| ChessError::Replay {
                    index,
                    text: mv.to_uci(),
                    source: Box::new(e),
                })?;
        }
        Ok(board)
    }

    /// Replay coordinate-notation moves such as `["e2e4", "e7e5"]`
    pub fn from_move_texts<S: AsRef<str>>(moves: &[S]) -> Result<Board> {
        let parsed = moves
            .iter()
            .map(|s| Move::parse(s.as_ref()))
            .collect::<Result<Vec<_>>>()?;
        Board::from_moves(&parsed)
    }

    #[inline]
    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    #[inline]
    pub fn side_to_move(&self) -> Color {
        self.side_to_move
    }

    #[inline]
    pub fn castling_rights(&self) -> CastlingRights {
        self.castling
    }

    #[inline]
    pub fn halfmove_clock(&self) -> u32 {
        self.halfmove_clock
    }

    #[inline]
    pub fn fullmove_number(&self) -> u32 {
        self.fullmove_number
    }

    pub fn move_log(&self) -> &[MoveRecord] {
        &self.move_log
    }

    pub fn position_history(&self) -> &[String] {
        &self.position_history
    }

    pub fn captured_pieces(&self) -> &[Piece] {
        &self.captured_pieces
    }

    /// How often a placement fingerprint occurs in the position history
    pub fn repetition_count(&self, placement: &str) -> u32 {
        self.repetitions.get(placement).copied().unwrap_or(0)
    }

    #[inline]
    pub fn piece_at(&self, sq: Square) -> Option<&Piece> {
        self.grid.get(sq)
    }

    pub fn get_all_pieces(&self, color: Option<Color>) -> Vec<&Piece> {
        self.grid.pieces(color).collect()
    }

    #[inline]
    pub fn find_king(&self, color: Color) -> Option<Square> {
        self.grid.find_king(color)
    }

    /// Apply a move if legal. Returns false and leaves the board untouched otherwise.
    pub fn apply_move(&mut self, from: Square, to: Square, promotion: Option<PieceKind>) -> bool {
        let mv = Move {
            from,
            to,
            promotion,
        };
        match self.try_apply_move(mv) {
            Ok(_) => true,
            Err(e) => {
                debug!("Rejected move {}: {}", mv, e);
                false
            }
        }
    }

    /// Validate and apply a move, returning its history record
    pub fn try_apply_move(&mut self, mv: Move) -> Result<MoveRecord> {
        if !mv.from.is_valid() {
            return Err(ChessError::InvalidSquare(format!("{:?}", mv.from)));
        }
        if !mv.to.is_valid() {
            return Err(ChessError::InvalidSquare(format!("{:?}", mv.to)));
        }
        if let Some(kind) = mv.promotion {
            if !kind.is_promotion_target() {
                return Err(ChessError::InvalidPromotion(kind.to_string()));
            }
        }

        let piece = *self.piece_at(mv.from).ok_or(ChessError::NoPiece(mv.from))?;
        if piece.color() != self.side_to_move {
            return Err(ChessError::WrongTurn {
                square: mv.from,
                color: piece.color(),
            });
        }
        if !self.legal_destinations(&piece).contains(&mv.to) {
            return Err(ChessError::IllegalMove {
                from: mv.from,
                to: mv.to,
            });
        }

        let undo = self
            .make_move(mv)
            .ok_or(ChessError::NoPiece(mv.from))?;
        Ok(undo.record)
    }

    /// Execute a move without legality checks.
    ///
    /// The caller guarantees `mv` is legal for the side to move. Returns None
    /// (and changes nothing) only if the source square is empty.
    pub fn make_move(&mut self, mv: Move) -> Option<Undo> {
        let color = self.side_to_move;
        let moved = self.grid.take(mv.from)?;
        let mut piece = moved;

        let castling = self.castling;
        let halfmove_clock = self.halfmove_clock;
        let fullmove_number = self.fullmove_number;

        // captured piece on the destination
        let mut captured = self.grid.take(mv.to);
        let mut is_castling = false;
        let mut is_en_passant = false;
        let mut rook = None;
        let dc = mv.to.col - mv.from.col;
        let dr = mv.to.row - mv.from.row;

        // castling moves the rook too
        if piece.kind() == PieceKind::King && dc.abs() == 2 {
            let side = if dc > 0 {
                CastleSide::KingSide
            } else {
                CastleSide::QueenSide
            };
            let rook_from = Square::new(mv.from.row, side.rook_col());
            let rook_to = Square::new(mv.from.row, side.rook_target_col());
            if let Some(original) = self.grid.take(rook_from) {
                let mut r = original;
                r.has_moved = true;
                self.grid.put(rook_to, r);
                rook = Some((rook_from, original));
                is_castling = true;
            }
        }

        // en passant removes the pawn beside the source
        if piece.kind() == PieceKind::Pawn && dc.abs() == 1 && captured.is_none() {
            let victim_sq = Square::new(mv.from.row, mv.to.col);
            if self
                .grid
                .get(victim_sq)
                .is_some_and(|p| p.kind() == PieceKind::Pawn && p.color() != color)
            {
                captured = self.grid.take(victim_sq);
                is_en_passant = true;
            }
        }

        // only the pawn that just double-stepped may be taken en passant
        let mut cleared_en_passant = None;
        for idx in 0..64 {
            let sq = Square::from_index(idx);
            if let Some(p) = self.grid.get_mut(sq) {
                if p.en_passant_vulnerable {
                    p.en_passant_vulnerable = false;
                    cleared_en_passant = Some(sq);
                }
            }
        }

        piece.has_moved = true;
        piece.en_passant_vulnerable = piece.kind() == PieceKind::Pawn && dr.abs() == 2;

        // promotion
        let mut promotion = None;
        if piece.kind() == PieceKind::Pawn && mv.to.row == color.promotion_row() {
            let kind = mv
                .promotion
                .filter(|k| k.is_promotion_target())
                .unwrap_or(PieceKind::Queen);
            let mut promoted = Piece::new(kind, color, mv.to);
            promoted.has_moved = true;
            piece = promoted;
            promotion = Some(kind);
        }
        self.grid.put(mv.to, piece);

        // castling rights
        if moved.kind() == PieceKind::King {
            self.castling.clear_color(color);
        }
        self.castling.clear_corner(mv.from);
        self.castling.clear_corner(mv.to);

        if moved.kind() == PieceKind::Pawn || captured.is_some() {
            self.halfmove_clock = 0;
        } else {
            self.halfmove_clock += 1;
        }
        if color == Color::Black {
            self.fullmove_number += 1;
        }

        let record = MoveRecord {
            from: mv.from,
            to: mv.to,
            piece: moved.kind(),
            captured: captured.map(|p| p.kind()),
            is_castling,
            is_en_passant,
            promotion,
        };
        self.move_log.push(record);
        if let Some(c) = captured {
            self.captured_pieces.push(c);
        }

        self.side_to_move = color.opposite();

        let fen = self.to_fen();
        *self
            .repetitions
            .entry(crate::fen::placement_of(&fen).to_string())
            .or_insert(0) += 1;
        self.position_history.push(fen);

        debug_assert!(self.grid.is_consistent());

        Some(Undo {
            record,
            moved,
            captured,
            rook,
            cleared_en_passant,
            castling,
            halfmove_clock,
            fullmove_number,
        })
    }

    /// Reverse the most recent `make_move`
    pub fn unmake_move(&mut self, undo: Undo) {
        if let Some(fen) = self.position_history.pop() {
            let placement = crate::fen::placement_of(&fen);
            if let Some(count) = self.repetitions.get_mut(placement) {
                *count -= 1;
                if *count == 0 {
                    self.repetitions.remove(placement);
                }
            }
        }
        self.move_log.pop();
        if undo.captured.is_some() {
            self.captured_pieces.pop();
        }

        self.side_to_move = self.side_to_move.opposite();

        let record = undo.record;
        self.grid.take(record.to);
        self.grid.put(record.from, undo.moved);

        if let Some((rook_from, original)) = undo.rook {
            let rook_to = Square::new(rook_from.row, if rook_from.col == 7 { 5 } else { 3 });
            self.grid.take(rook_to);
            self.grid.put(rook_from, original);
        }

        if let Some(captured) = undo.captured {
            self.grid.put(captured.position, captured);
        }

        if let Some(sq) = undo.cleared_en_passant {
            if let Some(p) = self.grid.get_mut(sq) {
                p.en_passant_vulnerable = true;
            }
        }

        self.castling = undo.castling;
        self.halfmove_clock = undo.halfmove_clock;
        self.fullmove_number = undo.fullmove_number;

        debug_assert!(self.grid.is_consistent());
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "  a b c d e f g h")?;
        for row in 0..8 {
            write!(f, "{} ", 8 - row)?;
            for col in 0..8 {
                match self.grid.get(Square::new(row, col)) {
                    Some(p) => write!(f, "{} ", p.to_fen_char())?,
                    None => write!(f, ". ")?,
                }
            }
            writeln!(f, "{}", 8 - row)?;
        }
        writeln!(f, "  a b c d e f g h")?;
        write!(f, "\nTurn: {}", self.side_to_move)
    }
}
