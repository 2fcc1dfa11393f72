//! Core chess types
//!
//! Colors, piece kinds, squares, and the move records kept in board history.

use std::fmt;

use serde::Serialize;

use crate::error::{ChessError, Result};

/// Side / color
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Color {
    White,
    Black,
}

impl Color {
    /// The other side
    pub fn opposite(&self) -> Color {
        match self {
            Color::White => Color::Black,
            Color::Black => Color::White,
        }
    }

    /// Parse the FEN side-to-move field
    pub fn from_fen_char(c: char) -> Option<Color> {
        match c {
            'w' => Some(Color::White),
            'b' => Some(Color::Black),
            _ => None,
        }
    }

    pub fn to_fen_char(&self) -> char {
        match self {
            Color::White => 'w',
            Color::Black => 'b',
        }
    }

    /// Direction of pawn travel in row terms (row 0 is rank 8)
    #[inline]
    pub fn forward(&self) -> i8 {
        match self {
            Color::White => -1,
            Color::Black => 1,
        }
    }

    /// Row of this side's back rank
    #[inline]
    pub fn home_row(&self) -> i8 {
        match self {
            Color::White => 7,
            Color::Black => 0,
        }
    }

    /// Row pawns start on
    #[inline]
    pub fn pawn_row(&self) -> i8 {
        match self {
            Color::White => 6,
            Color::Black => 1,
        }
    }

    /// Row a pawn promotes on
    #[inline]
    pub fn promotion_row(&self) -> i8 {
        match self {
            Color::White => 0,
            Color::Black => 7,
        }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Color::White => write!(f, "white"),
            Color::Black => write!(f, "black"),
        }
    }
}

/// Piece kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PieceKind {
    Pawn,
    Knight,
    Bishop,
    Rook,
    Queen,
    King,
}

impl PieceKind {
    pub const ALL: [PieceKind; 6] = [
        PieceKind::Pawn,
        PieceKind::Knight,
        PieceKind::Bishop,
        PieceKind::Rook,
        PieceKind::Queen,
        PieceKind::King,
    ];

    /// Parse a FEN letter (either case)
    pub fn from_fen_char(c: char) -> Option<PieceKind> {
        match c.to_ascii_lowercase() {
            'p' => Some(PieceKind::Pawn),
            'n' => Some(PieceKind::Knight),
            'b' => Some(PieceKind::Bishop),
            'r' => Some(PieceKind::Rook),
            'q' => Some(PieceKind::Queen),
            'k' => Some(PieceKind::King),
            _ => None,
        }
    }

    /// FEN letter (lowercase)
    pub fn to_fen_char(&self) -> char {
        match self {
            PieceKind::Pawn => 'p',
            PieceKind::Knight => 'n',
            PieceKind::Bishop => 'b',
            PieceKind::Rook => 'r',
            PieceKind::Queen => 'q',
            PieceKind::King => 'k',
        }
    }

    /// Parse a promotion choice. Only q, r, b, n are accepted.
    pub fn from_promotion_str(s: &str) -> Result<PieceKind> {
        let mut chars = s.trim().chars();
        let kind = match (chars.next(), chars.next()) {
            (Some(c), None) => PieceKind::from_fen_char(c),
            _ => match s.trim().to_ascii_lowercase().as_str() {
                "queen" => Some(PieceKind::Queen),
                "rook" => Some(PieceKind::Rook),
                "bishop" => Some(PieceKind::Bishop),
                "knight" => Some(PieceKind::Knight),
                _ => None,
            },
        };
        match kind {
            Some(k) if k.is_promotion_target() => Ok(k),
            _ => Err(ChessError::InvalidPromotion(s.to_string())),
        }
    }

    /// Kinds a pawn may promote to
    #[inline]
    pub fn is_promotion_target(&self) -> bool {
        matches!(
            self,
            PieceKind::Knight | PieceKind::Bishop | PieceKind::Rook | PieceKind::Queen
        )
    }

    /// Material value in centipawns
    pub fn value(&self) -> i32 {
        match self {
            PieceKind::Pawn => 100,
            PieceKind::Knight => 320,
            PieceKind::Bishop => 330,
            PieceKind::Rook => 500,
            PieceKind::Queen => 900,
            PieceKind::King => 20000,
        }
    }
}

impl fmt::Display for PieceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PieceKind::Pawn => "Pawn",
            PieceKind::Knight => "Knight",
            PieceKind::Bishop => "Bishop",
            PieceKind::Rook => "Rook",
            PieceKind::Queen => "Queen",
            PieceKind::King => "King",
        };
        write!(f, "{}", name)
    }
}

/// Board square (row, col)
///
/// row: 0-7 (0 is rank 8, Black's back rank; 7 is rank 1)
/// col: 0-7 (file a to h)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct Square {
    pub row: i8,
    pub col: i8,
}

impl Square {
    pub fn new(row: i8, col: i8) -> Self {
        Square { row, col }
    }

    /// Whether the square lies on the board
    #[inline]
    pub fn is_valid(&self) -> bool {
        (0..8).contains(&self.row) && (0..8).contains(&self.col)
    }

    #[inline]
    pub fn offset(&self, row_delta: i8, col_delta: i8) -> Square {
        Square {
            row: self.row + row_delta,
            col: self.col + col_delta,
        }
    }

    /// Grid index, row-major from a8
    #[inline]
    pub fn to_index(&self) -> usize {
        (self.row as usize) * 8 + self.col as usize
    }

    #[inline]
    pub fn from_index(idx: usize) -> Square {
        Square {
            row: (idx / 8) as i8,
            col: (idx % 8) as i8,
        }
    }

    /// a8 is light, so light squares have even row+col
    #[inline]
    pub fn is_light(&self) -> bool {
        (self.row + self.col) % 2 == 0
    }

    /// Parse algebraic coordinates such as "e4"
    pub fn parse(s: &str) -> Result<Square> {
        let bytes = s.trim().as_bytes();
        if bytes.len() != 2 {
            return Err(ChessError::InvalidSquare(s.to_string()));
        }
        let col = match bytes[0] {
            b'a'..=b'h' => (bytes[0] - b'a') as i8,
            _ => return Err(ChessError::InvalidSquare(s.to_string())),
        };
        let rank = match bytes[1] {
            b'1'..=b'8' => (bytes[1] - b'0') as i8,
            _ => return Err(ChessError::InvalidSquare(s.to_string())),
        };
        Ok(Square { row: 8 - rank, col })
    }

    /// Algebraic coordinates such as "e4"
    pub fn to_algebraic(&self) -> String {
        let file = (b'a' + self.col as u8) as char;
        format!("{}{}", file, 8 - self.row)
    }
}

impl fmt::Display for Square {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_algebraic())
    }
}

/// A requested move: source, destination and optional promotion choice
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Move {
    pub from: Square,
    pub to: Square,
    pub promotion: Option<PieceKind>,
}

impl Move {
    pub fn new(from: Square, to: Square) -> Self {
        Move {
            from,
            to,
            promotion: None,
        }
    }

    pub fn with_promotion(from: Square, to: Square, promotion: PieceKind) -> Self {
        Move {
            from,
            to,
            promotion: Some(promotion),
        }
    }

    /// Parse coordinate notation
    ///
    /// Format:
    /// - plain move: `e2e4`
    /// - promotion: `e7e8q` (also accepts `e7e8=Q`)
    pub fn parse(s: &str) -> Result<Move> {
        let text = s.trim();
        if !text.is_ascii() || text.len() < 4 {
            return Err(ChessError::InvalidMoveText(s.to_string()));
        }
        let from = Square::parse(&text[0..2])?;
        let to = Square::parse(&text[2..4])?;
        let rest = text[4..].trim_start_matches('=');
        let promotion = if rest.is_empty() {
            None
        } else {
            Some(PieceKind::from_promotion_str(rest)?)
        };
        Ok(Move {
            from,
            to,
            promotion,
        })
    }

    pub fn to_uci(&self) -> String {
        match self.promotion {
            Some(kind) => format!("{}{}{}", self.from, self.to, kind.to_fen_char()),
            None => format!("{}{}", self.from, self.to),
        }
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_uci())
    }
}

/// One applied move in the board's history. Never mutated once logged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MoveRecord {
    pub from: Square,
    pub to: Square,
    pub piece: PieceKind,
    pub captured: Option<PieceKind>,
    pub is_castling: bool,
    pub is_en_passant: bool,
    pub promotion: Option<PieceKind>,
}

impl MoveRecord {
    /// The move that reproduces this record when replayed
    pub fn as_move(&self) -> Move {
        Move {
            from: self.from,
            to: self.to,
            promotion: self.promotion,
        }
    }
}

impl fmt::Display for MoveRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_move())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_square_parse() {
        assert_eq!(Square::parse("a8").unwrap(), Square::new(0, 0));
        assert_eq!(Square::parse("e4").unwrap(), Square::new(4, 4));
        assert_eq!(Square::parse("h1").unwrap(), Square::new(7, 7));
        assert!(Square::parse("i1").is_err());
        assert!(Square::parse("a9").is_err());
        assert!(Square::parse("e").is_err());
    }

    #[test]
    fn test_square_to_algebraic() {
        assert_eq!(Square::new(0, 0).to_algebraic(), "a8");
        assert_eq!(Square::new(6, 4).to_algebraic(), "e2");
        assert_eq!(Square::new(7, 7).to_algebraic(), "h1");
    }

    #[test]
    fn test_square_index() {
        for idx in 0..64 {
            assert_eq!(Square::from_index(idx).to_index(), idx);
        }
    }

    #[test]
    fn test_move_parse() {
        let m = Move::parse("e2e4").unwrap();
        assert_eq!(m.from, Square::new(6, 4));
        assert_eq!(m.to, Square::new(4, 4));
        assert!(m.promotion.is_none());

        let m = Move::parse("e7e8q").unwrap();
        assert_eq!(m.promotion, Some(PieceKind::Queen));

        let m = Move::parse("b2b1=N").unwrap();
        assert_eq!(m.promotion, Some(PieceKind::Knight));
        assert_eq!(m.to_uci(), "b2b1n");
    }

    #[test]
    fn test_move_parse_rejects_bad_promotion() {
        assert!(matches!(
            Move::parse("e7e8k"),
            Err(ChessError::InvalidPromotion(_))
        ));
        assert!(matches!(
            Move::parse("e7e8x"),
            Err(ChessError::InvalidPromotion(_))
        ));
        assert!(matches!(
            Move::parse("e7"),
            Err(ChessError::InvalidMoveText(_))
        ));
    }

    #[test]
    fn test_promotion_names() {
        assert_eq!(
            PieceKind::from_promotion_str("rook").unwrap(),
            PieceKind::Rook
        );
        assert!(PieceKind::from_promotion_str("pawn").is_err());
    }
}
