//! FEN parsing and generation
//!
//! Format: `<placement> <side> <castling> <en-passant> [<halfmove> <fullmove>]`
//!
//! Placement symbols:
//! - White: K Q R B N P
//! - Black: k q r b n p
//! - Empty squares: digits 1-8
//!
//! The placement field alone is the repetition fingerprint.

use crate::board::{Board, CastleSide, CastlingRights, Grid};
use crate::error::{ChessError, Result};
use crate::piece::Piece;
use crate::types::{Color, PieceKind, Square};

/// Placement field of a FEN string
pub fn placement_of(fen: &str) -> &str {
    fen.split_whitespace().next().unwrap_or("")
}

impl Board {
    /// Serialize the full position
    pub fn to_fen(&self) -> String {
        let ep = self
            .grid()
            .pieces(None)
            .find(|p| p.en_passant_vulnerable)
            .map(|p| p.position.offset(-p.color().forward(), 0).to_algebraic())
            .unwrap_or_else(|| "-".to_string());

        format!(
            "{} {} {} {} {} {}",
            self.placement_fen(),
            self.side_to_move().to_fen_char(),
            castling_to_fen(&self.castling_rights()),
            ep,
            self.halfmove_clock(),
            self.fullmove_number()
        )
    }

    /// Piece placement only
    pub fn placement_fen(&self) -> String {
        let mut rows = Vec::with_capacity(8);
        for row in 0..8 {
            let mut line = String::new();
            let mut empty = 0;
            for col in 0..8 {
                match self.piece_at(Square::new(row, col)) {
                    Some(p) => {
                        if empty > 0 {
                            line.push_str(&empty.to_string());
                            empty = 0;
                        }
                        line.push(p.to_fen_char());
                    }
                    None => empty += 1,
                }
            }
            if empty > 0 {
                line.push_str(&empty.to_string());
            }
            rows.push(line);
        }
        rows.join("/")
    }

    /// Build a board from FEN. Move counters are optional and default to `0 1`.
    pub fn from_fen(fen: &str) -> Result<Board> {
        let parts: Vec<&str> = fen.split_whitespace().collect();
        if parts.len() != 4 && parts.len() != 6 {
            return Err(ChessError::InvalidFen(format!(
                "expected 4 or 6 fields, got {}: {}",
                parts.len(),
                fen
            )));
        }

        let mut grid = parse_placement(parts[0])?;

        let mut side_chars = parts[1].chars();
        let side_to_move = match (side_chars.next(), side_chars.next()) {
            (Some(c), None) => Color::from_fen_char(c),
            _ => None,
        }
        .ok_or_else(|| ChessError::InvalidFen(format!("invalid side to move: {}", parts[1])))?;

        let castling = parse_castling(parts[2])?;

        let (halfmove_clock, fullmove_number) = if parts.len() == 6 {
            let half = parts[4]
                .parse::<u32>()
                .map_err(|_| ChessError::InvalidFen(format!("invalid halfmove clock: {}", parts[4])))?;
            let full = parts[5]
                .parse::<u32>()
                .map_err(|_| ChessError::InvalidFen(format!("invalid fullmove number: {}", parts[5])))?;
            (half, full.max(1))
        } else {
            (0, 1)
        };

        for color in [Color::White, Color::Black] {
            let kings = grid
                .pieces(Some(color))
                .filter(|p| p.kind() == PieceKind::King)
                .count();
            if kings != 1 {
                return Err(ChessError::InvalidFen(format!(
                    "{} has {} kings",
                    color, kings
                )));
            }
        }

        derive_moved_flags(&mut grid, &castling);

        if parts[3] != "-" {
            let target = Square::parse(parts[3])
                .map_err(|_| ChessError::InvalidFen(format!("invalid en passant: {}", parts[3])))?;
            let mover = side_to_move.opposite();
            let pawn_sq = target.offset(mover.forward(), 0);
            match grid.get(pawn_sq).copied() {
                Some(mut pawn) if pawn.is(PieceKind::Pawn, mover) => {
                    pawn.en_passant_vulnerable = true;
                    pawn.has_moved = true;
                    grid.put(pawn_sq, pawn);
                }
                _ => {
                    return Err(ChessError::InvalidFen(format!(
                        "no {} pawn behind en passant square {}",
                        mover, target
                    )))
                }
            }
        }

        Ok(Board::from_parts(
            grid,
            side_to_move,
            castling,
            halfmove_clock,
            fullmove_number,
        ))
    }
}

fn parse_placement(s: &str) -> Result<Grid> {
    let rows: Vec<&str> = s.split('/').collect();
    if rows.len() != 8 {
        return Err(ChessError::InvalidFen(format!(
            "expected 8 ranks, got {}",
            rows.len()
        )));
    }

    let mut grid = Grid::empty();
    for (row, line) in rows.iter().enumerate() {
        let mut col = 0i8;
        for ch in line.chars() {
            if let Some(n) = ch.to_digit(10) {
                if !(1..=8).contains(&n) {
                    return Err(ChessError::InvalidFen(format!("bad empty count '{}'", ch)));
                }
                col += n as i8;
            } else {
                let kind = PieceKind::from_fen_char(ch)
                    .ok_or_else(|| ChessError::InvalidFen(format!("unknown piece '{}'", ch)))?;
                let color = if ch.is_ascii_uppercase() {
                    Color::White
                } else {
                    Color::Black
                };
                if col >= 8 {
                    return Err(ChessError::InvalidFen(format!("rank {} too long", 8 - row)));
                }
                let sq = Square::new(row as i8, col);
                grid.put(sq, Piece::new(kind, color, sq));
                col += 1;
            }
            if col > 8 {
                return Err(ChessError::InvalidFen(format!("rank {} too long", 8 - row)));
            }
        }
        if col != 8 {
            return Err(ChessError::InvalidFen(format!("rank {} too short", 8 - row)));
        }
    }
    Ok(grid)
}

fn parse_castling(s: &str) -> Result<CastlingRights> {
    let mut rights = CastlingRights::none();
    if s == "-" {
        return Ok(rights);
    }
    for ch in s.chars() {
        match ch {
            'K' => rights.white_kingside = true,
            'Q' => rights.white_queenside = true,
            'k' => rights.black_kingside = true,
            'q' => rights.black_queenside = true,
            _ => {
                return Err(ChessError::InvalidFen(format!(
                    "invalid castling rights: {}",
                    s
                )))
            }
        }
    }
    Ok(rights)
}

fn castling_to_fen(rights: &CastlingRights) -> String {
    let mut s = String::new();
    if rights.white_kingside {
        s.push('K');
    }
    if rights.white_queenside {
        s.push('Q');
    }
    if rights.black_kingside {
        s.push('k');
    }
    if rights.black_queenside {
        s.push('q');
    }
    if s.is_empty() {
        s.push('-');
    }
    s
}

/// FEN carries no move history, so infer it: pawns off their start rank have
/// moved, and kings or rooks without a matching castling right count as moved.
fn derive_moved_flags(grid: &mut Grid, castling: &CastlingRights) {
    let pieces: Vec<Piece> = grid.pieces(None).copied().collect();
    for mut piece in pieces {
        let color = piece.color();
        let pos = piece.position;
        piece.has_moved = match piece.kind() {
            PieceKind::Pawn => pos.row != color.pawn_row(),
            PieceKind::King => {
                !(pos == Square::new(color.home_row(), 4) && castling.has_any(color))
            }
            PieceKind::Rook => ![CastleSide::KingSide, CastleSide::QueenSide]
                .iter()
                .any(|side| {
                    pos == Square::new(color.home_row(), side.rook_col())
                        && castling.has(color, *side)
                }),
            _ => false,
        };
        grid.put(pos, piece);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_positions::{KIWIPETE, START_FEN};

    #[test]
    fn test_initial_fen() {
        assert_eq!(Board::new().to_fen(), START_FEN);
    }

    #[test]
    fn test_parse_start_matches_new() {
        let parsed = Board::from_fen(START_FEN).unwrap();
        assert_eq!(parsed.grid(), Board::new().grid());
        assert_eq!(parsed.side_to_move(), Color::White);
        assert_eq!(parsed.castling_rights(), CastlingRights::all());
    }

    #[test]
    fn test_fen_roundtrip() {
        for fen in [
            START_FEN,
            KIWIPETE,
            "8/2p5/3p4/KP5r/1R3p1k/8/4P1P1/8 w - - 0 1",
            "rnbqkbnr/ppp1p1pp/8/3pPp2/8/8/PPPP1PPP/RNBQKBNR w KQkq f6 0 3",
        ] {
            assert_eq!(Board::from_fen(fen).unwrap().to_fen(), fen);
        }
    }

    #[test]
    fn test_four_field_fen() {
        let board = Board::from_fen("4k3/8/8/8/8/8/8/4K3 b -").unwrap_err();
        assert!(matches!(board, ChessError::InvalidFen(_)));

        let board = Board::from_fen("4k3/8/8/8/8/8/8/4K3 b - -").unwrap();
        assert_eq!(board.side_to_move(), Color::Black);
        assert_eq!(board.halfmove_clock(), 0);
        assert_eq!(board.fullmove_number(), 1);
    }

    #[test]
    fn test_en_passant_after_double_step() {
        let mut board = Board::new();
        assert!(board.apply_move(Square::new(6, 4), Square::new(4, 4), None));
        assert_eq!(
            board.to_fen(),
            "rnbqkbnr/pppppppp/8/8/4P3/8/PPPP1PPP/RNBQKBNR b KQkq e3 0 1"
        );
    }

    #[test]
    fn test_en_passant_field_sets_flag() {
        let board =
            Board::from_fen("rnbqkbnr/ppp1p1pp/8/3pPp2/8/8/PPPP1PPP/RNBQKBNR w KQkq f6 0 3")
                .unwrap();
        let f5 = board.piece_at(Square::parse("f5").unwrap()).unwrap();
        assert!(f5.en_passant_vulnerable);
        let d5 = board.piece_at(Square::parse("d5").unwrap()).unwrap();
        assert!(!d5.en_passant_vulnerable);
    }

    #[test]
    fn test_moved_flags_follow_castling_rights() {
        let board = Board::from_fen("r3k2r/8/8/8/8/8/8/R3K2R w Kq - 0 1").unwrap();
        let at = |s: &str| *board.piece_at(Square::parse(s).unwrap()).unwrap();
        assert!(!at("e1").has_moved);
        assert!(!at("h1").has_moved);
        assert!(at("a1").has_moved);
        assert!(!at("a8").has_moved);
        assert!(at("h8").has_moved);
    }

    #[test]
    fn test_invalid_fens() {
        for fen in [
            "",
            "8/8/8/8 w - - 0 1",
            "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR x KQkq - 0 1",
            "rnbqkbnr/pppppppp/9/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1",
            "rnbqkbnr/ppppzppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1",
            "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQxq - 0 1",
            "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq e9 0 1",
            "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq e6 0 1",
            "8/8/8/8/8/8/8/4K3 w - - 0 1",
            "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - x 1",
        ] {
            assert!(
                matches!(Board::from_fen(fen), Err(ChessError::InvalidFen(_))),
                "accepted {:?}",
                fen
            );
        }
    }

    #[test]
    fn test_placement_of() {
        assert_eq!(
            placement_of(START_FEN),
            "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR"
        );
        assert_eq!(Board::new().placement_fen(), placement_of(START_FEN));
    }
}
