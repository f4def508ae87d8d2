//! Core types shared by evaluation and search.
//!
//! The board vocabulary (`Move`, `Square`, `Piece`, `Color`, `BitBoard`) is
//! re-exported from the `chess` crate, which acts as the rules engine. The
//! search-specific types (`Score`, `Depth`, `Ply`) live here.

mod score;
mod depth;

pub use score::Score;
pub use depth::{Depth, Ply, MAX_DEPTH};

pub use chess::{
    BitBoard,
    ChessMove as Move,
    Color,
    File,
    Piece,
    Rank,
    Square,
    ALL_SQUARES,
    EMPTY,
};

/// Canonical position key (Zobrist hash) used by the transposition table
pub type Hash = u64;

/// Node count type
pub type NodeCount = u64;

/// Centipawn value type (for piece values, etc.)
pub type Value = i32;

// Piece values in centipawns
pub const PAWN_VALUE: Value = 100;
pub const KNIGHT_VALUE: Value = 320;
pub const BISHOP_VALUE: Value = 330;
pub const ROOK_VALUE: Value = 500;
pub const QUEEN_VALUE: Value = 900;
pub const KING_VALUE: Value = 20000;

/// Get the material value of a piece in centipawns
#[inline]
pub const fn piece_value(piece: Piece) -> Value {
    match piece {
        Piece::Pawn => PAWN_VALUE,
        Piece::Knight => KNIGHT_VALUE,
        Piece::Bishop => BISHOP_VALUE,
        Piece::Rook => ROOK_VALUE,
        Piece::Queen => QUEEN_VALUE,
        Piece::King => KING_VALUE,
    }
}

/// +1 for white, -1 for black
#[inline]
pub const fn color_sign(color: Color) -> Value {
    match color {
        Color::White => 1,
        Color::Black => -1,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_piece_values_ordered() {
        assert!(piece_value(Piece::Pawn) < piece_value(Piece::Knight));
        assert!(piece_value(Piece::Knight) < piece_value(Piece::Bishop));
        assert!(piece_value(Piece::Rook) < piece_value(Piece::Queen));
        assert!(piece_value(Piece::Queen) < piece_value(Piece::King));
    }

    #[test]
    fn test_color_sign() {
        assert_eq!(color_sign(Color::White), 1);
        assert_eq!(color_sign(Color::Black), -1);
    }
}
