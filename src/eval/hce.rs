//! Hand-crafted evaluation
//!
//! Features:
//! - Material + piece-square tables (king table switches in the endgame)
//! - King safety (pawn shield, adjacent enemy pieces)
//! - Pawn structure (doubled, isolated)
//! - Mobility of minor and major pieces

use crate::position::Position;
use crate::types::{color_sign, piece_value, Color, File, Piece, Rank, Score, Square, Value};

use super::pst::pst_value;

// ============================================================================
// BONUSES AND PENALTIES
// ============================================================================

/// Two rooks plus one minor piece per side
const ENDGAME_MATERIAL: Value = 2600;

const SHIELD_PAWN_BONUS: Value = 10;
const KING_ATTACKER_PENALTY: Value = 15;
const DOUBLED_PAWN_PENALTY: Value = 20;
const ISOLATED_PAWN_PENALTY: Value = 15;
const MOBILITY_BONUS: Value = 2;

const NON_KING: [Piece; 5] = [Piece::Pawn, Piece::Knight, Piece::Bishop, Piece::Rook, Piece::Queen];
const MOBILE: [Piece; 4] = [Piece::Knight, Piece::Bishop, Piece::Rook, Piece::Queen];
const ALL_PIECES: [Piece; 6] = [
    Piece::Pawn,
    Piece::Knight,
    Piece::Bishop,
    Piece::Rook,
    Piece::Queen,
    Piece::King,
];

/// Per-term evaluation, every term from white's perspective
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Breakdown {
    pub endgame: bool,
    pub material: Value,
    pub king_safety: Value,
    pub pawn_structure: Value,
    pub mobility: Value,
}

impl Breakdown {
    pub fn total(&self) -> Score {
        Score::cp(self.material + self.king_safety + self.pawn_structure + self.mobility)
    }
}

// ============================================================================
// TERMS
// ============================================================================

/// Non-king material of one side
fn material_count<P: Position>(pos: &P, color: Color) -> Value {
    NON_KING
        .iter()
        .map(|&piece| pos.pieces(piece, color).popcnt() as Value * piece_value(piece))
        .sum()
}

/// Endgame once a side has run out of queens or little material is left
pub fn is_endgame<P: Position>(pos: &P) -> bool {
    let queenless = [Color::White, Color::Black]
        .iter()
        .any(|&c| pos.pieces(Piece::Queen, c).popcnt() == 0);
    let material = material_count(pos, Color::White) + material_count(pos, Color::Black);
    queenless || material <= ENDGAME_MATERIAL
}

fn material_and_position<P: Position>(pos: &P, color: Color, endgame: bool) -> Value {
    let mut score = 0;
    for &piece in &ALL_PIECES {
        for sq in pos.pieces(piece, color) {
            score += piece_value(piece) + pst_value(piece, sq, color, endgame);
        }
    }
    score
}

/// Pawn shield in front of the king minus enemy pieces next to it
pub fn king_safety<P: Position>(pos: &P, color: Color) -> Value {
    let king = pos.king_square(color);
    let rank = king.get_rank().to_index() as i32;
    let file = king.get_file().to_index() as i32;
    let shield_rank = match color {
        Color::White => rank + 1,
        Color::Black => rank - 1,
    };

    let mut score = 0;
    if (0..8).contains(&shield_rank) {
        for shield_file in (file - 1..=file + 1).filter(|f| (0..8).contains(f)) {
            let sq = Square::make_square(
                Rank::from_index(shield_rank as usize),
                File::from_index(shield_file as usize),
            );
            if pos.piece_at(sq) == Some((Piece::Pawn, color)) {
                score += SHIELD_PAWN_BONUS;
            }
        }
    }

    let attackers = pos.attacks_from(king) & pos.occupied_by(!color);
    score - attackers.popcnt() as Value * KING_ATTACKER_PENALTY
}

/// Doubled and isolated pawn penalties
pub fn pawn_structure<P: Position>(pos: &P, color: Color) -> Value {
    let mut files = [0 as Value; 8];
    for sq in pos.pieces(Piece::Pawn, color) {
        files[sq.get_file().to_index()] += 1;
    }

    let doubled: Value = files.iter().filter(|&&n| n > 1).map(|&n| n - 1).sum();

    let isolated: Value = (0..8)
        .filter(|&f| {
            let left = f > 0 && files[f - 1] > 0;
            let right = f < 7 && files[f + 1] > 0;
            !left && !right
        })
        .map(|f| files[f])
        .sum();

    -(doubled * DOUBLED_PAWN_PENALTY) - isolated * ISOLATED_PAWN_PENALTY
}

/// Legal moves of knights, bishops, rooks and queens.
///
/// The turn is handed to `color` for the count and restored afterwards. When
/// that is impossible (the side to move is in check) the count falls back to
/// pseudo-legal destinations.
pub fn mobility<P: Position>(pos: &mut P, color: Color) -> Value {
    let legal = pos.with_turn(color, |p| {
        p.legal_moves()
            .iter()
            .filter(|m| {
                matches!(p.piece_at(m.get_source()), Some((piece, _)) if MOBILE.contains(&piece))
            })
            .count() as Value
    });

    let moves = match legal {
        Some(n) => n,
        None => pseudo_mobility(pos, color),
    };
    moves * MOBILITY_BONUS
}

fn pseudo_mobility<P: Position>(pos: &P, color: Color) -> Value {
    let own = pos.occupied_by(color);
    MOBILE
        .iter()
        .flat_map(|&piece| pos.pieces(piece, color))
        .map(|sq| (pos.attacks_from(sq) & !own).popcnt() as Value)
        .sum()
}

// ============================================================================
// MAIN EVALUATION FUNCTION
// ============================================================================

/// Term-by-term evaluation from white's perspective
pub fn breakdown<P: Position>(pos: &mut P) -> Breakdown {
    let endgame = is_endgame(pos);
    let mut terms = Breakdown {
        endgame,
        ..Breakdown::default()
    };

    for color in [Color::White, Color::Black] {
        let sign = color_sign(color);
        terms.material += sign * material_and_position(pos, color, endgame);
        terms.king_safety += sign * king_safety(pos, color);
        terms.pawn_structure += sign * pawn_structure(pos, color);
        terms.mobility += sign * mobility(pos, color);
    }

    terms
}

/// Evaluate the position from white's perspective
pub fn evaluate<P: Position>(pos: &mut P) -> Score {
    breakdown(pos).total()
}
