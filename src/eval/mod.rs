//! Board evaluation module.
//!
//! Scores are white-positive centipawns. Search converts them to the side to
//! move with [`Score::relative_to`].

mod hce;
pub mod pst;

pub use hce::{breakdown, is_endgame, Breakdown};

use crate::position::Position;
use crate::types::Score;

/// Static evaluation, white-positive.
///
/// Deterministic. The position may be touched temporarily (mobility flips the
/// turn) but is always handed back unchanged.
#[inline]
pub fn evaluate<P: Position>(pos: &mut P) -> Score {
    hce::evaluate(pos)
}

/// Static evaluation relative to the side to move (negamax convention)
#[inline]
pub fn evaluate_relative<P: Position>(pos: &mut P) -> Score {
    let side = pos.side_to_move();
    evaluate(pos).relative_to(side)
}
