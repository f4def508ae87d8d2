//! Move ordering heuristics.
//!
//! Good move ordering is critical for alpha-beta pruning efficiency. Moves are
//! scored once and stably sorted, so equal scores keep the rules engine's
//! generation order and searches stay reproducible.

use crate::position::Position;
use crate::types::{piece_value, Move, Piece};

/// Move score constants
const CHECK_BONUS: i32 = 10_000;
const THREAT_BONUS: i32 = 50;

/// MVV-LVA: victim value minus a small fraction of the attacker value
#[inline]
fn mvv_lva_score(victim: Piece, attacker: Piece) -> i32 {
    piece_value(victim) - piece_value(attacker) / 100
}

/// Score a move for ordering (higher = search first)
pub fn score_move<P: Position>(pos: &mut P, m: Move) -> i32 {
    let Some((mover, us)) = pos.piece_at(m.get_source()) else {
        return 0;
    };
    let them = !us;
    let mut score = 0;

    if pos.is_capture(m) {
        // En passant leaves the destination empty
        let victim = pos.piece_at(m.get_dest()).map_or(Piece::Pawn, |(p, _)| p);
        score += mvv_lva_score(victim, mover);
    }

    // Walking into an attacked square risks the piece
    if pos.is_attacked_by(them, m.get_dest()) {
        score -= piece_value(mover) / 2;
    }

    if let Some(promo) = m.get_promotion() {
        score += piece_value(promo);
    }

    let child = pos.play(m);
    if child.in_check() {
        score += CHECK_BONUS;
    }
    let threatened = child.attacks_from(m.get_dest()) & child.occupied_by(them);
    score += threatened.popcnt() as i32 * THREAT_BONUS;

    score
}

/// Sort `moves` best-first; ties keep their incoming order
pub fn order_moves<P: Position>(pos: &mut P, moves: Vec<Move>) -> Vec<Move> {
    let mut scored: Vec<(i32, Move)> = moves
        .into_iter()
        .map(|m| (score_move(pos, m), m))
        .collect();

    // `sort_by` is stable
    scored.sort_by(|a, b| b.0.cmp(&a.0));
    scored.into_iter().map(|(_, m)| m).collect()
}

/// Keep only captures and order them for quiescence
pub fn order_captures<P: Position>(pos: &mut P, moves: Vec<Move>) -> Vec<Move> {
    let captures = moves.into_iter().filter(|&m| pos.is_capture(m)).collect();
    order_moves(pos, captures)
}

/// Search `m` first when it is among `moves`
pub fn move_to_front(moves: &mut [Move], m: Move) {
    if let Some(idx) = moves.iter().position(|&x| x == m) {
        moves[..=idx].rotate_right(1);
    }
}
