//! Quiescence search - search captures only to avoid horizon effect.
//!
//! When the main search reaches depth 0, we continue searching captures
//! to ensure we don't stop in the middle of a tactical sequence. The side to
//! move may always "stand pat" on the static evaluation instead of capturing.

use super::{ordering, Searcher};
use crate::eval;
use crate::position::Position;
use crate::types::{Ply, Score};

/// Capture-only search below the horizon, at most `depth` plies deep.
///
/// Fail-soft: a stand-pat at or above `beta` is returned as is.
pub(super) fn quiescence<P: Position>(
    searcher: &mut Searcher,
    pos: &mut P,
    ply: Ply,
    mut alpha: Score,
    beta: Score,
    depth: i32,
) -> Score {
    searcher.inc_nodes();
    searcher.inc_qnodes();
    searcher.update_seldepth(ply);

    if searcher.should_stop() {
        return Score::draw();
    }

    let stand_pat = eval::evaluate_relative(pos);

    // Beta cutoff: position is already too good
    if stand_pat >= beta || depth <= 0 {
        return stand_pat;
    }

    if stand_pat > alpha {
        alpha = stand_pat;
    }

    let legal = pos.legal_moves();
    let captures = ordering::order_captures(pos, legal);

    let mut best_score = stand_pat;
    for m in captures {
        let score = {
            let mut child = pos.play(m);
            -quiescence(searcher, &mut *child, ply.next(), -beta, -alpha, depth - 1)
        };

        if searcher.is_aborted() {
            break;
        }

        if score > best_score {
            best_score = score;
            if score > alpha {
                alpha = score;
                if score >= beta {
                    break;
                }
            }
        }
    }

    best_score
}
