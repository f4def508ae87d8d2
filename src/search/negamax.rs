//! Negamax alpha-beta search implementation.
//!
//! This is the core search algorithm with:
//! - Transposition table probing and storing
//! - Alpha-beta pruning (fail-soft)
//! - Late move reductions
//! - Quiescence search at the horizon
//!
//! Scores are always relative to the side to move at the node.

use super::qsearch::quiescence;
use super::tt::Bound;
use super::{ordering, Searcher};
use crate::position::{Outcome, Position};
use crate::types::{Depth, Move, Ply, Score};

/// Search every root move at `depth` with a full window.
///
/// Returns `None` when the position has no legal moves or the search was
/// aborted before the depth completed.
pub(super) fn search_root<P: Position>(
    searcher: &mut Searcher,
    pos: &mut P,
    depth: Depth,
) -> Option<(Move, Score)> {
    searcher.inc_nodes();

    let key = pos.key();
    let legal = pos.legal_moves();
    let mut moves = ordering::order_moves(pos, legal);
    if let Some(tt_move) = searcher.tt.probe(key).and_then(|e| e.best_move) {
        ordering::move_to_front(&mut moves, tt_move);
    }

    let mut alpha = Score::neg_infinity();
    let beta = Score::infinity();
    let mut best: Option<(Move, Score)> = None;

    for m in moves {
        let score = {
            let mut child = pos.play(m);
            -alphabeta(searcher, &mut *child, depth - 1, Ply::ZERO.next(), -beta, -alpha)
        };

        if searcher.is_aborted() {
            return None;
        }

        if best.map_or(true, |(_, s)| score > s) {
            best = Some((m, score));
            if score > alpha {
                alpha = score;
            }
        }
    }

    if let Some((m, score)) = best {
        searcher.tt.store(key, depth, score, Bound::Exact, Some(m));
    }
    best
}

/// Main negamax search function with TT integration and LMR
pub(super) fn alphabeta<P: Position>(
    searcher: &mut Searcher,
    pos: &mut P,
    depth: Depth,
    ply: Ply,
    mut alpha: Score,
    mut beta: Score,
) -> Score {
    if searcher.should_stop() {
        return Score::draw();
    }

    // === TT Probe ===
    let key = pos.key();
    let mut tt_move = None;
    if let Some(entry) = searcher.tt.probe(key) {
        tt_move = entry.best_move;
        if let Some(score) = entry.cutoff(depth, ply, &mut alpha, &mut beta) {
            searcher.stats.tt_hits += 1;
            return score;
        }
    }

    if let Some(outcome) = pos.outcome() {
        return match outcome {
            Outcome::Checkmate { .. } => Score::mated_in(ply.raw()),
            _ => Score::draw(),
        };
    }

    if depth.is_qs() {
        let qdepth = searcher.config.quiescence_depth;
        return quiescence(searcher, pos, ply, alpha, beta, qdepth);
    }

    searcher.inc_nodes();
    searcher.update_seldepth(ply);

    let in_check = pos.in_check();
    let legal = pos.legal_moves();
    let mut moves = ordering::order_moves(pos, legal);
    if let Some(m) = tt_move {
        ordering::move_to_front(&mut moves, m);
    }

    let lmr = searcher.config.lmr;
    let (window_alpha, window_beta) = (alpha, beta);
    let mut best_score = Score::neg_infinity();
    let mut best_move = None;

    for (i, m) in moves.into_iter().enumerate() {
        let score = {
            let mut child = pos.play(m);

            // === Late Move Reduction ===
            if lmr.applies(depth, i) && !in_check && !child.in_check() {
                let reduced = -alphabeta(
                    searcher,
                    &mut *child,
                    depth - lmr.reduction,
                    ply.next(),
                    -beta,
                    -alpha,
                );
                if reduced > alpha {
                    -alphabeta(searcher, &mut *child, depth - 1, ply.next(), -beta, -alpha)
                } else {
                    reduced
                }
            } else {
                -alphabeta(searcher, &mut *child, depth - 1, ply.next(), -beta, -alpha)
            }
        };

        if searcher.is_aborted() {
            return Score::draw();
        }

        if score > best_score {
            best_score = score;
            best_move = Some(m);

            if score > alpha {
                alpha = score;
                if score >= beta {
                    break;
                }
            }
        }
    }

    // === TT Store ===
    let bound = Bound::classify(best_score, window_alpha, window_beta);
    searcher
        .tt
        .store(key, depth, best_score.to_tt(ply.raw()), bound, best_move);

    best_score
}
