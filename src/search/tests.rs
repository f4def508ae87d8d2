use std::str::FromStr;
use std::time::{Duration, Instant};

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::*;
use crate::config::LmrConfig;
use crate::eval;
use crate::position::{Game, Outcome, Position};
use crate::types::Square;

fn searcher(quiescence_depth: i32, lmr: bool) -> Searcher {
    Searcher::new(SearchConfig {
        quiescence_depth,
        tt_size_mb: 1,
        hard_limit_percent: 0,
        lmr: LmrConfig {
            enabled: lmr,
            ..LmrConfig::default()
        },
    })
}

fn game(fen: &str) -> Game {
    Game::from_str(fen).unwrap()
}

/// Capture-only minimax with stand-pat and no pruning
fn reference_quiescence(pos: &mut Game, depth: i32) -> Score {
    let stand_pat = eval::evaluate_relative(pos);
    if depth == 0 {
        return stand_pat;
    }
    let mut best = stand_pat;
    for m in pos.legal_moves() {
        if !pos.is_capture(m) {
            continue;
        }
        let mut child = pos.play(m);
        best = best.max(-reference_quiescence(&mut child, depth - 1));
    }
    best
}

/// Full-width negamax with the same leaf rules as the engine
fn reference_negamax(pos: &mut Game, depth: i32, ply: i32, qdepth: i32) -> Score {
    if let Some(outcome) = pos.outcome() {
        return match outcome {
            Outcome::Checkmate { .. } => Score::mated_in(ply),
            _ => Score::draw(),
        };
    }
    if depth == 0 {
        return reference_quiescence(pos, qdepth);
    }
    let mut best = Score::neg_infinity();
    for m in pos.legal_moves() {
        let mut child = pos.play(m);
        best = best.max(-reference_negamax(&mut child, depth - 1, ply + 1, qdepth));
    }
    best
}

/// Reference value of every root move
fn reference_root(pos: &mut Game, depth: i32, qdepth: i32) -> Vec<(Move, Score)> {
    pos.legal_moves()
        .into_iter()
        .map(|m| {
            let mut child = pos.play(m);
            (m, -reference_negamax(&mut child, depth - 1, 1, qdepth))
        })
        .collect()
}

fn assert_matches_reference(pos: &mut Game, depth: i32, qdepth: i32) {
    let expected = reference_root(pos, depth, qdepth);
    let best_value = expected.iter().map(|&(_, s)| s).max().unwrap();

    let (best_move, score) = searcher(qdepth, false)
        .search_depth(pos, Depth::new(depth))
        .unwrap();

    assert_eq!(score, best_value, "score mismatch in {} at depth {}", pos, depth);
    let chosen = expected.iter().find(|&&(m, _)| m == best_move).unwrap();
    assert_eq!(chosen.1, best_value, "suboptimal move in {} at depth {}", pos, depth);
}

fn random_position(rng: &mut StdRng, plies: usize) -> Game {
    let mut game = Game::default();
    for _ in 0..plies {
        let moves = game.legal_moves();
        if moves.is_empty() {
            break;
        }
        game.apply(moves[rng.gen_range(0..moves.len())]);
    }
    game
}

#[test]
fn test_opening_depth_one_is_legal() {
    let mut pos = Game::default();
    let (m, _) = searcher(5, true).search_depth(&mut pos, Depth::ONE).unwrap();
    assert!(pos.legal_moves().contains(&m));

    // No blunder-scale swing
    let mut child = pos.play(m);
    assert!(eval::evaluate(&mut *child).raw().abs() < 150);
}

#[test]
fn test_takes_hanging_queen() {
    let mut pos = game("4k3/8/8/3q4/8/8/3R4/4K3 w - - 0 1");
    let mut s = searcher(5, true);
    for depth in 2..=4 {
        let (m, score) = s.search_depth(&mut pos, Depth::new(depth)).unwrap();
        assert_eq!(m, Move::new(Square::D2, Square::D5, None), "depth {}", depth);
        assert!(score.raw() > 300);
    }
}

#[test]
fn test_finds_mate_in_one() {
    let mut pos = game("6k1/5ppp/8/8/8/8/8/R5K1 w - - 0 1");
    let result = searcher(5, true).search(&mut pos, &SearchLimits::depth(3));
    assert_eq!(result.best_move, Some(Move::new(Square::A1, Square::A8, None)));
    assert_eq!(result.score, Score::mate_in(1));
    assert_eq!(result.pv, vec![Move::new(Square::A1, Square::A8, None)]);
}

#[test]
fn test_defends_against_mate() {
    // Black must give the king air or cover the back rank
    let mut pos = game("6k1/5ppp/8/8/8/8/8/R5K1 b - - 0 1");
    let (_, score) = searcher(5, true).search_depth(&mut pos, Depth::new(2)).unwrap();
    assert!(!score.is_mated());
}

#[test]
fn test_no_move_when_game_over() {
    let mut s = searcher(5, true);

    let mut mated = game("R5k1/5ppp/8/8/8/8/8/6K1 b - - 0 1");
    assert!(s.search_depth(&mut mated, Depth::new(3)).is_none());

    let mut stalemate = game("7k/5Q2/6K1/8/8/8/8/8 b - - 0 1");
    assert!(s.search_depth(&mut stalemate, Depth::new(3)).is_none());
}

#[test]
fn test_zero_budget_returns_none() {
    let mut pos = Game::default();
    let mut s = Searcher::default();
    assert!(s.find_best_move(&mut pos, Depth::new(3), Duration::ZERO).is_none());
    assert_eq!(s.stats().nodes, 0);
}

#[test]
fn test_budget_returns_a_move() {
    let mut pos = Game::default();
    let m = Searcher::default().find_best_move(&mut pos, Depth::new(2), Duration::from_secs(60));
    assert!(m.is_some_and(|m| pos.legal_moves().contains(&m)));
}

#[test]
fn test_position_unchanged_after_search() {
    let mut pos = game("r1bqkbnr/pppp1ppp/2n5/4p3/4P3/5N2/PPPP1PPP/RNBQKB1R w KQkq - 2 3");
    let fen = pos.to_string();
    let key = pos.key();
    searcher(5, true).search_depth(&mut pos, Depth::new(3)).unwrap();
    assert_eq!(pos.key(), key);
    assert_eq!(pos.to_string(), fen);
    assert_eq!(pos.plies_played(), 0);
}

#[test]
fn test_seldepth_bounded_by_quiescence() {
    let mut pos = game("r1bqkbnr/pppp1ppp/2n5/4p3/4P3/5N2/PPPP1PPP/RNBQKB1R w KQkq - 2 3");
    let qdepth = 3;
    let result = searcher(qdepth, true).search(&mut pos, &SearchLimits::depth(3));
    assert_eq!(result.stats.depth, Depth::new(3));
    assert!(result.stats.seldepth.raw() <= 3 + qdepth);
    assert!(result.stats.qnodes > 0);
    assert!(result.stats.nodes > result.stats.qnodes);
}

#[test]
fn test_matches_reference_on_random_positions() {
    let mut rng = StdRng::seed_from_u64(0x5eed);
    let mut checked = 0;
    while checked < 6 {
        let plies = rng.gen_range(6..24);
        let mut pos = random_position(&mut rng, plies);
        if pos.legal_moves().is_empty() {
            continue;
        }
        assert_matches_reference(&mut pos, 1, 3);
        assert_matches_reference(&mut pos, 2, 2);
        checked += 1;
    }
}

#[test]
fn test_matches_reference_in_endgame() {
    let mut pos = game("4k3/8/3p4/8/2N5/8/3K4/8 w - - 0 1");
    assert_matches_reference(&mut pos, 3, 3);

    let mut pos = game("8/5k2/8/3r4/8/2B5/4K3/8 b - - 0 1");
    assert_matches_reference(&mut pos, 3, 3);
}

#[test]
fn test_tt_keeps_best_move_between_searches() {
    let mut pos = game("r1bqkbnr/pppp1ppp/2n5/4p3/4P3/5N2/PPPP1PPP/RNBQKB1R w KQkq - 2 3");
    let mut s = searcher(4, true);

    let first = s.search(&mut pos, &SearchLimits::depth(3));
    let entry = s.tt().probe(pos.key()).unwrap();
    assert_eq!(entry.best_move, first.best_move);
    assert_eq!(entry.bound, Bound::Exact);

    let second = s.search(&mut pos, &SearchLimits::depth(3));
    assert!(second.stats.tt_hits > 0);
    assert!(second.best_move.is_some());

    s.clear_tt();
    assert!(s.tt().probe(pos.key()).is_none());
}

#[test]
fn test_pv_starts_with_best_move_and_is_legal() {
    let mut pos = game("4k3/8/8/3q4/8/8/3R4/4K3 w - - 0 1");
    let result = searcher(5, true).search(&mut pos, &SearchLimits::depth(3));
    assert_eq!(result.pv.first().copied(), result.best_move);
    assert!(result.pv.len() <= 3);

    let mut replay = pos.clone();
    for &m in &result.pv {
        assert!(replay.legal_moves().contains(&m));
        replay.apply(m);
    }
}

#[test]
fn test_depth_zero_searches_one_ply() {
    let mut pos = Game::default();
    let result = searcher(5, true).search(&mut pos, &SearchLimits::depth(0));
    assert_eq!(result.stats.depth, Depth::ONE);
    assert!(result.best_move.is_some_and(|m| pos.legal_moves().contains(&m)));
}

#[test]
fn test_hard_limit_abandons_deep_iteration() {
    // Kiwipete: too busy to reach depth 30 in a fraction of a second
    let mut pos = game("r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1");
    let key = pos.key();
    let mut s = Searcher::new(SearchConfig {
        hard_limit_percent: 100,
        ..SearchConfig::default()
    });

    let start = Instant::now();
    let result = s.search(&mut pos, &SearchLimits::budget(Depth::new(30), Duration::from_millis(200)));
    let elapsed = start.elapsed();

    assert!(result.best_move.is_some_and(|m| pos.legal_moves().contains(&m)));
    assert!(result.stats.depth >= Depth::ONE);
    assert!(result.stats.depth < Depth::new(30));
    assert!(elapsed < Duration::from_secs(3), "took {:?}", elapsed);
    assert_eq!(pos.plies_played(), 0);
    assert_eq!(pos.key(), key);
}

#[test]
fn test_late_move_reductions_keep_the_tactic() {
    let mut pos = game("4k3/8/8/3q4/8/8/3R4/4K3 w - - 0 1");
    let winning = Move::new(Square::D2, Square::D5, None);

    let mut full = searcher(4, false);
    let mut reduced = searcher(4, true);
    for depth in 4..=5 {
        let (m_full, s_full) = full.search_depth(&mut pos, Depth::new(depth)).unwrap();
        let (m_reduced, s_reduced) = reduced.search_depth(&mut pos, Depth::new(depth)).unwrap();
        assert_eq!(m_full, winning, "depth {}", depth);
        assert_eq!(m_reduced, m_full, "depth {}", depth);
        assert!(s_full.raw() > 300 && s_reduced.raw() > 300);
    }

    // Reductions only ever skip work
    let quiet = "r1bqkbnr/pppp1ppp/2n5/4p3/4P3/5N2/PPPP1PPP/RNBQKB1R w KQkq - 2 3";
    let mut pos = game(quiet);
    let mut full = searcher(4, false);
    let mut reduced = searcher(4, true);
    full.search_depth(&mut pos, Depth::new(4)).unwrap();
    reduced.search_depth(&mut pos, Depth::new(4)).unwrap();
    assert!(reduced.stats().nodes < full.stats().nodes);
}
