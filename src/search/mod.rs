//! Search module for the chess engine.
//!
//! # Architecture
//! - `Searcher`: iterative-deepening controller owning the TT and statistics
//! - `negamax`: alpha-beta search with late move reductions
//! - `qsearch`: capture-only search past the horizon
//! - `ordering`: move ordering heuristics (checks, MVV-LVA, threats)
//! - `tt`: transposition table
//! - `limits`: search limits and time management
//!
//! The searcher works on any [`Position`]; moves are applied and undone in
//! place, so the caller's position is unchanged when a search returns.

mod limits;
mod negamax;
pub mod ordering;
mod qsearch;
pub mod tt;

#[cfg(test)]
mod tests;

pub use limits::{SearchLimits, TimeManager};
pub use tt::{Bound, TTEntry, TranspositionTable};

use std::time::{Duration, Instant};

use log::{debug, info};

use crate::config::SearchConfig;
use crate::position::Position;
use crate::types::{Depth, Move, NodeCount, Ply, Score, MAX_DEPTH};
use crate::uci::format_move;

/// Search statistics collected during search
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchStats {
    /// Interior and quiescence nodes visited
    pub nodes: NodeCount,
    pub qnodes: NodeCount,
    /// Nodes answered by the transposition table
    pub tt_hits: NodeCount,
    /// Deepest completed iteration
    pub depth: Depth,
    pub seldepth: Ply,
    pub time_ms: u64,
}

impl SearchStats {
    pub fn nps(&self) -> u64 {
        if self.time_ms > 0 {
            self.nodes * 1000 / self.time_ms
        } else {
            0
        }
    }
}

/// Result from a search
#[derive(Debug, Clone)]
pub struct SearchResult {
    /// Best move of the deepest completed depth
    pub best_move: Option<Move>,
    /// Its score, relative to the side to move
    pub score: Score,
    pub pv: Vec<Move>,
    pub stats: SearchStats,
}

/// Anything that can pick a move for a position under a depth and time limit
pub trait SearchStrategy {
    fn find_best_move<P: Position>(
        &mut self,
        position: &mut P,
        max_depth: Depth,
        budget: Duration,
    ) -> Option<Move>;
}

/// Main search controller
pub struct Searcher {
    config: SearchConfig,
    tt: TranspositionTable,
    time_manager: TimeManager,
    stats: SearchStats,
    start_time: Instant,
    /// Latched once the hard limit is hit; the depth in progress is discarded
    aborted: bool,
}

impl Searcher {
    pub fn new(config: SearchConfig) -> Self {
        let tt = TranspositionTable::new(config.tt_size_mb);
        Self {
            config,
            tt,
            time_manager: TimeManager::new(),
            stats: SearchStats::default(),
            start_time: Instant::now(),
            aborted: false,
        }
    }

    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    pub fn set_quiescence_depth(&mut self, depth: i32) {
        self.config.quiescence_depth = depth.max(0);
    }

    /// Get current statistics
    pub fn stats(&self) -> &SearchStats {
        &self.stats
    }

    pub fn tt(&self) -> &TranspositionTable {
        &self.tt
    }

    /// Replace the TT with an empty one of `size_mb`
    pub fn resize_tt(&mut self, size_mb: usize) {
        self.config.tt_size_mb = size_mb;
        self.tt = TranspositionTable::new(size_mb);
        debug!("transposition table resized to {} MB ({} slots)", size_mb, self.tt.len());
    }

    /// Forget everything learned in earlier searches
    pub fn clear_tt(&mut self) {
        self.tt.clear();
    }

    /// Run iterative deepening under `limits`.
    ///
    /// Depth `d` is only started while the soft budget lasts. The result holds
    /// the best move of the deepest completed depth; `best_move` is `None` when
    /// the position has no legal moves or no depth completed.
    pub fn search<P: Position>(&mut self, pos: &mut P, limits: &SearchLimits) -> SearchResult {
        self.stats = SearchStats::default();
        self.aborted = false;
        self.start_time = Instant::now();
        self.time_manager =
            TimeManager::from_limits(limits, pos.side_to_move(), self.config.hard_limit_percent);
        self.tt.new_search();

        // Depth 0 would never pick a move
        let max_depth = limits.depth.unwrap_or(Depth::MAX).raw().clamp(1, MAX_DEPTH);

        let mut result = SearchResult {
            best_move: None,
            score: Score::draw(),
            pv: Vec::new(),
            stats: SearchStats::default(),
        };

        // Iterative deepening
        for depth in 1..=max_depth {
            if !self.time_manager.can_start_iteration(self.elapsed_ms()) {
                info!("time budget spent before depth {}", depth);
                break;
            }

            let Some((best_move, score)) = negamax::search_root(self, pos, Depth::new(depth))
            else {
                if self.aborted {
                    debug!("depth {} abandoned at the hard time limit", depth);
                }
                break;
            };

            self.stats.depth = Depth::new(depth);
            self.stats.time_ms = self.elapsed_ms();

            result.best_move = Some(best_move);
            result.score = score;
            result.pv = self.principal_variation(pos, best_move, depth as usize);

            info!(
                "depth {} seldepth {} score {} nodes {} nps {} time {}ms pv {}",
                depth,
                self.stats.seldepth.raw(),
                score,
                self.stats.nodes,
                self.stats.nps(),
                self.stats.time_ms,
                result
                    .pv
                    .iter()
                    .map(|&m| format_move(m))
                    .collect::<Vec<_>>()
                    .join(" ")
            );

            // No point searching deeper once a forced mate is proven
            if score.mate_distance().is_some_and(|d| d <= depth) {
                break;
            }
        }

        self.stats.time_ms = self.elapsed_ms();
        result.stats = self.stats.clone();
        result
    }

    /// Fixed-depth search without a time limit
    pub fn search_depth<P: Position>(&mut self, pos: &mut P, depth: Depth) -> Option<(Move, Score)> {
        let result = self.search(pos, &SearchLimits::depth(depth.raw()));
        result.best_move.map(|m| (m, result.score))
    }

    /// Follow best moves through the TT, starting with `first`
    fn principal_variation<P: Position>(&self, pos: &mut P, first: Move, max_len: usize) -> Vec<Move> {
        let mut pv = vec![first];
        let mut child = pos.play(first);
        collect_pv(&self.tt, &mut *child, max_len.max(1) - 1, &mut pv);
        pv
    }

    fn elapsed_ms(&self) -> u64 {
        self.start_time.elapsed().as_millis() as u64
    }

    /// Whether the depth in progress has been abandoned
    #[inline]
    pub(crate) fn is_aborted(&self) -> bool {
        self.aborted
    }

    /// Check the hard limit (every 2048 nodes for efficiency)
    #[inline]
    pub(crate) fn should_stop(&mut self) -> bool {
        if self.aborted {
            return true;
        }
        if self.stats.nodes & 2047 == 0 && self.time_manager.hard_stop(self.elapsed_ms()) {
            self.aborted = true;
        }
        self.aborted
    }

    /// Increment node counter
    #[inline]
    pub(crate) fn inc_nodes(&mut self) {
        self.stats.nodes += 1;
    }

    #[inline]
    pub(crate) fn inc_qnodes(&mut self) {
        self.stats.qnodes += 1;
    }

    /// Update selective depth
    #[inline]
    pub(crate) fn update_seldepth(&mut self, ply: Ply) {
        if ply > self.stats.seldepth {
            self.stats.seldepth = ply;
        }
    }
}

impl Default for Searcher {
    fn default() -> Self {
        Self::new(SearchConfig::default())
    }
}

impl SearchStrategy for Searcher {
    fn find_best_move<P: Position>(
        &mut self,
        position: &mut P,
        max_depth: Depth,
        budget: Duration,
    ) -> Option<Move> {
        self.search(position, &SearchLimits::budget(max_depth, budget))
            .best_move
    }
}

fn collect_pv<P: Position>(tt: &TranspositionTable, pos: &mut P, remaining: usize, pv: &mut Vec<Move>) {
    if remaining == 0 {
        return;
    }
    let Some(m) = tt.probe(pos.key()).and_then(|e| e.best_move) else {
        return;
    };
    if !pos.legal_moves().contains(&m) {
        return;
    }
    pv.push(m);
    let mut child = pos.play(m);
    collect_pv(tt, &mut *child, remaining - 1, pv);
}
