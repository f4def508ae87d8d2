//! Search limits and time management.
//!
//! Handles:
//! - Fixed depth search
//! - Fixed time budget (checked between depths)
//! - Time control with increment
//! - Infinite search (until stop)
//!
//! The allocated time is a soft budget: a new depth is only started while
//! time remains. An optional hard limit, a percentage of the soft budget,
//! abandons the depth in progress.

use std::time::Duration;

use crate::types::{Color, Depth};
use crate::uci::SearchParams;

/// Search limits configuration
#[derive(Debug, Clone, Default)]
pub struct SearchLimits {
    /// Maximum depth to search
    pub depth: Option<Depth>,
    /// Time budget in milliseconds
    pub movetime: Option<u64>,
    /// White time remaining (ms)
    pub wtime: Option<u64>,
    /// Black time remaining (ms)
    pub btime: Option<u64>,
    /// White increment (ms)
    pub winc: Option<u64>,
    /// Black increment (ms)
    pub binc: Option<u64>,
    /// Moves until next time control
    pub movestogo: Option<u32>,
    /// Infinite search
    pub infinite: bool,
    /// Subtracted from every budget to cover I/O latency (ms)
    pub move_overhead: u64,
}

impl SearchLimits {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn depth(depth: i32) -> Self {
        Self {
            depth: Some(Depth::new(depth)),
            ..Default::default()
        }
    }

    /// Depth limit plus a wall-clock budget
    pub fn budget(depth: Depth, budget: Duration) -> Self {
        Self {
            depth: Some(depth),
            movetime: Some(budget.as_millis() as u64),
            ..Default::default()
        }
    }

    pub fn from_params(params: &SearchParams, move_overhead: u64) -> Self {
        Self {
            depth: params.depth,
            movetime: params.movetime,
            wtime: params.wtime,
            btime: params.btime,
            winc: params.winc,
            binc: params.binc,
            movestogo: params.movestogo,
            infinite: params.infinite,
            move_overhead,
        }
    }
}

/// Time manager for search
#[derive(Debug, Clone)]
pub struct TimeManager {
    /// Soft budget for this move (ms)
    allocated_time: u64,
    /// In-search hard limit (ms), if any
    max_time: Option<u64>,
    /// Is this an infinite search?
    infinite: bool,
}

impl TimeManager {
    pub fn new() -> Self {
        Self {
            allocated_time: u64::MAX,
            max_time: None,
            infinite: true,
        }
    }

    /// Create time manager from search limits.
    ///
    /// `hard_limit_percent` scales the soft budget into the hard limit;
    /// 0 disables the hard limit.
    pub fn from_limits(limits: &SearchLimits, side: Color, hard_limit_percent: u32) -> Self {
        if limits.infinite {
            return Self::new();
        }

        let hard = |allocated: u64| {
            (hard_limit_percent > 0).then(|| allocated.saturating_mul(hard_limit_percent as u64) / 100)
        };

        // Fixed budget
        if let Some(mt) = limits.movetime {
            let allocated = mt.saturating_sub(limits.move_overhead);
            return Self {
                allocated_time: allocated,
                max_time: hard(allocated),
                infinite: false,
            };
        }

        // Time control
        let (time_left, increment) = match side {
            Color::White => (limits.wtime, limits.winc),
            Color::Black => (limits.btime, limits.binc),
        };

        if let Some(time) = time_left {
            let inc = increment.unwrap_or(0);
            let moves_to_go = limits.movestogo.unwrap_or(30) as u64;

            // time_left / moves_to_go + some portion of increment
            let base_time = time / moves_to_go.max(1);
            let inc_bonus = inc * 3 / 4;

            // Don't use more than 1/3 of remaining time
            let max = time / 3;
            let allocated = (base_time + inc_bonus)
                .min(max)
                .saturating_sub(limits.move_overhead);

            return Self {
                allocated_time: allocated,
                max_time: hard(allocated).map(|h| h.min(max)),
                infinite: false,
            };
        }

        // Depth-only searches run to completion
        Self::new()
    }

    /// Soft budget in milliseconds (`u64::MAX` when unlimited)
    pub fn allocated(&self) -> u64 {
        self.allocated_time
    }

    /// Check if we can start a new iteration
    pub fn can_start_iteration(&self, elapsed_ms: u64) -> bool {
        self.infinite || elapsed_ms < self.allocated_time
    }

    /// Should we abandon the current iteration?
    pub fn hard_stop(&self, elapsed_ms: u64) -> bool {
        !self.infinite && self.max_time.is_some_and(|max| elapsed_ms >= max)
    }
}

impl Default for TimeManager {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_depth_only_is_unbounded() {
        let tm = TimeManager::from_limits(&SearchLimits::depth(4), Color::White, 200);
        assert!(tm.can_start_iteration(u64::MAX - 1));
        assert!(!tm.hard_stop(u64::MAX));
    }

    #[test]
    fn test_budget_soft_and_hard() {
        let limits = SearchLimits::budget(Depth::new(5), Duration::from_millis(100));
        let tm = TimeManager::from_limits(&limits, Color::White, 200);
        assert!(tm.can_start_iteration(99));
        assert!(!tm.can_start_iteration(100));
        assert!(!tm.hard_stop(199));
        assert!(tm.hard_stop(200));

        let soft_only = TimeManager::from_limits(&limits, Color::White, 0);
        assert!(!soft_only.hard_stop(1_000_000));
    }

    #[test]
    fn test_zero_budget_starts_nothing() {
        let limits = SearchLimits::budget(Depth::new(5), Duration::ZERO);
        let tm = TimeManager::from_limits(&limits, Color::Black, 200);
        assert!(!tm.can_start_iteration(0));
    }

    #[test]
    fn test_clock_allocation() {
        let limits = SearchLimits {
            wtime: Some(60_000),
            winc: Some(1_000),
            btime: Some(3_000),
            move_overhead: 10,
            ..Default::default()
        };
        // 60000 / 30 + 750 - 10
        let white = TimeManager::from_limits(&limits, Color::White, 200);
        assert_eq!(white.allocated(), 2_740);
        // Capped by a third of the remaining clock: min(100, 1000) - 10
        let black = TimeManager::from_limits(&limits, Color::Black, 200);
        assert_eq!(black.allocated(), 90);
        assert!(black.hard_stop(1_000));
    }
}
