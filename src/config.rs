//! Engine configuration.
//!
//! Every field has a default, so an empty or partial TOML file is valid:
//!
//! ```toml
//! max_depth = 5
//! time_budget_ms = 2000
//!
//! [search]
//! quiescence_depth = 5
//! tt_size_mb = 32
//! hard_limit_percent = 0   # only check the clock between depths
//!
//! [search.lmr]
//! enabled = true
//! ```

use std::fs;
use std::path::Path;
use std::time::Duration;

use serde::Deserialize;

use crate::error::EngineError;
use crate::types::Depth;

/// Default iterative-deepening depth limit
pub const DEFAULT_SEARCH_DEPTH: i32 = 3;

/// Capture-only plies searched past the main horizon
pub const MAX_QUIESCENCE_DEPTH: i32 = 5;

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EngineConfig {
    pub max_depth: i32,
    pub time_budget_ms: u64,
    /// Safety margin subtracted from clock time in UCI games
    pub move_overhead_ms: u64,
    pub search: SearchConfig,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_SEARCH_DEPTH,
            time_budget_ms: 5000,
            move_overhead_ms: 10,
            search: SearchConfig::default(),
        }
    }
}

impl EngineConfig {
    pub fn from_toml(text: &str) -> Result<Self, EngineError> {
        Ok(toml::from_str(text)?)
    }

    pub fn load(path: &Path) -> Result<Self, EngineError> {
        let text = fs::read_to_string(path).map_err(|source| EngineError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&text)
    }

    /// Load `path` if given, defaults otherwise
    pub fn load_or_default(path: Option<&Path>) -> Result<Self, EngineError> {
        path.map_or_else(|| Ok(Self::default()), Self::load)
    }

    pub fn depth(&self) -> Depth {
        Depth::new(self.max_depth.max(1))
    }

    pub fn time_budget(&self) -> Duration {
        Duration::from_millis(self.time_budget_ms)
    }
}

/// Knobs of the search itself
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SearchConfig {
    pub quiescence_depth: i32,
    pub tt_size_mb: usize,
    /// In-search hard stop as a percentage of the soft budget; 0 disables it
    pub hard_limit_percent: u32,
    pub lmr: LmrConfig,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            quiescence_depth: MAX_QUIESCENCE_DEPTH,
            tt_size_mb: 16,
            hard_limit_percent: 200,
            lmr: LmrConfig::default(),
        }
    }
}

/// Late move reduction parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LmrConfig {
    pub enabled: bool,
    /// Only reduce when at least this much depth remains
    pub min_depth: i32,
    /// Moves searched at full depth before reductions start
    pub full_depth_moves: usize,
    pub reduction: i32,
}

impl Default for LmrConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            min_depth: 3,
            full_depth_moves: 4,
            reduction: 2,
        }
    }
}

impl LmrConfig {
    /// Whether the move at `index` (0-based, in search order) may be reduced
    #[inline]
    pub fn applies(&self, depth: Depth, index: usize) -> bool {
        self.enabled && depth.raw() >= self.min_depth && index >= self.full_depth_moves
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_file_gives_defaults() {
        let config = EngineConfig::from_toml("").unwrap();
        assert_eq!(config, EngineConfig::default());
        assert_eq!(config.max_depth, DEFAULT_SEARCH_DEPTH);
        assert_eq!(config.search.quiescence_depth, MAX_QUIESCENCE_DEPTH);
    }

    #[test]
    fn test_partial_override() {
        let config = EngineConfig::from_toml(
            "max_depth = 6\n[search]\nhard_limit_percent = 0\n[search.lmr]\nenabled = false\n",
        )
        .unwrap();
        assert_eq!(config.max_depth, 6);
        assert_eq!(config.search.hard_limit_percent, 0);
        assert!(!config.search.lmr.enabled);
        assert_eq!(config.search.tt_size_mb, 16);
    }

    #[test]
    fn test_unknown_key_rejected() {
        let err = EngineConfig::from_toml("max_dpeth = 4").unwrap_err();
        assert!(matches!(err, EngineError::Config(_)));
    }

    #[test]
    fn test_missing_file() {
        let err = EngineConfig::load(Path::new("/definitely/not/here.toml")).unwrap_err();
        assert!(matches!(err, EngineError::Io { .. }));
        assert_eq!(
            EngineConfig::load_or_default(None).unwrap(),
            EngineConfig::default()
        );
    }

    #[test]
    fn test_lmr_applies() {
        let lmr = LmrConfig::default();
        assert!(!lmr.applies(Depth::new(2), 10));
        assert!(!lmr.applies(Depth::new(3), 3));
        assert!(lmr.applies(Depth::new(3), 4));

        let off = LmrConfig {
            enabled: false,
            ..lmr
        };
        assert!(!off.applies(Depth::new(8), 20));
    }
}
