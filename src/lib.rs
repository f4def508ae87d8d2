//! Minimax chess search core.
//!
//! Iterative-deepening negamax with alpha-beta pruning, late move reductions,
//! quiescence search and a transposition table, over a hand-crafted evaluator.
//! The rules of chess come from the `chess` crate behind the
//! [`position::Position`] trait.

pub mod config;
pub mod error;
pub mod eval;
pub mod position;
pub mod search;
pub mod types;
pub mod uci;

pub use config::EngineConfig;
pub use error::EngineError;
pub use position::{Game, Outcome, Position};
pub use search::{SearchLimits, SearchResult, SearchStrategy, Searcher};
pub use types::{Depth, Move, Score};
