//! Transposition table for caching search results.
//!
//! # Design
//! - Power-of-two slot array indexed by the low bits of the position key
//! - Full 64-bit key kept per entry, so a hit is always the same position
//! - Depth-preferred replacement; entries from earlier searches are evicted first
//! - Mate scores are stored relative to the node (see [`Score::to_tt`])

use std::mem;

use crate::types::{Depth, Hash, Move, Ply, Score};

/// Type of bound stored in a TT entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bound {
    /// Exact score (the window contained it)
    Exact,
    /// Lower bound (fail-high, score >= beta)
    LowerBound,
    /// Upper bound (fail-low, score <= alpha)
    UpperBound,
}

impl Bound {
    /// Classify `best` against the window it was searched with
    #[inline]
    pub fn classify(best: Score, alpha: Score, beta: Score) -> Self {
        if best >= beta {
            Bound::LowerBound
        } else if best > alpha {
            Bound::Exact
        } else {
            Bound::UpperBound
        }
    }
}

/// A single entry in the transposition table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TTEntry {
    pub key: Hash,
    pub depth: Depth,
    /// Score with mate distances relative to this node
    pub score: Score,
    pub bound: Bound,
    pub best_move: Option<Move>,
    generation: u8,
}

impl TTEntry {
    /// Score as seen from a node `ply` plies below the root
    #[inline]
    pub fn score_at(&self, ply: Ply) -> Score {
        self.score.from_tt(ply.raw())
    }

    /// Use this entry at a node needing `depth`.
    ///
    /// Entries searched shallower than `depth` are ignored. An exact entry
    /// answers the node outright; a bound tightens the window and answers it
    /// only when the window closes.
    pub fn cutoff(
        &self,
        depth: Depth,
        ply: Ply,
        alpha: &mut Score,
        beta: &mut Score,
    ) -> Option<Score> {
        if self.depth < depth {
            return None;
        }
        let score = self.score_at(ply);
        match self.bound {
            Bound::Exact => return Some(score),
            Bound::LowerBound => *alpha = (*alpha).max(score),
            Bound::UpperBound => *beta = (*beta).min(score),
        }
        (*alpha >= *beta).then_some(score)
    }
}

/// Fixed-size transposition table
pub struct TranspositionTable {
    slots: Vec<Option<TTEntry>>,
    /// Current generation (incremented each new search)
    generation: u8,
    size_mb: usize,
}

impl TranspositionTable {
    /// Create a new TT with given size in MB
    pub fn new(size_mb: usize) -> Self {
        let slot_size = mem::size_of::<Option<TTEntry>>();
        let entries = (size_mb * 1024 * 1024) / slot_size;
        let mut tt = Self::with_entries(entries.max(1024));
        tt.size_mb = size_mb;
        tt
    }

    /// Create a TT with room for at most `entries` slots (rounded down to a power of two)
    pub fn with_entries(entries: usize) -> Self {
        let entries = entries.max(1);
        let entries = if entries.is_power_of_two() {
            entries
        } else {
            entries.next_power_of_two() / 2
        };
        Self {
            slots: vec![None; entries],
            generation: 0,
            size_mb: 0,
        }
    }

    /// Number of slots
    #[inline]
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn size_mb(&self) -> usize {
        self.size_mb
    }

    #[inline]
    pub fn generation(&self) -> u8 {
        self.generation
    }

    /// Increment generation (call at start of each search)
    pub fn new_search(&mut self) {
        self.generation = self.generation.wrapping_add(1);
    }

    #[inline]
    fn index(&self, key: Hash) -> usize {
        (key as usize) & (self.slots.len() - 1)
    }

    /// Look up the entry stored for exactly this position
    #[inline]
    pub fn probe(&self, key: Hash) -> Option<TTEntry> {
        self.slots[self.index(key)].filter(|e| e.key == key)
    }

    /// Store a search result; `score` must already be node-relative
    ///
    /// Replacement strategy:
    /// 1. Always replace empty slots
    /// 2. Always replace entries from older searches
    /// 3. Replace if the new depth >= existing depth
    pub fn store(
        &mut self,
        key: Hash,
        depth: Depth,
        score: Score,
        bound: Bound,
        best_move: Option<Move>,
    ) {
        let generation = self.generation;
        let idx = self.index(key);
        let replace = match &self.slots[idx] {
            None => true,
            Some(existing) => existing.generation != generation || depth >= existing.depth,
        };

        if replace {
            self.slots[idx] = Some(TTEntry {
                key,
                depth,
                score,
                bound,
                best_move,
                generation,
            });
        }
    }

    /// Clear the table
    pub fn clear(&mut self) {
        self.slots.fill(None);
        self.generation = 0;
    }

    /// Occupancy of the current generation in permill (for UCI info)
    pub fn hashfull(&self) -> u32 {
        let sample_size = self.slots.len().min(1000);
        let used = self.slots[..sample_size]
            .iter()
            .flatten()
            .filter(|e| e.generation == self.generation)
            .count();
        ((used * 1000) / sample_size) as u32
    }
}

impl Default for TranspositionTable {
    fn default() -> Self {
        Self::new(16)
    }
}
