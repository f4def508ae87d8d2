//! Search scores.
//!
//! Centipawns, with forced mates folded into the top and bottom of the range.
//! Search values are relative to the side to move; the evaluator's
//! white-positive scores are converted with [`Score::relative_to`].

use std::fmt;
use std::ops::Neg;

use chess::Color;

/// Mate delivered at the root
const MATE: i32 = 31_000;
/// Strictly outside every reachable score
const INFINITY: i32 = 32_000;
/// Scores this close to `±MATE` encode a mate distance
const MATE_BAND: i32 = 1_000;

/// A search score.
///
/// `MATE - n` means the side to move mates in `n` plies, `-MATE + n` that it
/// is mated in `n` plies, so shorter mates always compare better.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[repr(transparent)]
pub struct Score(pub i32);

impl Score {
    #[inline]
    pub const fn cp(centipawns: i32) -> Self {
        Score(centipawns)
    }

    /// Mate delivered `ply` half-moves from the root
    #[inline]
    pub const fn mate_in(ply: i32) -> Self {
        Score(MATE - ply)
    }

    /// Checkmated `ply` half-moves from the root
    #[inline]
    pub const fn mated_in(ply: i32) -> Self {
        Score(ply - MATE)
    }

    #[inline]
    pub const fn draw() -> Self {
        Score(0)
    }

    /// Open upper end of the root window
    #[inline]
    pub const fn infinity() -> Self {
        Score(INFINITY)
    }

    #[inline]
    pub const fn neg_infinity() -> Self {
        Score(-INFINITY)
    }

    #[inline]
    pub const fn raw(self) -> i32 {
        self.0
    }

    /// Turn a white-positive score into one for `side`
    #[inline]
    pub const fn relative_to(self, side: Color) -> Self {
        match side {
            Color::White => self,
            Color::Black => Score(-self.0),
        }
    }

    #[inline]
    pub const fn is_mate(self) -> bool {
        self.0 >= MATE - MATE_BAND
    }

    #[inline]
    pub const fn is_mated(self) -> bool {
        self.0 <= MATE_BAND - MATE
    }

    /// Plies to the mate, either way round
    #[inline]
    pub const fn mate_distance(self) -> Option<i32> {
        if self.is_mate() {
            Some(MATE - self.0)
        } else if self.is_mated() {
            Some(self.0 + MATE)
        } else {
            None
        }
    }

    /// Move a mate score `plies` half-moves further from where it was measured
    #[inline]
    const fn rebase(self, plies: i32) -> Self {
        if self.is_mate() {
            Score(self.0 + plies)
        } else if self.is_mated() {
            Score(self.0 - plies)
        } else {
            self
        }
    }

    /// Root-relative mate distance to node-relative, for storing at `ply`
    #[inline]
    pub const fn to_tt(self, ply: i32) -> Self {
        self.rebase(ply)
    }

    /// Inverse of [`Score::to_tt`] for a node at `ply`
    #[inline]
    pub const fn from_tt(self, ply: i32) -> Self {
        self.rebase(-ply)
    }
}

impl Neg for Score {
    type Output = Self;
    #[inline]
    fn neg(self) -> Self {
        Score(-self.0)
    }
}

impl From<i32> for Score {
    #[inline]
    fn from(v: i32) -> Self {
        Score(v)
    }
}

/// UCI notation: `cp N` or `mate N` in full moves, negative when being mated
impl fmt::Display for Score {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.mate_distance() {
            Some(plies) if self.is_mate() => write!(f, "mate {}", (plies + 1) / 2),
            Some(plies) => write!(f, "mate -{}", (plies + 1) / 2),
            None => write!(f, "cp {}", self.0),
        }
    }
}

impl fmt::Debug for Score {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Score({})", self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mate_scores() {
        let mating = Score::mate_in(5);
        assert!(mating.is_mate() && !mating.is_mated());
        assert_eq!(mating.mate_distance(), Some(5));

        let mated = Score::mated_in(3);
        assert!(mated.is_mated() && !mated.is_mate());
        assert_eq!(mated.mate_distance(), Some(3));
        assert_eq!(-mated, Score::mate_in(3));

        assert!(Score::mate_in(1) > Score::mate_in(3));
        assert_eq!(Score::cp(800).mate_distance(), None);
    }

    #[test]
    fn test_tt_rebasing() {
        let mate = Score::mate_in(5);
        let stored = mate.to_tt(2);
        assert_eq!(stored, Score::mate_in(3));
        assert_eq!(stored.from_tt(2), mate);
        assert_eq!(Score::mated_in(4).to_tt(4), Score::mated_in(0));

        let plain = Score::cp(150);
        assert_eq!(plain.to_tt(7), plain);
    }

    #[test]
    fn test_relative_and_display() {
        assert_eq!(Score::cp(40).relative_to(Color::Black), Score::cp(-40));
        assert_eq!(Score::cp(40).relative_to(Color::White), Score::cp(40));
        assert_eq!(Score::mate_in(1).to_string(), "mate 1");
        assert_eq!(Score::mate_in(4).to_string(), "mate 2");
        assert_eq!(Score::mated_in(2).to_string(), "mate -1");
        assert_eq!(Score::cp(-12).to_string(), "cp -12");
        assert!(Score::neg_infinity() < Score::mated_in(0));
        assert!(Score::infinity() > Score::mate_in(0));
    }
}
