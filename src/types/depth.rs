//! Remaining depth and distance-from-root counters.

use std::fmt;
use std::ops::{Add, Sub};

/// Deepest iteration the searcher will start
pub const MAX_DEPTH: i32 = 64;

/// Shared newtype plumbing for the two half-move counters
macro_rules! half_move_counter {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Debug)]
        #[repr(transparent)]
        pub struct $name(pub i32);

        impl $name {
            pub const ZERO: $name = $name(0);

            #[inline]
            pub const fn new(n: i32) -> Self {
                $name(n)
            }

            #[inline]
            pub const fn raw(self) -> i32 {
                self.0
            }
        }

        impl From<i32> for $name {
            #[inline]
            fn from(n: i32) -> Self {
                $name(n)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

half_move_counter! {
    /// Plies left before the horizon; never negative
    Depth
}

half_move_counter! {
    /// Half-moves played since the search root
    Ply
}

impl Depth {
    pub const ONE: Depth = Depth(1);
    pub const MAX: Depth = Depth(MAX_DEPTH);

    /// At the horizon: only quiescence remains
    #[inline]
    pub const fn is_qs(self) -> bool {
        self.0 <= 0
    }
}

impl Add<i32> for Depth {
    type Output = Self;
    #[inline]
    fn add(self, plies: i32) -> Self {
        Depth(self.0 + plies)
    }
}

/// Reductions bottom out at the horizon
impl Sub<i32> for Depth {
    type Output = Self;
    #[inline]
    fn sub(self, plies: i32) -> Self {
        Depth((self.0 - plies).max(0))
    }
}

impl Ply {
    /// One half-move further from the root
    #[inline]
    pub const fn next(self) -> Self {
        Ply(self.0 + 1)
    }
}
