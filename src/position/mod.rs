//! Rules-engine contract consumed by evaluation and search.
//!
//! The search never constructs or copies positions. It queries them and
//! mutates them through reversible `apply`/`undo` pairs, always via a
//! [`MoveGuard`] so that every exit path (cutoffs included) restores the
//! position.
//!
//! [`Game`] is the conforming implementation over the `chess` crate.

mod game;

pub use game::Game;

use std::ops::{Deref, DerefMut};

use crate::types::{BitBoard, Color, Hash, Move, Piece, Square, ALL_SQUARES, EMPTY};

/// Why a game has ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Checkmate { winner: Color },
    Stalemate,
    InsufficientMaterial,
    SeventyFiveMoves,
    FivefoldRepetition,
}

impl Outcome {
    #[inline]
    pub fn winner(self) -> Option<Color> {
        match self {
            Outcome::Checkmate { winner } => Some(winner),
            _ => None,
        }
    }

    /// PGN-style result string
    pub fn result(self) -> &'static str {
        match self.winner() {
            Some(Color::White) => "1-0",
            Some(Color::Black) => "0-1",
            None => "1/2-1/2",
        }
    }
}

/// Everything the search core needs from a rules engine.
pub trait Position {
    fn side_to_move(&self) -> Color;

    /// Legal moves for the side to move, without duplicates, in a stable order
    fn legal_moves(&self) -> Vec<Move>;

    /// Play `m`, which must be legal. Paired with exactly one [`Position::undo`].
    fn apply(&mut self, m: Move);

    /// Take back the most recently applied move (strict LIFO)
    fn undo(&mut self);

    fn in_check(&self) -> bool;

    /// `Some` once the game is over
    fn outcome(&self) -> Option<Outcome>;

    fn piece_at(&self, sq: Square) -> Option<(Piece, Color)>;

    /// Bitboard of `color`'s pieces of kind `piece`
    fn pieces(&self, piece: Piece, color: Color) -> BitBoard;

    /// All squares occupied by `color`
    fn occupied_by(&self, color: Color) -> BitBoard;

    fn king_square(&self, color: Color) -> Square;

    /// Squares attacked by the piece standing on `sq` (empty if none)
    fn attacks_from(&self, sq: Square) -> BitBoard;

    fn is_attacked_by(&self, color: Color, sq: Square) -> bool;

    /// Canonical key: board, side to move, castling and en passant
    fn key(&self) -> Hash;

    /// Run `f` with `color` to move, restoring the real turn afterwards.
    ///
    /// Returns `None` when the turn cannot be handed over (the side to move
    /// is in check).
    fn with_turn<R>(&mut self, color: Color, f: impl FnOnce(&mut Self) -> R) -> Option<R>
    where
        Self: Sized;

    fn is_capture(&self, m: Move) -> bool {
        if self.piece_at(m.get_dest()).is_some() {
            return true;
        }
        // en passant lands on an empty square
        matches!(self.piece_at(m.get_source()), Some((Piece::Pawn, _)))
            && m.get_source().get_file() != m.get_dest().get_file()
    }

    fn attacked_squares(&self, color: Color) -> BitBoard {
        ALL_SQUARES
            .iter()
            .filter(|&&sq| self.is_attacked_by(color, sq))
            .fold(EMPTY, |acc, &sq| acc | BitBoard::from_square(sq))
    }

    fn is_game_over(&self) -> bool {
        self.outcome().is_some()
    }

    /// `"1-0"`, `"0-1"`, `"1/2-1/2"` or `"*"` while the game is running
    fn result(&self) -> &'static str {
        self.outcome().map_or("*", Outcome::result)
    }

    fn gives_check(&mut self, m: Move) -> bool
    where
        Self: Sized,
    {
        self.play(m).in_check()
    }

    /// Apply `m` and return a guard that undoes it when dropped
    fn play(&mut self, m: Move) -> MoveGuard<'_, Self>
    where
        Self: Sized,
    {
        MoveGuard::new(self, m)
    }
}

/// Scoped move application: the move is undone when the guard goes out of scope.
pub struct MoveGuard<'a, P: Position> {
    position: &'a mut P,
}

impl<'a, P: Position> MoveGuard<'a, P> {
    pub fn new(position: &'a mut P, m: Move) -> Self {
        position.apply(m);
        Self { position }
    }
}

impl<P: Position> Deref for MoveGuard<'_, P> {
    type Target = P;

    fn deref(&self) -> &P {
        self.position
    }
}

impl<P: Position> DerefMut for MoveGuard<'_, P> {
    fn deref_mut(&mut self) -> &mut P {
        self.position
    }
}

impl<P: Position> Drop for MoveGuard<'_, P> {
    fn drop(&mut self) {
        self.position.undo();
    }
}
