//! `Position` implementation backed by the `chess` crate.

use std::fmt;
use std::str::FromStr;

use chess::{Board, BoardStatus, MoveGen};

use super::{Outcome, Position};
use crate::error::EngineError;
use crate::types::{BitBoard, Color, Hash, Move, Piece, Square, EMPTY};
use crate::uci;

/// Automatic draw once this many half-moves pass without a capture or pawn move
const SEVENTY_FIVE_MOVE_PLIES: u32 = 150;

/// Automatic draw once a position occurs this many times
const FIVEFOLD: usize = 5;

const LIGHT_SQUARES: u64 = 0x55AA_55AA_55AA_55AA;

#[derive(Debug, Clone, Copy)]
struct State {
    board: Board,
    halfmove_clock: u32,
}

/// A game in progress: the current board plus the stack of earlier states
/// needed to undo moves and detect repetitions.
#[derive(Debug, Clone)]
pub struct Game {
    board: Board,
    halfmove_clock: u32,
    history: Vec<State>,
    start_fullmove: u32,
    start_side: Color,
}

impl Game {
    pub fn new(board: Board) -> Self {
        Self {
            start_side: board.side_to_move(),
            board,
            halfmove_clock: 0,
            history: Vec::new(),
            start_fullmove: 1,
        }
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    /// Number of half-moves played since the game was set up
    pub fn plies_played(&self) -> usize {
        self.history.len()
    }

    pub fn halfmove_clock(&self) -> u32 {
        self.halfmove_clock
    }

    pub fn fullmove_number(&self) -> u32 {
        let offset = match self.start_side {
            Color::White => 0,
            Color::Black => 1,
        };
        self.start_fullmove + (self.history.len() as u32 + offset) / 2
    }

    /// FEN of the current position, with live move counters
    pub fn fen(&self) -> String {
        let board_fen = self.board.to_string();
        let placement: Vec<&str> = board_fen.split_whitespace().take(4).collect();
        format!(
            "{} {} {}",
            placement.join(" "),
            self.halfmove_clock,
            self.fullmove_number()
        )
    }

    /// Strict move parsing for callers that want an error instead of `None`
    pub fn parse_uci(&self, text: &str) -> Result<Move, EngineError> {
        uci::parse_move(self, text).ok_or_else(|| EngineError::IllegalMove(text.to_string()))
    }

    fn repetitions(&self) -> usize {
        let key = self.board.get_hash();
        // Positions before the last capture or pawn move can never recur
        let earlier = self
            .history
            .iter()
            .rev()
            .take(self.halfmove_clock as usize)
            .filter(|s| s.board.get_hash() == key)
            .count();
        earlier + 1
    }

    fn insufficient_material(&self) -> bool {
        let b = &self.board;
        let heavy = *b.pieces(Piece::Pawn) | *b.pieces(Piece::Rook) | *b.pieces(Piece::Queen);
        if heavy != EMPTY {
            return false;
        }

        let knights = b.pieces(Piece::Knight).popcnt();
        let bishops = *b.pieces(Piece::Bishop);
        if knights + bishops.popcnt() <= 1 {
            return true;
        }

        // Bishops only, all on the same square colour
        let light = BitBoard::new(LIGHT_SQUARES);
        knights == 0 && ((bishops & light) == EMPTY || (bishops & !light) == EMPTY)
    }
}

impl Default for Game {
    fn default() -> Self {
        Self::new(Board::default())
    }
}

impl FromStr for Game {
    type Err = EngineError;

    fn from_str(fen: &str) -> Result<Self, Self::Err> {
        let board = Board::from_str(fen).map_err(|e| EngineError::InvalidFen {
            fen: fen.to_string(),
            reason: format!("{e:?}"),
        })?;

        let mut fields = fen.split_whitespace().skip(4);
        let halfmove_clock = fields.next().and_then(|f| f.parse::<u32>().ok()).unwrap_or(0);
        let start_fullmove = fields
            .next()
            .and_then(|f| f.parse::<u32>().ok())
            .unwrap_or(1)
            .max(1);

        Ok(Self {
            halfmove_clock,
            start_fullmove,
            ..Self::new(board)
        })
    }
}

impl fmt::Display for Game {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.fen())
    }
}

impl Position for Game {
    #[inline]
    fn side_to_move(&self) -> Color {
        self.board.side_to_move()
    }

    fn legal_moves(&self) -> Vec<Move> {
        MoveGen::new_legal(&self.board).collect()
    }

    fn apply(&mut self, m: Move) {
        let resets_clock =
            self.board.piece_on(m.get_source()) == Some(Piece::Pawn) || self.is_capture(m);

        self.history.push(State {
            board: self.board,
            halfmove_clock: self.halfmove_clock,
        });
        self.board = self.board.make_move_new(m);
        self.halfmove_clock = if resets_clock { 0 } else { self.halfmove_clock + 1 };
    }

    fn undo(&mut self) {
        debug_assert!(!self.history.is_empty(), "undo without a matching apply");
        if let Some(state) = self.history.pop() {
            self.board = state.board;
            self.halfmove_clock = state.halfmove_clock;
        }
    }

    #[inline]
    fn in_check(&self) -> bool {
        *self.board.checkers() != EMPTY
    }

    fn outcome(&self) -> Option<Outcome> {
        match self.board.status() {
            BoardStatus::Checkmate => {
                return Some(Outcome::Checkmate {
                    winner: !self.board.side_to_move(),
                })
            }
            BoardStatus::Stalemate => return Some(Outcome::Stalemate),
            BoardStatus::Ongoing => {}
        }

        if self.insufficient_material() {
            Some(Outcome::InsufficientMaterial)
        } else if self.halfmove_clock >= SEVENTY_FIVE_MOVE_PLIES {
            Some(Outcome::SeventyFiveMoves)
        } else if self.repetitions() >= FIVEFOLD {
            Some(Outcome::FivefoldRepetition)
        } else {
            None
        }
    }

    #[inline]
    fn piece_at(&self, sq: Square) -> Option<(Piece, Color)> {
        let piece = self.board.piece_on(sq)?;
        let color = self.board.color_on(sq)?;
        Some((piece, color))
    }

    #[inline]
    fn pieces(&self, piece: Piece, color: Color) -> BitBoard {
        *self.board.pieces(piece) & *self.board.color_combined(color)
    }

    #[inline]
    fn occupied_by(&self, color: Color) -> BitBoard {
        *self.board.color_combined(color)
    }

    #[inline]
    fn king_square(&self, color: Color) -> Square {
        self.board.king_square(color)
    }

    fn attacks_from(&self, sq: Square) -> BitBoard {
        let Some((piece, color)) = self.piece_at(sq) else {
            return EMPTY;
        };
        let occupied = *self.board.combined();

        match piece {
            Piece::Pawn => chess::get_pawn_attacks(sq, color, !EMPTY),
            Piece::Knight => chess::get_knight_moves(sq),
            Piece::Bishop => chess::get_bishop_moves(sq, occupied),
            Piece::Rook => chess::get_rook_moves(sq, occupied),
            Piece::Queen => {
                chess::get_bishop_moves(sq, occupied) | chess::get_rook_moves(sq, occupied)
            }
            Piece::King => chess::get_king_moves(sq),
        }
    }

    fn is_attacked_by(&self, color: Color, sq: Square) -> bool {
        let occupied = *self.board.combined();
        let diagonal = self.pieces(Piece::Bishop, color) | self.pieces(Piece::Queen, color);
        let straight = self.pieces(Piece::Rook, color) | self.pieces(Piece::Queen, color);

        // A pawn of the other colour on `sq` attacks exactly the squares
        // from which `color`'s pawns attack `sq`
        chess::get_pawn_attacks(sq, !color, self.pieces(Piece::Pawn, color)) != EMPTY
            || chess::get_knight_moves(sq) & self.pieces(Piece::Knight, color) != EMPTY
            || chess::get_bishop_moves(sq, occupied) & diagonal != EMPTY
            || chess::get_rook_moves(sq, occupied) & straight != EMPTY
            || chess::get_king_moves(sq) & self.pieces(Piece::King, color) != EMPTY
    }

    #[inline]
    fn key(&self) -> Hash {
        self.board.get_hash()
    }

    fn with_turn<R>(&mut self, color: Color, f: impl FnOnce(&mut Self) -> R) -> Option<R> {
        if self.board.side_to_move() == color {
            return Some(f(self));
        }

        let flipped = self.board.null_move()?;
        let saved = std::mem::replace(&mut self.board, flipped);
        let result = f(self);
        self.board = saved;
        Some(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mv(from: Square, to: Square) -> Move {
        Move::new(from, to, None)
    }

    #[test]
    fn test_apply_undo_roundtrip() {
        let mut game = Game::default();
        let start = game.key();
        game.apply(mv(Square::E2, Square::E4));
        game.apply(mv(Square::E7, Square::E5));
        assert_eq!(game.plies_played(), 2);
        assert_eq!(game.fullmove_number(), 2);
        game.undo();
        game.undo();
        assert_eq!(game.key(), start);
        assert_eq!(game.plies_played(), 0);
    }

    #[test]
    fn test_fen_carries_clocks() {
        let fen = "4k3/8/8/8/8/8/8/R3K3 w - - 12 40";
        let mut game = Game::from_str(fen).unwrap();
        assert_eq!(game.fen(), fen);
        game.apply(mv(Square::A1, Square::A2));
        assert_eq!(game.halfmove_clock(), 13);
        assert!(game.fen().ends_with(" 13 40"));
    }

    #[test]
    fn test_invalid_fen_is_error() {
        let err = Game::from_str("not a fen").unwrap_err();
        assert!(matches!(err, EngineError::InvalidFen { .. }));
    }

    #[test]
    fn test_checkmate_and_stalemate() {
        // Fool's mate
        let mate = Game::from_str("rnb1kbnr/pppp1ppp/8/4p3/6Pq/5P2/PPPPP2P/RNBQKBNR w KQkq - 1 3")
            .unwrap();
        assert_eq!(
            mate.outcome(),
            Some(Outcome::Checkmate { winner: Color::Black })
        );
        assert_eq!(mate.result(), "0-1");

        let stalemate = Game::from_str("7k/5Q2/6K1/8/8/8/8/8 b - - 0 1").unwrap();
        assert_eq!(stalemate.outcome(), Some(Outcome::Stalemate));
        assert!(stalemate.legal_moves().is_empty());
    }

    #[test]
    fn test_insufficient_material() {
        let bare = Game::from_str("4k3/8/8/8/8/8/8/4K3 w - - 0 1").unwrap();
        assert_eq!(bare.outcome(), Some(Outcome::InsufficientMaterial));

        let minor = Game::from_str("4k3/8/8/8/8/8/8/2N1K3 w - - 0 1").unwrap();
        assert_eq!(minor.outcome(), Some(Outcome::InsufficientMaterial));

        // c1 and f8 are both dark squares
        let same_bishops = Game::from_str("5b2/4k3/8/8/8/8/8/2B1K3 w - - 0 1").unwrap();
        assert_eq!(same_bishops.outcome(), Some(Outcome::InsufficientMaterial));

        let rook = Game::from_str("4k3/8/8/8/8/8/8/R3K3 w - - 0 1").unwrap();
        assert_eq!(rook.outcome(), None);
    }

    #[test]
    fn test_seventy_five_move_rule() {
        let game = Game::from_str("4k3/8/8/8/8/8/8/R3K3 w - - 150 100").unwrap();
        assert_eq!(game.outcome(), Some(Outcome::SeventyFiveMoves));
    }

    #[test]
    fn test_fivefold_repetition() {
        let mut game = Game::default();
        let shuffle = [
            mv(Square::G1, Square::F3),
            mv(Square::G8, Square::F6),
            mv(Square::F3, Square::G1),
            mv(Square::F6, Square::G8),
        ];
        for _ in 0..4 {
            assert_eq!(game.outcome(), None);
            for m in shuffle {
                game.apply(m);
            }
        }
        assert_eq!(game.outcome(), Some(Outcome::FivefoldRepetition));
        assert_eq!(game.result(), "1/2-1/2");
    }

    #[test]
    fn test_attack_queries() {
        let game = Game::default();
        assert!(game.is_attacked_by(Color::White, Square::F3));
        assert!(game.is_attacked_by(Color::Black, Square::F6));
        assert!(!game.is_attacked_by(Color::White, Square::E4));
        assert_eq!(game.attacks_from(Square::G1).popcnt(), 3);
        assert_eq!(game.attacks_from(Square::E4), EMPTY);
        assert_eq!(game.king_square(Color::Black), Square::E8);
    }

    #[test]
    fn test_with_turn_flips_and_restores() {
        let mut game = Game::default();
        let key = game.key();
        let black_moves = game.with_turn(Color::Black, |g| {
            assert_eq!(g.side_to_move(), Color::Black);
            g.legal_moves().len()
        });
        assert_eq!(black_moves, Some(20));
        assert_eq!(game.side_to_move(), Color::White);
        assert_eq!(game.key(), key);
    }

    #[test]
    fn test_with_turn_refused_in_check() {
        let mut game = Game::from_str("4k3/8/8/8/8/8/8/R3K2r w - - 0 1").unwrap();
        assert!(game.in_check());
        assert_eq!(game.with_turn(Color::Black, |g| g.legal_moves().len()), None);
    }

    #[test]
    fn test_parse_uci_strict() {
        let game = Game::default();
        assert_eq!(game.parse_uci("e2e4").unwrap(), mv(Square::E2, Square::E4));
        assert!(matches!(game.parse_uci("e2e5"), Err(EngineError::IllegalMove(_))));
    }
}
