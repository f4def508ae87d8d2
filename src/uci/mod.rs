//! UCI (Universal Chess Interface) protocol handler.
//!
//! This module implements the UCI protocol for communication with chess GUIs,
//! plus the move-text helpers shared by every driver.
//! See: http://wbec-ridderkerk.nl/html/UCIProtocol.html

mod handler;
mod parser;

pub use handler::{InfoBuilder, UciHandler};
pub use parser::{parse_command, UciCommand};

use std::str::FromStr;

use crate::position::Position;
use crate::types::{Depth, Move, Piece, Square};

/// UCI engine identification
pub const ENGINE_NAME: &str = "minimax-chess";
pub const ENGINE_AUTHOR: &str = "minimax-chess developers";

/// Time control parameters from "go" command
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchParams {
    /// Search to this depth
    pub depth: Option<Depth>,
    /// Search for this many milliseconds
    pub movetime: Option<u64>,
    /// White time remaining (ms)
    pub wtime: Option<u64>,
    /// Black time remaining (ms)
    pub btime: Option<u64>,
    /// White increment per move (ms)
    pub winc: Option<u64>,
    /// Black increment per move (ms)
    pub binc: Option<u64>,
    /// Moves until next time control
    pub movestogo: Option<u32>,
    /// Infinite search (until "stop")
    pub infinite: bool,
}

impl SearchParams {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create params for a fixed depth search
    pub fn fixed_depth(depth: i32) -> Self {
        Self {
            depth: Some(Depth::new(depth)),
            ..Default::default()
        }
    }

    /// Create params for a fixed time search
    pub fn fixed_time(ms: u64) -> Self {
        Self {
            movetime: Some(ms),
            ..Default::default()
        }
    }

    /// No clock information at all
    pub fn is_untimed(&self) -> bool {
        self.movetime.is_none() && self.wtime.is_none() && self.btime.is_none()
    }
}

fn parse_promotion(c: char) -> Option<Piece> {
    match c.to_ascii_lowercase() {
        'q' => Some(Piece::Queen),
        'r' => Some(Piece::Rook),
        'b' => Some(Piece::Bishop),
        'n' => Some(Piece::Knight),
        _ => None,
    }
}

/// Split UCI move text into squares and promotion without checking legality
fn parse_coordinates(text: &str) -> Option<(Square, Square, Option<Piece>)> {
    if !text.is_ascii() || !(4..=5).contains(&text.len()) {
        return None;
    }
    let from = Square::from_str(&text[0..2]).ok()?;
    let to = Square::from_str(&text[2..4]).ok()?;
    if from == to {
        return None;
    }
    let promo = match text[4..].chars().next() {
        Some(c) => Some(parse_promotion(c)?),
        None => None,
    };
    Some((from, to, promo))
}

/// Whether `text` is well-formed UCI move syntax ("0000" is the null move)
pub fn is_valid_uci(text: &str) -> bool {
    text == "0000" || parse_coordinates(text).is_some()
}

/// Parse a move string (e.g., "e2e4", "e7e8q") into a legal move of `pos`
pub fn parse_move<P: Position>(pos: &P, move_str: &str) -> Option<Move> {
    let (from, to, promo) = parse_coordinates(move_str.trim())?;
    pos.legal_moves().into_iter().find(|m| {
        m.get_source() == from && m.get_dest() == to && m.get_promotion() == promo
    })
}

/// Format a move to UCI notation (e.g., "e2e4", "e7e8q")
pub fn format_move(m: Move) -> String {
    let mut s = format!("{}{}", m.get_source(), m.get_dest());
    if let Some(promo) = m.get_promotion() {
        let c = match promo {
            Piece::Queen => 'q',
            Piece::Rook => 'r',
            Piece::Bishop => 'b',
            _ => 'n',
        };
        s.push(c);
    }
    s
}
