//! UCI command parser.

use super::SearchParams;
use crate::types::Depth;

/// Parsed UCI command
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UciCommand {
    /// "uci" - Initialize UCI mode
    Uci,
    /// "debug on/off"
    Debug(bool),
    /// "isready" - Synchronization
    IsReady,
    /// "setoption name X value Y"
    SetOption { name: String, value: Option<String> },
    /// "ucinewgame" - New game starting
    UciNewGame,
    /// "position startpos/fen [moves ...]"
    Position { fen: Option<String>, moves: Vec<String> },
    /// "go ..." - Start searching
    Go(SearchParams),
    /// "stop" - Stop searching
    Stop,
    /// "quit" - Exit the engine
    Quit,
    /// "d" - Debug: display position (non-standard but common)
    Display,
    /// Unknown command
    Unknown(String),
}

/// Parse a UCI command string into a UciCommand
pub fn parse_command(input: &str) -> UciCommand {
    let input = input.trim();
    let mut parts = input.split_whitespace();

    match parts.next() {
        Some("uci") => UciCommand::Uci,
        Some("debug") => UciCommand::Debug(parts.next() == Some("on")),
        Some("isready") => UciCommand::IsReady,
        Some("setoption") => parse_setoption(&mut parts),
        Some("ucinewgame") => UciCommand::UciNewGame,
        Some("position") => parse_position(&mut parts),
        Some("go") => parse_go(&mut parts),
        Some("stop") => UciCommand::Stop,
        Some("quit") => UciCommand::Quit,
        Some("d") => UciCommand::Display,
        _ => UciCommand::Unknown(input.to_string()),
    }
}

fn parse_setoption<'a>(parts: &mut impl Iterator<Item = &'a str>) -> UciCommand {
    let mut name = String::new();
    let mut value: Option<String> = None;
    let mut parsing_value = false;

    for token in parts {
        match token {
            "name" if !parsing_value => {}
            "value" => parsing_value = true,
            _ => {
                let target = if parsing_value {
                    value.get_or_insert_with(String::new)
                } else {
                    &mut name
                };
                if !target.is_empty() {
                    target.push(' ');
                }
                target.push_str(token);
            }
        }
    }

    UciCommand::SetOption { name, value }
}

fn parse_position<'a>(parts: &mut impl Iterator<Item = &'a str>) -> UciCommand {
    let mut fen = None;
    let mut moves = Vec::new();
    let mut parsing_moves = false;

    while let Some(token) = parts.next() {
        match token {
            "startpos" => fen = None,
            "fen" => {
                // FEN fields run until "moves"
                let mut fen_parts = Vec::new();
                for part in parts.by_ref() {
                    if part == "moves" {
                        parsing_moves = true;
                        break;
                    }
                    fen_parts.push(part);
                }
                if !fen_parts.is_empty() {
                    fen = Some(fen_parts.join(" "));
                }
            }
            "moves" => parsing_moves = true,
            _ if parsing_moves => moves.push(token.to_string()),
            _ => {}
        }
    }

    UciCommand::Position { fen, moves }
}

fn parse_go<'a>(parts: &mut impl Iterator<Item = &'a str>) -> UciCommand {
    let mut params = SearchParams::new();

    while let Some(token) = parts.next() {
        match token {
            "infinite" => params.infinite = true,
            "depth" => params.depth = parts.next().and_then(|v| v.parse().ok()).map(Depth::new),
            "movetime" => params.movetime = parts.next().and_then(|v| v.parse().ok()),
            "wtime" => params.wtime = parts.next().and_then(|v| v.parse().ok()),
            "btime" => params.btime = parts.next().and_then(|v| v.parse().ok()),
            "winc" => params.winc = parts.next().and_then(|v| v.parse().ok()),
            "binc" => params.binc = parts.next().and_then(|v| v.parse().ok()),
            "movestogo" => params.movestogo = parts.next().and_then(|v| v.parse().ok()),
            _ => {}
        }
    }

    UciCommand::Go(params)
}
