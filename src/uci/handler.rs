//! UCI command handler and main loop.

use std::io::{self, BufRead, Write};
use std::str::FromStr;

use log::{debug, warn};

use super::parser::{parse_command, UciCommand};
use super::{format_move, parse_move, SearchParams, ENGINE_AUTHOR, ENGINE_NAME};
use crate::config::EngineConfig;
use crate::eval;
use crate::position::{Game, Position};
use crate::search::{SearchLimits, SearchResult, Searcher};
use crate::types::{Move, Score};

const MAX_HASH_MB: usize = 1024;
const MAX_MOVE_OVERHEAD: u64 = 5000;
const MAX_QUIESCENCE_DEPTH: i32 = 16;

/// UCI protocol handler
pub struct UciHandler<W: Write = io::Stdout> {
    /// Current position
    game: Game,
    /// Search engine
    searcher: Searcher,
    config: EngineConfig,
    /// Responses go here
    out: W,
    /// Debug mode enabled
    debug: bool,
    /// Should the engine quit
    quit: bool,
}

impl UciHandler<io::Stdout> {
    /// Handler speaking on standard output
    pub fn stdout(config: EngineConfig) -> Self {
        Self::new(config, io::stdout())
    }
}

impl<W: Write> UciHandler<W> {
    pub fn new(config: EngineConfig, out: W) -> Self {
        Self {
            game: Game::default(),
            searcher: Searcher::new(config.search.clone()),
            config,
            out,
            debug: false,
            quit: false,
        }
    }

    pub fn game(&self) -> &Game {
        &self.game
    }

    pub fn searcher(&self) -> &Searcher {
        &self.searcher
    }

    pub fn output(&self) -> &W {
        &self.out
    }

    pub fn should_quit(&self) -> bool {
        self.quit
    }

    /// Run the UCI main loop until "quit" or end of input
    pub fn run<R: BufRead>(&mut self, input: R) -> io::Result<()> {
        for line in input.lines() {
            let line = line?;
            if self.debug {
                debug!("< {}", line);
            }
            self.handle_input(&line);
            if self.quit {
                break;
            }
        }
        Ok(())
    }

    /// Handle a single UCI command
    pub fn handle_input(&mut self, input: &str) {
        let cmd = parse_command(input);
        self.handle_command(cmd);
    }

    fn handle_command(&mut self, cmd: UciCommand) {
        match cmd {
            UciCommand::Uci => self.cmd_uci(),
            UciCommand::Debug(on) => self.debug = on,
            UciCommand::IsReady => self.send("readyok"),
            UciCommand::SetOption { name, value } => self.cmd_setoption(&name, value.as_deref()),
            UciCommand::UciNewGame => self.cmd_ucinewgame(),
            UciCommand::Position { fen, moves } => self.cmd_position(fen.as_deref(), &moves),
            UciCommand::Go(params) => self.cmd_go(&params),
            // Searches run to completion before the next command is read
            UciCommand::Stop => debug!("stop received with no search running"),
            UciCommand::Quit => self.quit = true,
            UciCommand::Display => self.cmd_display(),
            UciCommand::Unknown(s) => {
                if !s.is_empty() {
                    warn!("unknown command: {}", s);
                }
            }
        }
    }

    /// Send output to GUI
    fn send(&mut self, msg: &str) {
        // A closed pipe means the GUI is gone; nothing useful to do
        let _ = writeln!(self.out, "{}", msg);
        let _ = self.out.flush();
    }

    // === UCI Commands ===

    fn cmd_uci(&mut self) {
        self.send(&format!("id name {}", ENGINE_NAME));
        self.send(&format!("id author {}", ENGINE_AUTHOR));

        let hash = self.config.search.tt_size_mb;
        let overhead = self.config.move_overhead_ms;
        let qdepth = self.config.search.quiescence_depth;
        self.send(&format!(
            "option name Hash type spin default {} min 1 max {}",
            hash, MAX_HASH_MB
        ));
        self.send(&format!(
            "option name Move Overhead type spin default {} min 0 max {}",
            overhead, MAX_MOVE_OVERHEAD
        ));
        self.send(&format!(
            "option name QuiescenceDepth type spin default {} min 0 max {}",
            qdepth, MAX_QUIESCENCE_DEPTH
        ));

        self.send("uciok");
    }

    fn cmd_setoption(&mut self, name: &str, value: Option<&str>) {
        let key = name.to_lowercase().replace(' ', "");
        let parsed = value.and_then(|v| v.trim().parse::<i64>().ok());

        match (key.as_str(), parsed) {
            ("hash", Some(mb)) => {
                let mb = mb.clamp(1, MAX_HASH_MB as i64) as usize;
                self.config.search.tt_size_mb = mb;
                self.searcher.resize_tt(mb);
            }
            ("moveoverhead", Some(ms)) => {
                self.config.move_overhead_ms = ms.clamp(0, MAX_MOVE_OVERHEAD as i64) as u64;
            }
            ("quiescencedepth", Some(d)) => {
                let d = d.clamp(0, MAX_QUIESCENCE_DEPTH as i64) as i32;
                self.config.search.quiescence_depth = d;
                self.searcher.set_quiescence_depth(d);
            }
            ("hash" | "moveoverhead" | "quiescencedepth", None) => {
                warn!("option {} needs a numeric value, got {:?}", name, value);
            }
            _ => warn!("unknown option: {}", name),
        }
    }

    fn cmd_ucinewgame(&mut self) {
        self.game = Game::default();
        self.searcher.clear_tt();
        debug!("new game: transposition table cleared");
    }

    fn cmd_position(&mut self, fen: Option<&str>, moves: &[String]) {
        let mut game = match fen {
            Some(f) => match Game::from_str(f) {
                Ok(game) => game,
                Err(e) => {
                    warn!("{}; keeping the current position", e);
                    return;
                }
            },
            None => Game::default(),
        };

        for move_str in moves {
            match parse_move(&game, move_str) {
                Some(m) => game.apply(m),
                None => {
                    warn!("illegal move {} in position command; ignoring the rest", move_str);
                    break;
                }
            }
        }

        self.game = game;
    }

    /// Turn "go" parameters into search limits
    fn limits(&self, params: &SearchParams) -> SearchLimits {
        let mut limits = SearchLimits::from_params(params, self.config.move_overhead_ms);
        // Without a clock, fall back to the configured depth
        if limits.depth.is_none() && (params.infinite || params.is_untimed()) {
            limits.depth = Some(self.config.depth());
        }
        limits
    }

    fn cmd_go(&mut self, params: &SearchParams) {
        let limits = self.limits(params);
        let result = self.searcher.search(&mut self.game, &limits);

        let info = InfoBuilder::new()
            .depth(result.stats.depth.raw())
            .seldepth(result.stats.seldepth.raw())
            .score(result.score)
            .nodes(result.stats.nodes)
            .nps(result.stats.nps())
            .time(result.stats.time_ms)
            .hashfull(self.searcher.tt().hashfull())
            .pv(&result.pv)
            .build();
        if result.best_move.is_some() {
            self.send(&info);
        }

        self.send(&bestmove_line(&result));
    }

    fn cmd_display(&mut self) {
        let fen = self.game.fen();
        let score = eval::evaluate(&mut self.game);
        self.send(&format!("Fen: {}", fen));
        self.send(&format!("Eval: {} (white)", score));
        self.send(&format!("Side to move: {:?}", self.game.side_to_move()));
    }
}

fn bestmove_line(result: &SearchResult) -> String {
    match result.best_move {
        Some(m) => format!("bestmove {}", format_move(m)),
        None => "bestmove 0000".to_string(),
    }
}

/// Info message builder for search output
#[derive(Debug, Default)]
pub struct InfoBuilder {
    parts: Vec<String>,
}

impl InfoBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn depth(mut self, d: i32) -> Self {
        self.parts.push(format!("depth {}", d));
        self
    }

    pub fn seldepth(mut self, d: i32) -> Self {
        self.parts.push(format!("seldepth {}", d));
        self
    }

    pub fn score(mut self, s: Score) -> Self {
        self.parts.push(format!("score {}", s));
        self
    }

    pub fn nodes(mut self, n: u64) -> Self {
        self.parts.push(format!("nodes {}", n));
        self
    }

    pub fn nps(mut self, n: u64) -> Self {
        self.parts.push(format!("nps {}", n));
        self
    }

    pub fn time(mut self, ms: u64) -> Self {
        self.parts.push(format!("time {}", ms));
        self
    }

    pub fn hashfull(mut self, permill: u32) -> Self {
        self.parts.push(format!("hashfull {}", permill));
        self
    }

    /// Must come last: GUIs read everything after "pv" as moves
    pub fn pv(mut self, moves: &[Move]) -> Self {
        if !moves.is_empty() {
            let pv_str: Vec<String> = moves.iter().map(|&m| format_move(m)).collect();
            self.parts.push(format!("pv {}", pv_str.join(" ")));
        }
        self
    }

    pub fn build(self) -> String {
        format!("info {}", self.parts.join(" "))
    }
}
