use std::io::{self, Write};
use std::path::PathBuf;
use std::str::FromStr;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use log::{debug, info, warn};

use minimax_chess::eval;
use minimax_chess::uci::{format_move, UciHandler};
use minimax_chess::{Depth, EngineConfig, Game, Position, SearchStrategy, Searcher};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// TOML configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Speak UCI on stdin/stdout (default)
    Uci,
    /// Let the engine play both sides
    Play {
        /// Starting position
        #[arg(long)]
        fen: Option<String>,
        /// Search depth per move
        #[arg(long)]
        depth: Option<i32>,
        /// Time budget per move in milliseconds
        #[arg(long)]
        time_ms: Option<u64>,
        /// Stop after this many plies even if the game is not over
        #[arg(long)]
        max_plies: Option<usize>,
    },
    /// Print the static evaluation of a position
    Eval {
        #[arg(long)]
        fen: Option<String>,
    },
}

fn main() {
    let cli = Cli::parse();

    let log_level = if cli.debug { "debug" } else { "info" };
    env_logger::Builder::from_env(
        env_logger::Env::default().filter_or(env_logger::DEFAULT_FILTER_ENV, log_level),
    )
    .target(env_logger::Target::Stderr)
    .init();

    if let Err(e) = run(cli) {
        log::error!("Fatal error: {e:#}");
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    let config = EngineConfig::load_or_default(cli.config.as_deref())
        .context("loading engine configuration")?;

    match cli.command.unwrap_or(Command::Uci) {
        Command::Uci => {
            let mut handler = UciHandler::stdout(config);
            handler.run(io::stdin().lock()).context("reading UCI input")
        }
        Command::Play {
            fen,
            depth,
            time_ms,
            max_plies,
        } => {
            let mut config = config;
            if let Some(d) = depth {
                config.max_depth = d;
            }
            if let Some(ms) = time_ms {
                config.time_budget_ms = ms;
            }
            let game = load_game(fen.as_deref())?;
            self_play(game, &config, max_plies)
        }
        Command::Eval { fen } => {
            let mut game = load_game(fen.as_deref())?;
            let b = eval::breakdown(&mut game);
            println!("fen:            {}", game.fen());
            println!("phase:          {}", if b.endgame { "endgame" } else { "middlegame" });
            println!("material+pst:   {}", b.material);
            println!("king safety:    {}", b.king_safety);
            println!("pawn structure: {}", b.pawn_structure);
            println!("mobility:       {}", b.mobility);
            println!("total:          {}", eval::evaluate(&mut game));
            Ok(())
        }
    }
}

fn load_game(fen: Option<&str>) -> Result<Game> {
    match fen {
        Some(f) => Game::from_str(f).context("parsing --fen"),
        None => Ok(Game::default()),
    }
}

fn self_play(mut game: Game, config: &EngineConfig, max_plies: Option<usize>) -> Result<()> {
    let mut searcher = Searcher::new(config.search.clone());
    let depth: Depth = config.depth();
    let budget = config.time_budget();
    let mut stdout = io::stdout().lock();
    let mut plies = 0;

    info!(
        "self-play: depth {} budget {}ms",
        depth.raw(),
        budget.as_millis()
    );

    while !game.is_game_over() {
        if max_plies.is_some_and(|max| plies >= max) {
            break;
        }

        writeln!(stdout, "{}", game.fen())?;
        writeln!(stdout, "Current evaluation: {}", eval::evaluate(&mut game))?;

        let chosen = searcher.find_best_move(&mut game, depth, budget);
        let m = match chosen {
            Some(m) => m,
            None => {
                warn!("search returned no move; playing the first legal move");
                match game.legal_moves().first() {
                    Some(&m) => m,
                    None => break,
                }
            }
        };
        if !game.legal_moves().contains(&m) {
            warn!("engine chose illegal move {}", format_move(m));
            break;
        }

        game.apply(m);
        plies += 1;
        debug!("ply {}: {}", plies, format_move(m));
        writeln!(stdout, "Move made: {}", format_move(m))?;
    }

    writeln!(stdout)?;
    writeln!(stdout, "Game Over")?;
    writeln!(stdout, "Result: {}", game.result())?;
    Ok(())
}
