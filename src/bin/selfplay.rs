//! Plays random legal games through the public `select` interface and
//! checks the piece counters after every move.
//!
//! Usage: selfplay [--games N] [--seed S] [--config PATH]

use std::env;
use std::path::PathBuf;
use std::process::ExitCode;

use checkers::config::GameConfig;
use checkers::game::{Game, GameResult};
use checkers::piece::Color;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use serde::Serialize;
use tracing_subscriber::EnvFilter;

/// Safety net; the no-capture rule ends real games long before this.
const MAX_MOVES: u32 = 2000;

struct Args {
    games: u32,
    seed: u64,
    config: Option<PathBuf>,
}

fn parse_args() -> Result<Args, String> {
    let mut args = Args {
        games: 100,
        seed: 0,
        config: None,
    };
    let mut it = env::args().skip(1);
    while let Some(flag) = it.next() {
        let value = it.next().ok_or_else(|| format!("{flag} needs a value"))?;
        match flag.as_str() {
            "--games" => args.games = value.parse().map_err(|e| format!("--games: {e}"))?,
            "--seed" => args.seed = value.parse().map_err(|e| format!("--seed: {e}"))?,
            "--config" => args.config = Some(PathBuf::from(value)),
            _ => return Err(format!("unknown flag {flag}")),
        }
    }
    Ok(args)
}

#[derive(Default, Serialize)]
struct Summary {
    games: u32,
    light_wins: u32,
    dark_wins: u32,
    ties: u32,
    unfinished: u32,
    total_moves: u64,
    capturing_moves: u64,
}

fn counters_match(game: &Game) -> bool {
    let board = game.board();
    [Color::Light, Color::Dark]
        .iter()
        .all(|&c| board.remaining(c) as usize == board.pieces(c).count())
}

fn play_game(config: &GameConfig, rng: &mut StdRng, summary: &mut Summary) -> Result<(), String> {
    let mut game = Game::with_config(config.clone());
    let mut moves = 0;
    while game.result().is_none() && moves < MAX_MOVES {
        let legal = game.legal_moves();
        let Some(mv) = legal.choose(rng) else {
            return Err("side to move has no moves but the game is not over".to_string());
        };
        game.select(mv.from.0, mv.from.1).map_err(|e| e.to_string())?;
        game.select(mv.to.0, mv.to.1).map_err(|e| e.to_string())?;
        if game.last_move() != Some((mv.from, mv.to)) {
            return Err(format!("move {:?} -> {:?} was not accepted", mv.from, mv.to));
        }
        if !counters_match(&game) {
            return Err(format!("piece counters drifted after move {moves}"));
        }
        moves += 1;
        summary.total_moves += 1;
        if mv.is_capture() {
            summary.capturing_moves += 1;
        }
    }

    summary.games += 1;
    match game.result() {
        Some(GameResult::Win(Color::Light)) => summary.light_wins += 1,
        Some(GameResult::Win(Color::Dark)) => summary.dark_wins += 1,
        Some(GameResult::Tie) => summary.ties += 1,
        None => summary.unfinished += 1,
    }
    tracing::debug!(moves, result = ?game.result(), "game finished");
    Ok(())
}

fn main() -> ExitCode {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt().with_env_filter(filter).with_writer(std::io::stderr).init();

    let args = match parse_args() {
        Ok(args) => args,
        Err(e) => {
            eprintln!("{e}");
            return ExitCode::FAILURE;
        }
    };
    let config = match &args.config {
        Some(path) => match GameConfig::load(path) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("{}: {e}", path.display());
                return ExitCode::FAILURE;
            }
        },
        None => GameConfig::default(),
    };

    let mut rng = StdRng::seed_from_u64(args.seed);
    let mut summary = Summary::default();
    for n in 0..args.games {
        if let Err(e) = play_game(&config, &mut rng, &mut summary) {
            eprintln!("game {n}: {e}");
            return ExitCode::FAILURE;
        }
    }

    match serde_json::to_string_pretty(&summary) {
        Ok(json) => println!("{json}"),
        Err(e) => {
            eprintln!("{e}");
            return ExitCode::FAILURE;
        }
    }
    ExitCode::SUCCESS
}
