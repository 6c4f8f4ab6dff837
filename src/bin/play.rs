//! Terminal host: type `row col` to click a square, `quit` to leave.
//!
//! Usage: play [CONFIG.json]

use std::env;
use std::io::{self, BufRead, Write};
use std::path::Path;
use std::process::ExitCode;

use checkers::config::GameConfig;
use checkers::game::Game;
use tracing_subscriber::EnvFilter;

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn parse_square(line: &str) -> Option<(usize, usize)> {
    let mut parts = line
        .split(|c: char| c.is_whitespace() || c == ',')
        .filter(|s| !s.is_empty());
    let row = parts.next()?.parse().ok()?;
    let col = parts.next()?.parse().ok()?;
    if parts.next().is_some() {
        return None;
    }
    Some((row, col))
}

fn render(game: &Game, out: &mut impl Write) -> io::Result<()> {
    writeln!(out)?;
    write!(out, "{}", game.board())?;
    if let Some(result) = game.result() {
        writeln!(out, "*** {result} ***")?;
        return Ok(());
    }
    writeln!(
        out,
        "{:?} to move, {} moves without a capture",
        game.turn(),
        game.no_capture_moves()
    )?;
    if let Some(piece) = game.selected() {
        let dests: Vec<String> = game
            .current_legal_destinations()
            .iter()
            .map(|(r, c)| format!("{r} {c}"))
            .collect();
        writeln!(out, "selected {} {} -> {}", piece.row, piece.col, dests.join(" | "))?;
    }
    Ok(())
}

fn main() -> ExitCode {
    init_logging();

    let config = match env::args().nth(1) {
        Some(path) => match GameConfig::load(Path::new(&path)) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("{path}: {e}");
                return ExitCode::FAILURE;
            }
        },
        None => GameConfig::default(),
    };

    let mut game = Game::with_config(config);
    let stdout = io::stdout();
    let mut out = stdout.lock();
    let _ = writeln!(out, "checkers (built {})", env!("BUILD_TIMESTAMP"));
    if render(&game, &mut out).is_err() {
        return ExitCode::FAILURE;
    }

    for line in io::stdin().lock().lines() {
        let Ok(line) = line else {
            break;
        };
        let line = line.trim();
        if line == "quit" || line == "q" {
            break;
        }
        if line.is_empty() {
            continue;
        }
        match parse_square(line) {
            Some((row, col)) => {
                if let Err(e) = game.select(row, col) {
                    eprintln!("{e}");
                    continue;
                }
            }
            None => {
                eprintln!("expected `row col`, got {line:?}");
                continue;
            }
        }
        if render(&game, &mut out).is_err() {
            return ExitCode::FAILURE;
        }
        let _ = out.flush();
    }

    ExitCode::SUCCESS
}
