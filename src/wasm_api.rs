use crate::game::{Game, GameResult};
use crate::piece::{Color, Rank};
use serde::Serialize;
use wasm_bindgen::prelude::*;

#[derive(Serialize)]
struct SquarePiece {
    rank: String,
    color: String,
}

#[derive(Serialize)]
struct ViewState {
    squares: Vec<Vec<Option<SquarePiece>>>,
    current_turn: String,
    game_over: bool,
    result: Option<String>,
    winner: Option<String>,
    selected: Option<[usize; 2]>,
    legal_destinations: Vec<[usize; 2]>,
    no_capture_moves: u32,
    light_remaining: u32,
    dark_remaining: u32,
    last_move: Option<[[usize; 2]; 2]>,
}

#[derive(Serialize)]
struct SelectResult {
    #[serde(flatten)]
    view: Option<ViewState>,
    error: Option<String>,
}

fn rank_to_string(rank: Rank) -> String {
    match rank {
        Rank::Man => "Man".to_string(),
        Rank::King => "King".to_string(),
    }
}

fn color_to_string(c: Color) -> String {
    match c {
        Color::Light => "Light".to_string(),
        Color::Dark => "Dark".to_string(),
    }
}

fn build_view_state(game: &Game) -> ViewState {
    let board = game.board();
    let squares: Vec<Vec<Option<SquarePiece>>> = game
        .board_snapshot()
        .iter()
        .map(|row| {
            row.iter()
                .map(|cell| {
                    cell.map(|p| SquarePiece {
                        rank: rank_to_string(p.rank),
                        color: color_to_string(p.color),
                    })
                })
                .collect()
        })
        .collect();

    let winner = match game.result() {
        Some(GameResult::Win(color)) => Some(color_to_string(color)),
        _ => None,
    };

    ViewState {
        squares,
        current_turn: color_to_string(game.turn()),
        game_over: game.result().is_some(),
        result: game.result().map(|r| r.to_string()),
        winner,
        selected: game.selected().map(|p| [p.row, p.col]),
        legal_destinations: game
            .current_legal_destinations()
            .iter()
            .map(|&(r, c)| [r, c])
            .collect(),
        no_capture_moves: game.no_capture_moves(),
        light_remaining: board.remaining(Color::Light),
        dark_remaining: board.remaining(Color::Dark),
        last_move: game.last_move().map(|((fr, fc), (tr, tc))| [[fr, fc], [tr, tc]]),
    }
}

#[wasm_bindgen(js_name = Game)]
pub struct WasmGame {
    game: Game,
}

#[wasm_bindgen(js_class = Game)]
impl WasmGame {
    #[wasm_bindgen(constructor)]
    pub fn new() -> WasmGame {
        WasmGame { game: Game::new() }
    }

    pub fn get_board_state(&self) -> JsValue {
        let state = build_view_state(&self.game);
        serde_wasm_bindgen::to_value(&state).unwrap_or(JsValue::NULL)
    }

    /// Forward a click on a board cell. The page converts pixels to (row, col).
    pub fn select(&mut self, row: usize, col: usize) -> JsValue {
        let result = match self.game.select(row, col) {
            Ok(()) => SelectResult {
                view: Some(build_view_state(&self.game)),
                error: None,
            },
            Err(e) => SelectResult {
                view: None,
                error: Some(e.to_string()),
            },
        };
        serde_wasm_bindgen::to_value(&result).unwrap_or(JsValue::NULL)
    }

    pub fn get_legal_destinations(&self) -> JsValue {
        let dests: Vec<[usize; 2]> = self
            .game
            .current_legal_destinations()
            .iter()
            .map(|&(r, c)| [r, c])
            .collect();
        serde_wasm_bindgen::to_value(&dests).unwrap_or(JsValue::NULL)
    }

    pub fn reset(&mut self) {
        self.game = Game::with_config(self.game.config().clone());
    }
}
