// =============================================================================
// Turn state machine
//
// A host drives the game with one call, `select(row, col)`. The first select
// picks up a piece of the side to move; a second select on one of that
// piece's destinations commits the move. Anything else drops the selection
// and is treated as a fresh pick-up attempt on the same square.
//
// After every committed move the opponent's moves are generated: no moves
// means the mover wins, otherwise the no-capture counter may end the game in
// a tie. Once a result is set the board is frozen.
// =============================================================================

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::board::{Board, PieceView, Square, SIZE};
use crate::config::GameConfig;
use crate::error::EngineError;
use crate::moves::{self, Move, MoveMap};
use crate::piece::{Color, Piece};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameResult {
    Win(Color),
    Tie,
}

impl fmt::Display for GameResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GameResult::Win(Color::Light) => write!(f, "LIGHT WON"),
            GameResult::Win(Color::Dark) => write!(f, "DARK WON"),
            GameResult::Tie => write!(f, "TIE"),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    AwaitingSelection,
    PieceSelected,
    GameOver,
}

#[derive(Clone, Debug)]
pub struct Game {
    board: Board,
    config: GameConfig,
    turn: Color,
    selected: Option<Piece>,
    valid_moves: MoveMap,
    no_capture_moves: u32,
    result: Option<GameResult>,
    last_move: Option<(Square, Square)>,
}

impl Default for Game {
    fn default() -> Self {
        Self::new()
    }
}

impl Game {
    pub fn new() -> Self {
        Self::with_board(Board::new(), GameConfig::default())
    }

    pub fn with_config(config: GameConfig) -> Self {
        Self::with_board(Board::new(), config)
    }

    /// Start from an arbitrary position.
    pub fn with_board(board: Board, config: GameConfig) -> Self {
        Game {
            board,
            turn: config.first_turn,
            config,
            selected: None,
            valid_moves: MoveMap::new(),
            no_capture_moves: 0,
            result: None,
            last_move: None,
        }
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn board_snapshot(&self) -> [[Option<PieceView>; SIZE]; SIZE] {
        self.board.snapshot()
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn turn(&self) -> Color {
        self.turn
    }

    pub fn selected(&self) -> Option<&Piece> {
        self.selected.as_ref()
    }

    pub fn result(&self) -> Option<GameResult> {
        self.result
    }

    pub fn no_capture_moves(&self) -> u32 {
        self.no_capture_moves
    }

    pub fn last_move(&self) -> Option<(Square, Square)> {
        self.last_move
    }

    pub fn phase(&self) -> Phase {
        if self.result.is_some() {
            Phase::GameOver
        } else if self.selected.is_some() {
            Phase::PieceSelected
        } else {
            Phase::AwaitingSelection
        }
    }

    /// Destinations of the selected piece, for highlighting.
    pub fn current_legal_destinations(&self) -> Vec<Square> {
        self.valid_moves.keys().copied().collect()
    }

    /// Every legal move of the side to move; empty once the game is over.
    pub fn legal_moves(&self) -> Vec<Move> {
        if self.result.is_some() {
            return Vec::new();
        }
        moves::all_moves(&self.board, self.turn)
    }

    /// Handle a click on `(row, col)`. Illegal clicks are ignored; only
    /// off-board coordinates are an error.
    pub fn select(&mut self, row: usize, col: usize) -> Result<(), EngineError> {
        let cell = *self.board.piece_at(row, col)?;
        if self.result.is_some() {
            return Ok(());
        }

        if self.selected.is_some() {
            if let Some(captured) = self.valid_moves.get(&(row, col)).cloned() {
                return self.commit((row, col), captured);
            }
            self.clear_selection();
        }

        match cell.piece() {
            Some(piece) if piece.color == self.turn => {
                let moves = moves::legal_moves(&self.board, piece)?;
                if moves.is_empty() {
                    tracing::trace!(row, col, "piece has no legal moves");
                } else {
                    tracing::trace!(row, col, destinations = moves.len(), "piece selected");
                    self.selected = Some(*piece);
                    self.valid_moves = moves;
                }
            }
            _ => tracing::trace!(row, col, turn = ?self.turn, "nothing to select"),
        }
        Ok(())
    }

    fn clear_selection(&mut self) {
        self.selected = None;
        self.valid_moves.clear();
    }

    fn commit(&mut self, to: Square, captured: Vec<Piece>) -> Result<(), EngineError> {
        let Some(piece) = self.selected.take() else {
            return Ok(());
        };
        self.valid_moves.clear();

        let from = piece.square();
        self.board.move_piece(&piece, to.0, to.1)?;
        if captured.is_empty() {
            self.no_capture_moves += 1;
        } else {
            self.board.remove_pieces(&captured)?;
            self.no_capture_moves = 0;
        }
        self.last_move = Some((from, to));
        tracing::debug!(
            color = ?self.turn,
            ?from,
            ?to,
            captured = captured.len(),
            no_capture_moves = self.no_capture_moves,
            "move committed"
        );

        let mover = self.turn;
        let opponent = mover.opposite();
        if self.board.winner_by_attrition() == Some(mover)
            || !moves::has_any_move(&self.board, opponent)
        {
            self.finish(GameResult::Win(mover));
        } else if self.no_capture_moves >= self.config.no_capture_limit {
            self.finish(GameResult::Tie);
        } else {
            self.turn = opponent;
        }
        Ok(())
    }

    fn finish(&mut self, result: GameResult) {
        tracing::info!(%result, no_capture_moves = self.no_capture_moves, "game over");
        self.result = Some(result);
    }
}
