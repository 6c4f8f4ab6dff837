use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::EngineError;
use crate::piece::{Color, Piece, PieceId, Rank};

pub const SIZE: usize = 8;

/// Board coordinate as (row, col).
pub type Square = (usize, usize);

#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub enum Cell {
    Empty,
    Occupied(Piece),
}

impl Cell {
    pub fn piece(&self) -> Option<&Piece> {
        match self {
            Cell::Empty => None,
            Cell::Occupied(p) => Some(p),
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Cell::Empty)
    }
}

/// What a renderer needs to draw a piece.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PieceView {
    pub color: Color,
    pub rank: Rank,
}

/// Dark squares carry the pieces: row 0 uses the odd columns.
pub fn is_playable(row: usize, col: usize) -> bool {
    col % 2 == (row + 1) % 2
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(try_from = "BoardData")]
pub struct Board {
    squares: [[Cell; SIZE]; SIZE],
    light_remaining: u32,
    dark_remaining: u32,
    next_id: u16,
}

/// Unchecked wire form of a [`Board`]; loading goes through `TryFrom`.
#[derive(Deserialize)]
struct BoardData {
    squares: [[Cell; SIZE]; SIZE],
    light_remaining: u32,
    dark_remaining: u32,
    next_id: u16,
}

impl TryFrom<BoardData> for Board {
    type Error = EngineError;

    fn try_from(data: BoardData) -> Result<Self, Self::Error> {
        let mut ids = Vec::new();
        let (mut light, mut dark) = (0, 0);
        for (r, row) in data.squares.iter().enumerate() {
            for (c, cell) in row.iter().enumerate() {
                let Some(p) = cell.piece() else {
                    continue;
                };
                if (p.row, p.col) != (r, c) {
                    return Err(EngineError::Inconsistent(format!(
                        "piece {:?} stored at ({r}, {c}) claims ({}, {})",
                        p.id, p.row, p.col
                    )));
                }
                if p.id.0 >= data.next_id || ids.contains(&p.id) {
                    return Err(EngineError::Inconsistent(format!("piece id {:?} reused", p.id)));
                }
                ids.push(p.id);
                match p.color {
                    Color::Light => light += 1,
                    Color::Dark => dark += 1,
                }
            }
        }
        if light != data.light_remaining || dark != data.dark_remaining {
            return Err(EngineError::Inconsistent(format!(
                "counters {}/{} do not match {light}/{dark} pieces on the grid",
                data.light_remaining, data.dark_remaining
            )));
        }
        Ok(Board {
            squares: data.squares,
            light_remaining: data.light_remaining,
            dark_remaining: data.dark_remaining,
            next_id: data.next_id,
        })
    }
}

impl Default for Board {
    fn default() -> Self {
        Self::new()
    }
}

impl Board {
    /// Create an empty board with no pieces. Useful for setting up test positions.
    pub fn empty() -> Self {
        Board {
            squares: [[Cell::Empty; SIZE]; SIZE],
            light_remaining: 0,
            dark_remaining: 0,
            next_id: 0,
        }
    }

    /// Standard opening: Light men on rows 0-2, Dark men on rows 5-7.
    pub fn new() -> Self {
        let mut board = Board::empty();
        for row in 0..SIZE {
            let color = match row {
                0..=2 => Color::Light,
                5..=7 => Color::Dark,
                _ => continue,
            };
            for col in (0..SIZE).filter(|&c| is_playable(row, c)) {
                let id = PieceId(board.next_id);
                board.next_id += 1;
                board.squares[row][col] = Cell::Occupied(Piece::new(id, row, col, color));
                *board.count_mut(color) += 1;
            }
        }
        board
    }

    pub(crate) fn in_bounds(row: i32, col: i32) -> bool {
        (0..SIZE as i32).contains(&row) && (0..SIZE as i32).contains(&col)
    }

    fn check_bounds(row: usize, col: usize) -> Result<(), EngineError> {
        if row < SIZE && col < SIZE {
            Ok(())
        } else {
            Err(EngineError::OutOfBounds { row, col })
        }
    }

    fn next_piece_id(&mut self) -> Result<PieceId, EngineError> {
        let id = PieceId(self.next_id);
        self.next_id = self
            .next_id
            .checked_add(1)
            .ok_or(EngineError::IdsExhausted)?;
        Ok(id)
    }

    fn count_mut(&mut self, color: Color) -> &mut u32 {
        match color {
            Color::Light => &mut self.light_remaining,
            Color::Dark => &mut self.dark_remaining,
        }
    }

    /// Put a new man or king on an empty square.
    pub fn place(
        &mut self,
        row: usize,
        col: usize,
        color: Color,
        rank: Rank,
    ) -> Result<PieceId, EngineError> {
        Self::check_bounds(row, col)?;
        if !self.squares[row][col].is_empty() {
            return Err(EngineError::SquareOccupied { row, col });
        }
        let id = self.next_piece_id()?;
        let mut piece = Piece::new(id, row, col, color);
        piece.rank = rank;
        self.squares[row][col] = Cell::Occupied(piece);
        *self.count_mut(color) += 1;
        Ok(id)
    }

    pub fn piece_at(&self, row: usize, col: usize) -> Result<&Cell, EngineError> {
        Self::check_bounds(row, col)?;
        Ok(&self.squares[row][col])
    }

    /// Off-board lookups return `None` instead of failing; used while walking diagonals.
    pub(crate) fn cell(&self, row: i32, col: i32) -> Option<&Cell> {
        if Self::in_bounds(row, col) {
            Some(&self.squares[row as usize][col as usize])
        } else {
            None
        }
    }

    /// Confirm that `piece` still stands where it says it does and return the
    /// board's current copy of it.
    pub fn verify(&self, piece: &Piece) -> Result<Piece, EngineError> {
        let invalid = EngineError::InvalidPiece {
            id: piece.id,
            row: piece.row,
            col: piece.col,
        };
        if piece.row >= SIZE || piece.col >= SIZE {
            return Err(invalid);
        }
        match self.squares[piece.row][piece.col].piece() {
            Some(p) if p.is(piece) => Ok(*p),
            _ => Err(invalid),
        }
    }

    pub fn find(&self, id: PieceId) -> Option<Piece> {
        self.squares
            .iter()
            .flatten()
            .filter_map(Cell::piece)
            .find(|p| p.id == id)
            .copied()
    }

    /// All pieces of one color in row-major order.
    pub fn pieces(&self, color: Color) -> impl Iterator<Item = Piece> + '_ {
        self.squares
            .iter()
            .flatten()
            .filter_map(Cell::piece)
            .filter(move |p| p.color == color)
            .copied()
    }

    pub fn remaining(&self, color: Color) -> u32 {
        match color {
            Color::Light => self.light_remaining,
            Color::Dark => self.dark_remaining,
        }
    }

    /// Move a piece to an empty square and crown it if it reached the far row.
    /// Returns the piece as it stands afterwards.
    pub fn move_piece(
        &mut self,
        piece: &Piece,
        dest_row: usize,
        dest_col: usize,
    ) -> Result<Piece, EngineError> {
        // The grid copy is authoritative; the caller's snapshot may predate a promotion.
        let mut moved = self.verify(piece)?;
        Self::check_bounds(dest_row, dest_col)?;
        if !self.squares[dest_row][dest_col].is_empty() {
            return Err(EngineError::SquareOccupied {
                row: dest_row,
                col: dest_col,
            });
        }

        self.squares[piece.row][piece.col] = Cell::Empty;
        moved.row = dest_row;
        moved.col = dest_col;

        if moved.rank == Rank::Man && dest_row == moved.color.promotion_row() {
            moved.rank = Rank::King;
            tracing::debug!(id = ?moved.id, color = ?moved.color, row = dest_row, col = dest_col, "promoted to king");
        }

        self.squares[dest_row][dest_col] = Cell::Occupied(moved);
        Ok(moved)
    }

    /// Take captured pieces off the board. Nothing changes unless every piece
    /// is on the board and named once.
    pub fn remove_pieces(&mut self, pieces: &[Piece]) -> Result<(), EngineError> {
        for (i, piece) in pieces.iter().enumerate() {
            self.verify(piece)?;
            if pieces[..i].iter().any(|earlier| earlier.is(piece)) {
                return Err(EngineError::InvalidPiece {
                    id: piece.id,
                    row: piece.row,
                    col: piece.col,
                });
            }
        }
        for piece in pieces {
            self.squares[piece.row][piece.col] = Cell::Empty;
            *self.count_mut(piece.color) -= 1;
        }
        Ok(())
    }

    pub fn winner_by_attrition(&self) -> Option<Color> {
        if self.dark_remaining == 0 {
            Some(Color::Light)
        } else if self.light_remaining == 0 {
            Some(Color::Dark)
        } else {
            None
        }
    }

    pub fn snapshot(&self) -> [[Option<PieceView>; SIZE]; SIZE] {
        let mut view = [[None; SIZE]; SIZE];
        for (r, row) in self.squares.iter().enumerate() {
            for (c, cell) in row.iter().enumerate() {
                view[r][c] = cell.piece().map(|p| PieceView {
                    color: p.color,
                    rank: p.rank,
                });
            }
        }
        view
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, " ")?;
        for col in 0..SIZE {
            write!(f, " {col}")?;
        }
        writeln!(f)?;
        for (r, row) in self.squares.iter().enumerate() {
            write!(f, "{r}")?;
            for (c, cell) in row.iter().enumerate() {
                let glyph = match cell.piece() {
                    Some(p) => match (p.color, p.rank) {
                        (Color::Light, Rank::Man) => 'l',
                        (Color::Light, Rank::King) => 'L',
                        (Color::Dark, Rank::Man) => 'd',
                        (Color::Dark, Rank::King) => 'D',
                    },
                    None if is_playable(r, c) => '.',
                    None => ' ',
                };
                write!(f, " {glyph}")?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
