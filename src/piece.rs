use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Color {
    Light,
    Dark,
}

impl Color {
    pub fn opposite(self) -> Self {
        match self {
            Color::Light => Color::Dark,
            Color::Dark => Color::Light,
        }
    }

    /// Row step toward the opponent's back rank. Light starts on rows 0-2.
    pub fn forward(self) -> i32 {
        match self {
            Color::Light => 1,
            Color::Dark => -1,
        }
    }

    /// The row on which a man of this color is crowned.
    pub fn promotion_row(self) -> usize {
        match self {
            Color::Light => 7,
            Color::Dark => 0,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Rank {
    Man,
    King,
}

/// Stable identity of a piece, assigned once when it is placed on a board
/// and never handed out again by that board.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PieceId(pub u16);

/// A piece as it currently stands. Copies are snapshots: compare pieces with
/// [`Piece::is`], never field by field.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct Piece {
    pub id: PieceId,
    pub row: usize,
    pub col: usize,
    pub color: Color,
    pub rank: Rank,
}

impl Piece {
    pub fn new(id: PieceId, row: usize, col: usize, color: Color) -> Self {
        Piece {
            id,
            row,
            col,
            color,
            rank: Rank::Man,
        }
    }

    pub fn is(&self, other: &Piece) -> bool {
        self.id == other.id
    }

    pub fn is_king(&self) -> bool {
        self.rank == Rank::King
    }

    pub fn square(&self) -> (usize, usize) {
        (self.row, self.col)
    }
}
