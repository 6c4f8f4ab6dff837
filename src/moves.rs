// =============================================================================
// Move generation
//
// Every legal move of one piece is expressed as a map from destination square
// to the ordered list of pieces jumped on the way there. An empty list is a
// quiet move. Capture chains are searched recursively: after each jump the
// search fans out into all four diagonals, and every link of a chain is kept
// as its own destination so a player may stop early.
//
// Each recursive branch owns its copy of the capture list. Captured pieces
// stay on the board until the move is committed, so they block further jumps
// across or onto their squares.
// =============================================================================

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::board::{Board, Cell, Square};
use crate::error::EngineError;
use crate::piece::{Color, Piece};

/// Destination -> pieces captured on the way there.
pub type MoveMap = BTreeMap<Square, Vec<Piece>>;

const DIAGONALS: [(i32, i32); 4] = [(1, -1), (1, 1), (-1, -1), (-1, 1)];

/// A fully specified move, flattened out of a [`MoveMap`] for drivers and UIs.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Move {
    pub from: Square,
    pub to: Square,
    pub captured: Vec<Piece>,
}

impl Move {
    pub fn is_capture(&self) -> bool {
        !self.captured.is_empty()
    }
}

fn step(square: Square, (dr, dc): (i32, i32)) -> (i32, i32) {
    (square.0 as i32 + dr, square.1 as i32 + dc)
}

fn has_capture(moves: &MoveMap) -> bool {
    moves.values().any(|captured| !captured.is_empty())
}

fn retain_captures(moves: &mut MoveMap) {
    moves.retain(|_, captured| !captured.is_empty());
}

/// Merge `other` into `into`. A destination reached by two chains keeps the
/// longer capture list; on a tie the one already present stays.
fn merge(into: &mut MoveMap, other: MoveMap) {
    for (dest, captured) in other {
        match into.get(&dest) {
            Some(existing) if existing.len() >= captured.len() => {}
            _ => {
                into.insert(dest, captured);
            }
        }
    }
}

/// Look one square along `dir` from `start`.
///
/// An empty square yields a quiet destination. An opposing piece with an
/// empty square behind it yields a capture, followed by every chain that
/// continues from the landing square.
fn traverse(
    board: &Board,
    start: Square,
    dir: (i32, i32),
    piece: &Piece,
    captured: &[Piece],
) -> MoveMap {
    let mut moves = MoveMap::new();
    let (row, col) = step(start, dir);

    let target = match board.cell(row, col) {
        None => return moves,
        Some(Cell::Empty) => {
            moves.insert((row as usize, col as usize), Vec::new());
            return moves;
        }
        Some(Cell::Occupied(p)) => p,
    };

    if target.is(piece) || captured.iter().any(|c| c.is(target)) || target.color == piece.color {
        return moves;
    }

    let (behind_row, behind_col) = (row + dir.0, col + dir.1);
    if let Some(Cell::Empty) = board.cell(behind_row, behind_col) {
        let landing = (behind_row as usize, behind_col as usize);
        let mut chain = captured.to_vec();
        chain.push(*target);
        let continuations = continue_chain(board, landing, piece, &chain);
        moves.insert(landing, chain);
        merge(&mut moves, continuations);
    }

    moves
}

/// Further captures from a landing square, in all four directions.
fn continue_chain(board: &Board, landing: Square, piece: &Piece, captured: &[Piece]) -> MoveMap {
    let mut moves = MoveMap::new();
    for dir in DIAGONALS {
        let mut branch = traverse(board, landing, dir, piece, captured);
        retain_captures(&mut branch);
        merge(&mut moves, branch);
    }
    moves
}

/// A man may step backward only to capture.
fn backward_captures(board: &Board, piece: &Piece, dir: (i32, i32)) -> MoveMap {
    let moves = traverse(board, piece.square(), dir, piece, &[]);
    if has_capture(&moves) {
        moves
    } else {
        MoveMap::new()
    }
}

/// Slide along one diagonal until blocked or until a capture is found.
fn king_slide(board: &Board, piece: &Piece, dir: (i32, i32)) -> MoveMap {
    let mut moves = MoveMap::new();
    let mut square = piece.square();
    loop {
        let found = traverse(board, square, dir, piece, &[]);
        let (row, col) = step(square, dir);
        let keep_going = !found.is_empty() && !has_capture(&found);
        merge(&mut moves, found);
        if !keep_going {
            break;
        }
        square = (row as usize, col as usize);
    }
    moves
}

/// Every destination of one piece, with quiet moves dropped when it can capture.
pub fn piece_moves(board: &Board, piece: &Piece) -> Result<MoveMap, EngineError> {
    let piece = board.verify(piece)?;
    let mut moves = MoveMap::new();

    let forward = piece.color.forward();
    for dc in [-1, 1] {
        merge(&mut moves, traverse(board, piece.square(), (forward, dc), &piece, &[]));
    }
    for dc in [-1, 1] {
        merge(&mut moves, backward_captures(board, &piece, (-forward, dc)));
    }
    if piece.is_king() {
        for dir in DIAGONALS {
            merge(&mut moves, king_slide(board, &piece, dir));
        }
    }

    if has_capture(&moves) {
        retain_captures(&mut moves);
    }
    Ok(moves)
}

/// Moves for every piece of `color`, in row-major order. If any of them can
/// capture, all of them are restricted to captures.
pub fn side_moves(board: &Board, color: Color) -> Vec<(Piece, MoveMap)> {
    let mut all: Vec<(Piece, MoveMap)> = board
        .pieces(color)
        .map(|p| {
            // `p` came from this board, so it always verifies.
            let moves = piece_moves(board, &p);
            debug_assert!(moves.is_ok(), "board yielded unverifiable piece {p:?}");
            (p, moves.unwrap_or_default())
        })
        .collect();

    if all.iter().any(|(_, moves)| has_capture(moves)) {
        for (_, moves) in &mut all {
            retain_captures(moves);
        }
    }
    all
}

/// Legal destinations for one piece under the side-wide capture rule.
pub fn legal_moves(board: &Board, piece: &Piece) -> Result<MoveMap, EngineError> {
    let piece = board.verify(piece)?;
    Ok(side_moves(board, piece.color)
        .into_iter()
        .find(|(p, _)| p.is(&piece))
        .map(|(_, moves)| moves)
        .unwrap_or_default())
}

pub fn has_any_move(board: &Board, color: Color) -> bool {
    side_moves(board, color)
        .iter()
        .any(|(_, moves)| !moves.is_empty())
}

/// Flatten the side's move maps into a list.
pub fn all_moves(board: &Board, color: Color) -> Vec<Move> {
    side_moves(board, color)
        .into_iter()
        .flat_map(|(piece, moves)| {
            moves.into_iter().map(move |(to, captured)| Move {
                from: piece.square(),
                to,
                captured,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::piece::{PieceId, Rank};

    fn put(board: &mut Board, row: usize, col: usize, color: Color, rank: Rank) -> Piece {
        let id = board.place(row, col, color, rank).unwrap();
        board.find(id).unwrap()
    }

    fn ids(captured: &[Piece]) -> Vec<PieceId> {
        captured.iter().map(|p| p.id).collect()
    }

    #[test]
    fn opening_man_has_two_forward_steps() {
        let board = Board::new();
        let piece = *board.piece_at(5, 2).unwrap().piece().unwrap();
        let moves = legal_moves(&board, &piece).unwrap();
        let dests: Vec<Square> = moves.keys().copied().collect();
        assert_eq!(dests, vec![(4, 1), (4, 3)]);
        assert!(moves.values().all(|c| c.is_empty()));
    }

    #[test]
    fn back_row_man_is_blocked_at_start() {
        let board = Board::new();
        let piece = *board.piece_at(6, 1).unwrap().piece().unwrap();
        assert!(legal_moves(&board, &piece).unwrap().is_empty());
    }

    #[test]
    fn single_forward_capture() {
        let mut board = Board::empty();
        let dark = put(&mut board, 5, 2, Color::Dark, Rank::Man);
        let light = put(&mut board, 4, 1, Color::Light, Rank::Man);
        let moves = legal_moves(&board, &dark).unwrap();
        assert_eq!(moves.len(), 1, "capture must exclude the quiet step: {moves:?}");
        assert_eq!(ids(&moves[&(3, 0)]), vec![light.id]);
    }

    #[test]
    fn man_does_not_step_backward() {
        let mut board = Board::empty();
        let dark = put(&mut board, 4, 3, Color::Dark, Rank::Man);
        let moves = legal_moves(&board, &dark).unwrap();
        let dests: Vec<Square> = moves.keys().copied().collect();
        assert_eq!(dests, vec![(3, 2), (3, 4)]);
    }

    #[test]
    fn man_captures_backward() {
        let mut board = Board::empty();
        let dark = put(&mut board, 3, 2, Color::Dark, Rank::Man);
        let light = put(&mut board, 4, 3, Color::Light, Rank::Man);
        let moves = legal_moves(&board, &dark).unwrap();
        assert_eq!(moves.keys().copied().collect::<Vec<_>>(), vec![(5, 4)]);
        assert_eq!(ids(&moves[&(5, 4)]), vec![light.id]);
    }

    #[test]
    fn capture_blocked_by_occupied_landing() {
        let mut board = Board::empty();
        let dark = put(&mut board, 5, 2, Color::Dark, Rank::Man);
        put(&mut board, 4, 1, Color::Light, Rank::Man);
        put(&mut board, 3, 0, Color::Light, Rank::Man);
        let moves = legal_moves(&board, &dark).unwrap();
        assert_eq!(moves.keys().copied().collect::<Vec<_>>(), vec![(4, 3)]);
    }

    #[test]
    fn double_jump_keeps_both_links() {
        let mut board = Board::empty();
        let dark = put(&mut board, 6, 1, Color::Dark, Rank::Man);
        let first = put(&mut board, 5, 2, Color::Light, Rank::Man);
        let second = put(&mut board, 3, 4, Color::Light, Rank::Man);
        let moves = legal_moves(&board, &dark).unwrap();
        assert_eq!(ids(&moves[&(4, 3)]), vec![first.id]);
        assert_eq!(ids(&moves[&(2, 5)]), vec![first.id, second.id]);
        assert_eq!(moves.len(), 2);
    }

    #[test]
    fn chain_turns_corners() {
        let mut board = Board::empty();
        let dark = put(&mut board, 6, 1, Color::Dark, Rank::Man);
        let first = put(&mut board, 5, 2, Color::Light, Rank::Man);
        // From (4, 3) the chain turns back toward Dark's own side.
        let second = put(&mut board, 5, 4, Color::Light, Rank::Man);
        let moves = legal_moves(&board, &dark).unwrap();
        assert_eq!(ids(&moves[&(6, 5)]), vec![first.id, second.id]);
    }

    #[test]
    fn forked_chain_branches_keep_separate_captures() {
        let mut board = Board::empty();
        let dark = put(&mut board, 6, 3, Color::Dark, Rank::Man);
        let first = put(&mut board, 5, 4, Color::Light, Rank::Man);
        let left = put(&mut board, 3, 4, Color::Light, Rank::Man);
        let right = put(&mut board, 3, 6, Color::Light, Rank::Man);
        let moves = legal_moves(&board, &dark).unwrap();

        assert_eq!(moves.len(), 3, "{moves:?}");
        assert_eq!(ids(&moves[&(4, 5)]), vec![first.id]);
        assert_eq!(ids(&moves[&(2, 3)]), vec![first.id, left.id]);
        assert_eq!(ids(&moves[&(2, 7)]), vec![first.id, right.id]);
    }

    #[test]
    fn captured_piece_is_not_jumped_twice() {
        // Dark jumps (5,2) to (4,3); the only way back would re-use the same piece.
        let mut board = Board::empty();
        let dark = put(&mut board, 6, 1, Color::Dark, Rank::Man);
        put(&mut board, 5, 2, Color::Light, Rank::Man);
        let moves = legal_moves(&board, &dark).unwrap();
        for captured in moves.values() {
            let mut seen = ids(captured);
            seen.sort();
            seen.dedup();
            assert_eq!(seen.len(), captured.len());
        }
        assert_eq!(moves.len(), 1);
    }

    #[test]
    fn king_slides_until_blocked() {
        let mut board = Board::empty();
        let king = put(&mut board, 0, 1, Color::Dark, Rank::King);
        put(&mut board, 4, 5, Color::Dark, Rank::Man);
        let moves = legal_moves(&board, &king).unwrap();
        let dests: Vec<Square> = moves.keys().copied().collect();
        assert_eq!(dests, vec![(1, 0), (1, 2), (2, 3), (3, 4)]);
        assert!(moves.values().all(|c| c.is_empty()));
    }

    #[test]
    fn king_captures_at_distance() {
        let mut board = Board::empty();
        let king = put(&mut board, 7, 0, Color::Light, Rank::King);
        let target = put(&mut board, 4, 3, Color::Dark, Rank::Man);
        let moves = legal_moves(&board, &king).unwrap();
        assert_eq!(moves.keys().copied().collect::<Vec<_>>(), vec![(3, 4)]);
        assert_eq!(ids(&moves[&(3, 4)]), vec![target.id]);
    }

    #[test]
    fn king_slide_stops_after_capture() {
        let mut board = Board::empty();
        let king = put(&mut board, 7, 0, Color::Light, Rank::King);
        put(&mut board, 5, 2, Color::Dark, Rank::Man);
        let moves = legal_moves(&board, &king).unwrap();
        // Lands on (4, 3) only; no quiet squares beyond survive the capture rule.
        assert_eq!(moves.keys().copied().collect::<Vec<_>>(), vec![(4, 3)]);
    }

    #[test]
    fn side_wide_capture_rule_freezes_quiet_pieces() {
        let mut board = Board::empty();
        put(&mut board, 5, 2, Color::Dark, Rank::Man);
        put(&mut board, 4, 1, Color::Light, Rank::Man);
        let idle = put(&mut board, 6, 7, Color::Dark, Rank::Man);

        assert!(!piece_moves(&board, &idle).unwrap().is_empty());
        assert!(legal_moves(&board, &idle).unwrap().is_empty());

        let side = side_moves(&board, Color::Dark);
        for (_, moves) in &side {
            assert!(moves.values().all(|c| !c.is_empty()));
        }
    }

    #[test]
    fn unknown_piece_is_an_error() {
        let board = Board::new();
        let ghost = Piece::new(PieceId(999), 3, 0, Color::Dark);
        assert!(matches!(
            legal_moves(&board, &ghost),
            Err(EngineError::InvalidPiece { .. })
        ));
    }

    #[test]
    fn opening_has_seven_moves_per_side() {
        let board = Board::new();
        assert_eq!(all_moves(&board, Color::Light).len(), 7);
        assert_eq!(all_moves(&board, Color::Dark).len(), 7);
        assert!(has_any_move(&board, Color::Dark));
    }
}
