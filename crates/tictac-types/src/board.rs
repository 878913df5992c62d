//! The 3x3 game surface and its win / draw evaluation.
//!
//! A [`Board`] is a plain value: perception produces a fresh one on every
//! observation and the controller compares it against the last accepted
//! board.  Cells are stored row-major, index `0` is the top-left corner as
//! seen by the human.

use std::fmt;
use std::ops::Index;

use serde::{Deserialize, Serialize};

/// Index of the center cell.
pub const CENTER: usize = 4;

/// The 8 winning triples, checked in this order: rows, columns, diagonals.
pub const WIN_LINES: [[usize; 3]; 8] = [
    [0, 1, 2],
    [3, 4, 5],
    [6, 7, 8],
    [0, 3, 6],
    [1, 4, 7],
    [2, 5, 8],
    [0, 4, 8],
    [2, 4, 6],
];

// ────────────────────────────────────────────────────────────────────────────
// Cell / Player / Winner
// ────────────────────────────────────────────────────────────────────────────

/// State of a single board cell.
///
/// The numeric codes are the ones used by the value table encoding:
/// `0` empty, `1` the human's cube (X), `2` the robot's cylinder (O).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Cell {
    #[default]
    Empty,
    Human,
    Robot,
}

impl Cell {
    /// Numeric code of this cell.
    pub const fn code(self) -> u8 {
        match self {
            Cell::Empty => 0,
            Cell::Human => 1,
            Cell::Robot => 2,
        }
    }

    /// Inverse of [`Cell::code`].  Returns `None` for codes above 2.
    pub const fn from_code(code: u8) -> Option<Cell> {
        match code {
            0 => Some(Cell::Empty),
            1 => Some(Cell::Human),
            2 => Some(Cell::Robot),
            _ => None,
        }
    }

    /// The player owning a piece in this cell, `None` when empty.
    pub const fn owner(self) -> Option<Player> {
        match self {
            Cell::Empty => None,
            Cell::Human => Some(Player::Human),
            Cell::Robot => Some(Player::Robot),
        }
    }
}

/// One of the two sides of the game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Player {
    Human,
    Robot,
}

impl Player {
    /// The piece this player puts on the board.
    pub const fn piece(self) -> Cell {
        match self {
            Player::Human => Cell::Human,
            Player::Robot => Cell::Robot,
        }
    }

    pub const fn opponent(self) -> Player {
        match self {
            Player::Human => Player::Robot,
            Player::Robot => Player::Human,
        }
    }

    /// `true` for the player for whom larger table values are better.
    ///
    /// The human plays the X mark, which the value tables score positively.
    pub const fn is_maximizing(self) -> bool {
        matches!(self, Player::Human)
    }
}

impl fmt::Display for Player {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Player::Human => write!(f, "human"),
            Player::Robot => write!(f, "robot"),
        }
    }
}

/// Result of evaluating the win triples of a board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Winner {
    Robot,
    Human,
    Nobody,
}

impl fmt::Display for Winner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Winner::Robot => write!(f, "robot"),
            Winner::Human => write!(f, "human"),
            Winner::Nobody => write!(f, "nobody"),
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Board
// ────────────────────────────────────────────────────────────────────────────

/// A 3x3 tic-tac-toe board.
///
/// # Example
///
/// ```
/// use tictac_types::{Board, Cell, Winner};
///
/// let board = Board::from_codes([2, 2, 2, 1, 1, 0, 0, 0, 0]).unwrap();
/// assert_eq!(board.winner(), Winner::Robot);
/// assert!(board.is_final());
/// assert_eq!(board.count(Cell::Human), 2);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Board([Cell; 9]);

impl Board {
    /// A fresh all-empty board.
    pub const fn empty() -> Self {
        Board([Cell::Empty; 9])
    }

    pub const fn from_cells(cells: [Cell; 9]) -> Self {
        Board(cells)
    }

    /// Build a board from numeric cell codes.  Returns `None` if any code
    /// is not a valid [`Cell`] code.
    pub fn from_codes(codes: [u8; 9]) -> Option<Self> {
        let mut cells = [Cell::Empty; 9];
        for (cell, code) in cells.iter_mut().zip(codes) {
            *cell = Cell::from_code(code)?;
        }
        Some(Board(cells))
    }

    pub fn cells(&self) -> &[Cell; 9] {
        &self.0
    }

    pub fn codes(&self) -> [u8; 9] {
        self.0.map(Cell::code)
    }

    /// Number of cells holding `cell`.
    pub fn count(&self, cell: Cell) -> usize {
        self.0.iter().filter(|&&c| c == cell).count()
    }

    /// Number of pieces of either kind on the board.
    pub fn pieces(&self) -> usize {
        9 - self.count(Cell::Empty)
    }

    /// `true` iff every cell is empty; the board is ready for a new game.
    pub fn is_empty(&self) -> bool {
        self.0.iter().all(|&c| c == Cell::Empty)
    }

    /// Indices of the empty cells, in ascending order.
    pub fn empty_cells(&self) -> impl Iterator<Item = usize> + '_ {
        self.0
            .iter()
            .enumerate()
            .filter(|(_, c)| **c == Cell::Empty)
            .map(|(i, _)| i)
    }

    /// Return a copy of this board with `cell` written at `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index >= 9`.
    pub fn with_move(&self, index: usize, cell: Cell) -> Board {
        let mut next = *self;
        next.0[index] = cell;
        next
    }

    /// Evaluate the 8 win triples.  The first full triple found (rows, then
    /// columns, then diagonals) decides the winner.
    pub fn winner(&self) -> Winner {
        for [a, b, c] in WIN_LINES {
            let first = self.0[a];
            if first != Cell::Empty && first == self.0[b] && first == self.0[c] {
                return match first {
                    Cell::Human => Winner::Human,
                    Cell::Robot => Winner::Robot,
                    Cell::Empty => Winner::Nobody,
                };
            }
        }
        Winner::Nobody
    }

    /// `true` when somebody won or the board is full (draw).
    pub fn is_final(&self) -> bool {
        self.winner() != Winner::Nobody || !self.0.contains(&Cell::Empty)
    }

    /// `true` iff the board changed since `last` *and* the number of human
    /// pieces strictly increased.  Classification noise that changes cells
    /// without adding a cube is not a human move.
    pub fn has_human_played(&self, last: &Board) -> bool {
        self != last && self.count(Cell::Human) > last.count(Cell::Human)
    }

    /// Base-3 encoding with cell 0 as the most significant digit.  This is
    /// the row index into an action-value table.
    pub fn value_index(&self) -> usize {
        self.0
            .iter()
            .fold(0usize, |acc, c| acc * 3 + c.code() as usize)
    }
}

impl Index<usize> for Board {
    type Output = Cell;

    fn index(&self, index: usize) -> &Cell {
        &self.0[index]
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (row, cells) in self.0.chunks(3).enumerate() {
            if row > 0 {
                write!(f, "/")?;
            }
            for c in cells {
                let ch = match c {
                    Cell::Empty => '.',
                    Cell::Human => 'H',
                    Cell::Robot => 'R',
                };
                write!(f, "{ch}")?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn board(codes: [u8; 9]) -> Board {
        Board::from_codes(codes).unwrap()
    }

    /// Every one of the 3^9 cell assignments, legal or not.
    fn all_boards() -> impl Iterator<Item = Board> {
        (0..3usize.pow(9)).map(|index| {
            let mut n = index;
            let mut codes = [0u8; 9];
            for slot in (0..9).rev() {
                codes[slot] = (n % 3) as u8;
                n /= 3;
            }
            board(codes)
        })
    }

    fn owns_a_line(b: &Board, piece: Cell) -> bool {
        (0..3).any(|r| (0..3).all(|c| b[r * 3 + c] == piece))
            || (0..3).any(|c| (0..3).all(|r| b[r * 3 + c] == piece))
            || (0..3).all(|i| b[i * 4] == piece)
            || (0..3).all(|i| b[i * 2 + 2] == piece)
    }

    #[test]
    fn whole_state_space_properties() {
        let mut count = 0;
        for b in all_boards() {
            count += 1;
            let human = owns_a_line(&b, Cell::Human);
            let robot = owns_a_line(&b, Cell::Robot);
            match b.winner() {
                Winner::Nobody => assert!(!human && !robot, "missed line on {b}"),
                Winner::Human => assert!(human, "phantom human line on {b}"),
                Winner::Robot => assert!(robot, "phantom robot line on {b}"),
            }
            let full = b.count(Cell::Empty) == 0;
            assert_eq!(b.is_final(), b.winner() != Winner::Nobody || full, "board {b}");
            assert!(!b.has_human_played(&b), "board {b}");
        }
        assert_eq!(count, 19_683);
    }

    #[test]
    fn fresh_board_is_empty_and_not_final() {
        let b = Board::empty();
        assert!(b.is_empty());
        assert!(!b.is_final());
        assert_eq!(b.winner(), Winner::Nobody);
        assert_eq!(b.empty_cells().count(), 9);
    }

    #[test]
    fn every_single_full_line_is_detected() {
        for line in WIN_LINES {
            for (cell, expected) in [(Cell::Human, Winner::Human), (Cell::Robot, Winner::Robot)] {
                let mut b = Board::empty();
                for i in line {
                    b = b.with_move(i, cell);
                }
                assert_eq!(b.winner(), expected, "line {line:?} with {cell:?}");
                assert!(b.is_final());
            }
        }
    }

    #[test]
    fn mixed_line_is_not_a_win() {
        let b = board([1, 2, 1, 0, 0, 0, 0, 0, 0]);
        assert_eq!(b.winner(), Winner::Nobody);
        assert!(!b.is_final());
    }

    #[test]
    fn full_board_without_line_is_a_draw() {
        // H R H
        // H R R
        // R H H
        let b = board([1, 2, 1, 1, 2, 2, 2, 1, 1]);
        assert_eq!(b.winner(), Winner::Nobody);
        assert!(b.is_final());
    }

    #[test]
    fn first_full_line_decides() {
        // Unreachable in play, but the evaluation order must be deterministic.
        let b = board([2, 2, 2, 0, 0, 0, 1, 1, 1]);
        assert_eq!(b.winner(), Winner::Robot);
        let b = board([1, 0, 2, 1, 0, 2, 1, 0, 2]);
        assert_eq!(b.winner(), Winner::Human);
    }

    #[test]
    fn has_human_played_requires_a_new_cube() {
        let last = board([0, 0, 0, 0, 2, 0, 0, 0, 0]);
        let same = last;
        assert!(!same.has_human_played(&last));

        let played = board([1, 0, 0, 0, 2, 0, 0, 0, 0]);
        assert!(played.has_human_played(&last));

        // A change that does not add a cube (e.g. a cylinder misread).
        let noise = board([0, 0, 2, 0, 2, 0, 0, 0, 0]);
        assert!(!noise.has_human_played(&last));
    }

    #[test]
    fn self_transition_is_never_a_move() {
        for codes in [[0; 9], [1, 2, 1, 0, 0, 0, 0, 0, 0], [1, 2, 1, 1, 2, 2, 2, 1, 1]] {
            let b = board(codes);
            assert!(!b.has_human_played(&b));
        }
    }

    #[test]
    fn value_index_is_base_three_most_significant_first() {
        assert_eq!(Board::empty().value_index(), 0);
        assert_eq!(board([0, 0, 0, 0, 0, 0, 0, 0, 1]).value_index(), 1);
        assert_eq!(board([0, 0, 0, 0, 0, 0, 0, 0, 2]).value_index(), 2);
        assert_eq!(board([1, 0, 0, 0, 0, 0, 0, 0, 0]).value_index(), 6561);
        assert_eq!(board([2; 9]).value_index(), 19682);
    }

    #[test]
    fn from_codes_rejects_unknown_codes() {
        assert!(Board::from_codes([0, 0, 0, 0, 3, 0, 0, 0, 0]).is_none());
    }

    #[test]
    fn display_renders_rows() {
        let b = board([1, 2, 0, 0, 1, 0, 0, 0, 2]);
        assert_eq!(b.to_string(), "HR./.H./..R");
    }

    #[test]
    fn board_serialization_roundtrip() {
        let b = board([1, 2, 0, 0, 1, 0, 0, 0, 2]);
        let json = serde_json::to_string(&b).unwrap();
        let back: Board = serde_json::from_str(&json).unwrap();
        assert_eq!(b, back);
    }
}
