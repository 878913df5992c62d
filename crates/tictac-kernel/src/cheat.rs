//! [`CheatDetector`] and [`BoardValidator`] – board transition rules.
//!
//! Every accepted turn changes exactly one cell of the board, from empty to
//! the mover's piece.  The detector compares a fresh observation with the
//! last accepted board and classifies the per-cell [`Delta`]:
//!
//! | Delta | Verdict |
//! |---|---|
//! | no change | fine |
//! | one cell, empty → cube | fine |
//! | one cell, empty → cylinder | fine on the robot's turn, cheating otherwise |
//! | anything else | cheating |
//!
//! A cheating verdict is only a suspicion: the caller re-observes once and
//! compares the two deltas before acting on it (see
//! [`Transition::delta`]).

use tictac_types::{Board, Cell};
use tracing::debug;

// ────────────────────────────────────────────────────────────────────────────
// Delta
// ────────────────────────────────────────────────────────────────────────────

/// One cell that differs between two boards.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CellChange {
    pub cell: usize,
    pub from: Cell,
    pub to: Cell,
}

/// The list of cells that differ between a baseline and an observation, in
/// ascending cell order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Delta(Vec<CellChange>);

impl Delta {
    /// Per-cell difference going from `last` to `board`.
    pub fn between(last: &Board, board: &Board) -> Self {
        Delta(
            (0..9)
                .filter(|&i| last[i] != board[i])
                .map(|i| CellChange {
                    cell: i,
                    from: last[i],
                    to: board[i],
                })
                .collect(),
        )
    }

    pub fn changes(&self) -> &[CellChange] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Transition
// ────────────────────────────────────────────────────────────────────────────

/// Classified change between the last accepted board and an observation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transition {
    Unchanged,
    /// A single cube appeared on an empty cell.
    HumanPlaced(usize),
    /// A single cylinder appeared on an empty cell.
    RobotPlaced(usize),
    /// Several cells changed, or a piece vanished or was replaced.
    Irregular(Delta),
}

impl Transition {
    /// The cell delta this transition stands for.
    pub fn delta(&self, last: &Board) -> Delta {
        match self {
            Transition::Unchanged => Delta::default(),
            Transition::HumanPlaced(cell) => Delta(vec![CellChange {
                cell: *cell,
                from: last[*cell],
                to: Cell::Human,
            }]),
            Transition::RobotPlaced(cell) => Delta(vec![CellChange {
                cell: *cell,
                from: last[*cell],
                to: Cell::Robot,
            }]),
            Transition::Irregular(delta) => delta.clone(),
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// CheatDetector
// ────────────────────────────────────────────────────────────────────────────

/// Stateless board-transition classifier.
///
/// # Example
///
/// ```
/// use tictac_kernel::cheat::CheatDetector;
/// use tictac_types::Board;
///
/// let last = Board::empty();
/// let one_cube = Board::from_codes([0, 0, 0, 0, 1, 0, 0, 0, 0]).unwrap();
/// let two_cubes = Board::from_codes([1, 0, 0, 0, 1, 0, 0, 0, 0]).unwrap();
///
/// assert!(!CheatDetector::cheating(&one_cube, &last, false));
/// assert!(CheatDetector::cheating(&two_cubes, &last, false));
/// ```
#[derive(Debug, Default, Clone, Copy)]
pub struct CheatDetector;

impl CheatDetector {
    /// Classify the change from `last` to `board`.
    pub fn classify(board: &Board, last: &Board) -> Transition {
        let delta = Delta::between(last, board);
        match delta.changes() {
            [] => Transition::Unchanged,
            [CellChange {
                cell,
                from: Cell::Empty,
                to: Cell::Human,
            }] => Transition::HumanPlaced(*cell),
            [CellChange {
                cell,
                from: Cell::Empty,
                to: Cell::Robot,
            }] => Transition::RobotPlaced(*cell),
            _ => {
                debug!(changed = delta.len(), from = %last, to = %board, "irregular board transition");
                Transition::Irregular(delta)
            }
        }
    }

    /// `true` when the change from `last` to `board` cannot be explained by a
    /// legal move of the player whose turn it is.
    pub fn cheating(board: &Board, last: &Board, is_robot_turn: bool) -> bool {
        match Self::classify(board, last) {
            Transition::Unchanged | Transition::HumanPlaced(_) => false,
            Transition::RobotPlaced(_) => !is_robot_turn,
            Transition::Irregular(_) => true,
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// BoardValidator
// ────────────────────────────────────────────────────────────────────────────

/// Structural sanity checks on a single observed board.
#[derive(Debug, Default, Clone, Copy)]
pub struct BoardValidator;

impl BoardValidator {
    /// `true` when piece counts cannot come from alternating play
    /// (`|robot - human| > 1`).
    pub fn incoherent(board: &Board) -> bool {
        board.count(Cell::Robot).abs_diff(board.count(Cell::Human)) > 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn b(codes: [u8; 9]) -> Board {
        Board::from_codes(codes).unwrap()
    }

    #[test]
    fn unchanged_board_is_not_cheating() {
        let last = b([1, 0, 2, 0, 0, 0, 0, 0, 0]);
        assert_eq!(CheatDetector::classify(&last, &last), Transition::Unchanged);
        assert!(!CheatDetector::cheating(&last, &last, true));
        assert!(!CheatDetector::cheating(&last, &last, false));
    }

    #[test]
    fn single_cube_is_a_human_move() {
        let last = b([0, 0, 2, 0, 0, 0, 0, 0, 0]);
        let now = b([0, 0, 2, 0, 1, 0, 0, 0, 0]);
        assert_eq!(CheatDetector::classify(&now, &last), Transition::HumanPlaced(4));
        assert!(!CheatDetector::cheating(&now, &last, false));
        assert!(!CheatDetector::cheating(&now, &last, true));
    }

    #[test]
    fn cylinder_is_legal_only_on_robot_turn() {
        let last = b([1, 0, 0, 0, 0, 0, 0, 0, 0]);
        let now = b([1, 0, 0, 0, 2, 0, 0, 0, 0]);
        assert_eq!(CheatDetector::classify(&now, &last), Transition::RobotPlaced(4));
        assert!(!CheatDetector::cheating(&now, &last, true));
        assert!(CheatDetector::cheating(&now, &last, false));
    }

    #[test]
    fn two_new_pieces_are_cheating() {
        let last = Board::empty();
        let now = b([1, 1, 0, 0, 0, 0, 0, 0, 0]);
        assert!(CheatDetector::cheating(&now, &last, false));
        assert!(CheatDetector::cheating(&now, &last, true));
    }

    #[test]
    fn vanished_or_replaced_piece_is_cheating() {
        let last = b([1, 2, 0, 0, 0, 0, 0, 0, 0]);
        let vanished = b([0, 2, 0, 0, 0, 0, 0, 0, 0]);
        let replaced = b([2, 2, 0, 0, 0, 0, 0, 0, 0]);
        assert!(CheatDetector::cheating(&vanished, &last, false));
        assert!(CheatDetector::cheating(&replaced, &last, true));
        assert!(matches!(
            CheatDetector::classify(&replaced, &last),
            Transition::Irregular(ref d) if d.len() == 1
        ));
    }

    #[test]
    fn delta_lists_changed_cells_in_order() {
        let last = b([0, 0, 0, 0, 0, 0, 0, 0, 2]);
        let now = b([1, 0, 0, 0, 0, 1, 0, 0, 0]);
        let delta = Delta::between(&last, &now);
        let cells: Vec<usize> = delta.changes().iter().map(|c| c.cell).collect();
        assert_eq!(cells, vec![0, 5, 8]);
        assert_eq!(delta.changes()[2].to, Cell::Empty);
    }

    #[test]
    fn transition_delta_matches_observed_delta() {
        let last = b([1, 0, 0, 0, 0, 0, 0, 0, 0]);
        let now = b([1, 0, 0, 0, 2, 0, 0, 0, 0]);
        let t = CheatDetector::classify(&now, &last);
        assert_eq!(t.delta(&last), Delta::between(&last, &now));
        assert!(Transition::Unchanged.delta(&last).is_empty());
    }

    #[test]
    fn incoherent_piece_counts() {
        assert!(!BoardValidator::incoherent(&Board::empty()));
        assert!(!BoardValidator::incoherent(&b([1, 0, 0, 0, 0, 0, 0, 0, 0])));
        assert!(!BoardValidator::incoherent(&b([1, 2, 1, 0, 0, 0, 0, 0, 0])));
        assert!(BoardValidator::incoherent(&b([1, 1, 0, 0, 0, 0, 0, 0, 0])));
        assert!(BoardValidator::incoherent(&b([2, 2, 2, 1, 0, 0, 0, 0, 0])));
    }
}
