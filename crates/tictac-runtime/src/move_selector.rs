//! [`MoveSelector`] – value-table policy with opening diversification.
//!
//! Every empty cell is tried for the player to move and scored with the
//! [`ActionValueTable`].  Scores are sorted ascending (stable), then reversed
//! for the maximizing player (the human), so that rank 0 is always the best
//! action for the mover.  Two rules keep the robot from playing the same
//! game every time:
//!
//! * on an empty board the opening cell is drawn uniformly among all cells
//!   except the center;
//! * with exactly one piece on the board, a top-ranked center is replaced by
//!   the second-best action.

use std::fmt;
use std::sync::Arc;

use rand::rngs::StdRng;
use rand::seq::IndexedRandom;
use tictac_types::{Board, CENTER, Player, PlaygroundError};
use tracing::info;

use crate::value_table::ActionValueTable;

/// A candidate action and its estimated value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Move {
    pub cell: usize,
    pub value: f32,
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{:.2}", self.cell, self.value)
    }
}

/// Chooses the next cell for a player.
pub struct MoveSelector {
    table: Arc<ActionValueTable>,
    rng: StdRng,
}

impl MoveSelector {
    pub fn new(table: Arc<ActionValueTable>, rng: StdRng) -> Self {
        Self { table, rng }
    }

    /// Every empty cell for `player`, best first.
    pub fn ranked(&self, board: &Board, player: Player) -> Vec<Move> {
        let mut actions: Vec<Move> = board
            .empty_cells()
            .map(|cell| Move {
                cell,
                value: self
                    .table
                    .value(player, &board.with_move(cell, player.piece())),
            })
            .collect();
        actions.sort_by(|a, b| a.value.total_cmp(&b.value));
        if player.is_maximizing() {
            actions.reverse();
        }
        actions
    }

    /// Pick the next action for `player` on `board`.
    ///
    /// The opening rule excludes the geometric center, [`CENTER`] (cell 4),
    /// not whichever action happens to be ranked last.
    ///
    /// # Errors
    ///
    /// Returns [`PlaygroundError::NoLegalMove`] when `board` is final.
    pub fn choose(&mut self, board: &Board, player: Player) -> Result<Move, PlaygroundError> {
        if board.is_final() {
            return Err(PlaygroundError::NoLegalMove);
        }
        let ranked = self.ranked(board, player);

        let diversified = if board.is_empty() {
            let openings: Vec<Move> = ranked.iter().copied().filter(|m| m.cell != CENTER).collect();
            openings.choose(&mut self.rng).copied()
        } else if board.pieces() == 1 && ranked.first().map(|m| m.cell) == Some(CENTER) {
            ranked.get(1).copied()
        } else {
            None
        };
        let chosen = diversified
            .or_else(|| ranked.first().copied())
            .ok_or(PlaygroundError::NoLegalMove)?;

        info!(
            board = %board,
            player = %player,
            ranking = %ranked.iter().map(Move::to_string).collect::<Vec<_>>().join(" "),
            cell = chosen.cell,
            value = chosen.value,
            "selected next action"
        );
        Ok(chosen)
    }
}
