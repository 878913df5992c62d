//! [`ActionValueTable`] – precomputed board values.
//!
//! Two tables, one per mark, each holding the value of every 9-cell board
//! configuration right after that mark moved.  Values are from the point of
//! view of the human (X): larger is better for the human, smaller is better
//! for the robot.
//!
//! # File format
//!
//! ```json
//! { "x": [19683 numbers], "o": [19683 numbers] }
//! ```
//!
//! A board's row is its base-3 encoding with cell 0 as the most significant
//! digit (see [`Board::value_index`]).

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tictac_types::{Board, Player, PlaygroundError};
use tracing::info;

/// Number of distinct 9-cell boards, `3^9`.
pub const TABLE_LEN: usize = 19_683;

#[derive(Serialize, Deserialize)]
struct TableFile {
    x: Vec<f32>,
    o: Vec<f32>,
}

/// Read-only action-value lookup, shared as `Arc<ActionValueTable>`.
#[derive(Debug, Clone)]
pub struct ActionValueTable {
    x: Vec<f32>,
    o: Vec<f32>,
}

impl ActionValueTable {
    /// Build a table from in-memory values.
    ///
    /// # Errors
    ///
    /// Returns [`PlaygroundError::ValueTable`] if either table does not hold
    /// exactly [`TABLE_LEN`] values or holds a non-finite value.
    pub fn from_tables(x: Vec<f32>, o: Vec<f32>) -> Result<Self, PlaygroundError> {
        for (name, table) in [("x", &x), ("o", &o)] {
            if table.len() != TABLE_LEN {
                return Err(PlaygroundError::ValueTable(format!(
                    "table '{name}' has {} entries, expected {TABLE_LEN}",
                    table.len()
                )));
            }
            if let Some(i) = table.iter().position(|v| !v.is_finite()) {
                return Err(PlaygroundError::ValueTable(format!(
                    "table '{name}' holds a non-finite value at row {i}"
                )));
            }
        }
        Ok(Self { x, o })
    }

    /// Parse a JSON document.
    ///
    /// # Errors
    ///
    /// Returns [`PlaygroundError::ValueTable`] on malformed JSON or tables of
    /// the wrong size.
    pub fn from_json(json: &str) -> Result<Self, PlaygroundError> {
        let file: TableFile = serde_json::from_str(json)
            .map_err(|e| PlaygroundError::ValueTable(format!("malformed table: {e}")))?;
        Self::from_tables(file.x, file.o)
    }

    /// Load the tables from `path`.  Called once at startup.
    ///
    /// # Errors
    ///
    /// Returns [`PlaygroundError::ValueTable`] if the file is missing,
    /// unreadable or malformed.
    pub fn load(path: &Path) -> Result<Self, PlaygroundError> {
        let json = fs::read_to_string(path).map_err(|e| {
            PlaygroundError::ValueTable(format!("cannot read {}: {e}", path.display()))
        })?;
        let table = Self::from_json(&json)?;
        info!(path = %path.display(), "loaded action-value table");
        Ok(table)
    }

    /// Value of `board` right after `mover` placed a piece.
    pub fn value(&self, mover: Player, board: &Board) -> f32 {
        let table = match mover {
            Player::Human => &self.x,
            Player::Robot => &self.o,
        };
        table[board.value_index()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tictac_types::Cell;

    fn flat(x: f32, o: f32) -> (Vec<f32>, Vec<f32>) {
        (vec![x; TABLE_LEN], vec![o; TABLE_LEN])
    }

    #[test]
    fn lookup_uses_the_movers_table() {
        let (mut x, mut o) = flat(0.0, 0.0);
        let board = Board::empty().with_move(4, Cell::Human);
        x[board.value_index()] = 0.7;
        o[board.value_index()] = -0.3;
        let table = ActionValueTable::from_tables(x, o).unwrap();
        assert_eq!(table.value(Player::Human, &board), 0.7);
        assert_eq!(table.value(Player::Robot, &board), -0.3);
    }

    #[test]
    fn wrong_length_is_rejected() {
        let err = ActionValueTable::from_tables(vec![0.0; 10], vec![0.0; TABLE_LEN]).unwrap_err();
        assert!(err.to_string().contains("'x'"));
    }

    #[test]
    fn non_finite_value_is_rejected() {
        let (x, mut o) = flat(0.0, 0.0);
        o[17] = f32::NAN;
        assert!(matches!(
            ActionValueTable::from_tables(x, o),
            Err(PlaygroundError::ValueTable(_))
        ));
    }

    #[test]
    fn load_from_file() {
        let (x, o) = flat(0.25, -0.25);
        let json = serde_json::to_string(&TableFile { x, o }).unwrap();
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(json.as_bytes()).unwrap();

        let table = ActionValueTable::load(file.path()).unwrap();
        assert_eq!(table.value(Player::Robot, &Board::empty()), -0.25);
    }

    #[test]
    fn missing_file_is_a_typed_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = ActionValueTable::load(&dir.path().join("absent.json")).unwrap_err();
        assert!(matches!(err, PlaygroundError::ValueTable(_)));
    }

    #[test]
    fn shipped_table_matches_perfect_play() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("../../data/q_values.json");
        let shipped = ActionValueTable::load(&path).unwrap();
        let reference = crate::test_support::minimax_table();
        for codes in [[0, 0, 0, 0, 1, 0, 0, 0, 0], [2, 2, 0, 0, 1, 0, 0, 0, 0], [1, 2, 1, 0, 2, 0, 0, 1, 0]] {
            let board = Board::from_codes(codes).unwrap();
            for mover in [Player::Human, Player::Robot] {
                assert!((shipped.value(mover, &board) - reference.value(mover, &board)).abs() < 1e-6);
            }
        }
    }

    #[test]
    fn malformed_json_is_a_typed_error() {
        assert!(matches!(
            ActionValueTable::from_json("{\"x\": [1, 2"),
            Err(PlaygroundError::ValueTable(_))
        ));
    }
}
