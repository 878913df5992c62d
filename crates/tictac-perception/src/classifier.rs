//! Image classification seam.
//!
//! The classification models themselves live outside this workspace; the
//! observer only needs a label and a confidence score for the whole board
//! and for each cell crop.

use tictac_hal::CameraFrame;
use tictac_hal::sim::{BLUR_SHADE, EMPTY_SHADE, HUMAN_SHADE, ROBOT_SHADE};
use tictac_types::{Cell, PlaygroundError};

/// Board-level validity label.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoardLabel {
    Valid,
    Invalid,
}

/// A classification label with its confidence in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Scored<T> {
    pub label: T,
    pub score: f32,
}

impl<T> Scored<T> {
    pub fn new(label: T, score: f32) -> Self {
        Self { label, score }
    }
}

/// Classifies the board region and individual cell crops.
pub trait CellClassifier: Send {
    /// Is the board fully visible and unobstructed?
    fn classify_board(&mut self, board: &CameraFrame) -> Result<Scored<BoardLabel>, PlaygroundError>;

    /// Which piece, if any, sits in this cell crop?
    fn classify_cell(&mut self, cell: &CameraFrame) -> Result<Scored<Cell>, PlaygroundError>;
}

/// Classifier for simulated frames, where every pixel of a cell carries one
/// of the [`tictac_hal::sim`] shades.
#[derive(Debug, Default, Clone, Copy)]
pub struct ShadeClassifier;

impl ShadeClassifier {
    fn mean(frame: &CameraFrame) -> Option<u8> {
        if frame.data.is_empty() {
            return None;
        }
        let sum: usize = frame.data.iter().map(|&p| p as usize).sum();
        Some((sum / frame.data.len()) as u8)
    }
}

impl CellClassifier for ShadeClassifier {
    fn classify_board(&mut self, board: &CameraFrame) -> Result<Scored<BoardLabel>, PlaygroundError> {
        if board.data.is_empty() || board.data.iter().all(|&p| p == BLUR_SHADE) {
            return Ok(Scored::new(BoardLabel::Invalid, 0.95));
        }
        Ok(Scored::new(BoardLabel::Valid, 0.99))
    }

    fn classify_cell(&mut self, cell: &CameraFrame) -> Result<Scored<Cell>, PlaygroundError> {
        Ok(match Self::mean(cell) {
            Some(EMPTY_SHADE) => Scored::new(Cell::Empty, 0.99),
            Some(HUMAN_SHADE) => Scored::new(Cell::Human, 0.97),
            Some(ROBOT_SHADE) => Scored::new(Cell::Robot, 0.97),
            // Mixed or unknown shade: the model would hesitate.
            _ => Scored::new(Cell::Human, 0.4),
        })
    }
}
