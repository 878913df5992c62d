//! The `observe_board` seam between perception and the game controller.

use tictac_types::{Board, PlaygroundError};

/// Result of one perception attempt that produced a frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Observation {
    /// A readable board, in the human's point of view.
    Board(Board),
    /// A frame was captured but the board could not be read reliably
    /// (occluded, hand in view, blurred).
    Invalid,
}

impl Observation {
    pub fn board(&self) -> Option<Board> {
        match self {
            Observation::Board(b) => Some(*b),
            Observation::Invalid => None,
        }
    }
}

/// Produces board observations on demand.
pub trait BoardObserver: Send {
    /// Capture and interpret the current board.
    ///
    /// # Errors
    ///
    /// Returns [`PlaygroundError::CameraUnavailable`] when no frame could be
    /// obtained at all.  An unreadable frame is *not* an error; it is
    /// [`Observation::Invalid`].
    fn observe_board(&mut self) -> Result<Observation, PlaygroundError>;
}

impl<O: BoardObserver + ?Sized> BoardObserver for Box<O> {
    fn observe_board(&mut self) -> Result<Observation, PlaygroundError> {
        (**self).observe_board()
    }
}
