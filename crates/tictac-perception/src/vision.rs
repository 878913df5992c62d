//! [`VisionObserver`] – camera + classifier glue.
//!
//! One observation runs three stages:
//!
//! 1. **Validity gate** – the board region is classified; anything other than
//!    [`BoardLabel::Valid`] with a score above [`VALIDITY_THRESHOLD`] yields
//!    [`Observation::Invalid`] (a hand over the board, a half-placed piece).
//! 2. **Per-cell classification** – each of the nine cell regions is
//!    classified; a cell whose score is below [`CELL_THRESHOLD`] is read as
//!    empty.
//! 3. **Orientation** – the camera faces the board from the robot's side, so
//!    image cell `(r, c)` is stored at board position `(2 - r, 2 - c)`.
//!
//! With a gaze configured the head is pointed at the board before the
//! capture and back at the human afterwards.

use std::sync::Arc;
use std::thread;
use std::time::Duration;

use tictac_hal::{Camera, CameraFrame, HeadControl};
use tictac_types::{Board, Cell, LookAt, PlaygroundError, Point3};
use tracing::{debug, info, warn};

use crate::classifier::{BoardLabel, CellClassifier};
use crate::observer::{BoardObserver, Observation};

/// Minimum validity score for a board to be read at all.
pub const VALIDITY_THRESHOLD: f32 = 0.65;

/// Minimum per-cell score for a piece to be believed.
pub const CELL_THRESHOLD: f32 = 0.9;

/// Head target centred on the playground.
pub const BOARD_TARGET: Point3 = Point3::new(0.5, 0.0, -0.55);
/// Head target facing the human opponent.
pub const HUMAN_TARGET: Point3 = Point3::new(1.0, 0.0, 0.0);

/// Pixel rectangle `[left, right) x [top, bottom)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rect {
    pub left: u32,
    pub right: u32,
    pub top: u32,
    pub bottom: u32,
}

impl Rect {
    pub const fn new(left: u32, right: u32, top: u32, bottom: u32) -> Self {
        Self {
            left,
            right,
            top,
            bottom,
        }
    }

    /// Cut this rectangle out of `frame`.
    ///
    /// # Errors
    ///
    /// Returns [`PlaygroundError::Config`] when the rectangle does not fit in
    /// the frame.  Retrying cannot help: the layout is wrong for this camera.
    pub fn crop(&self, frame: &CameraFrame) -> Result<CameraFrame, PlaygroundError> {
        frame
            .crop(self.left, self.right, self.top, self.bottom)
            .ok_or_else(|| self.outside(frame.width, frame.height))
    }

    /// `true` when the rectangle is non-empty and lies inside a
    /// `width x height` image.
    pub fn fits(&self, width: u32, height: u32) -> bool {
        self.left < self.right && self.top < self.bottom && self.right <= width && self.bottom <= height
    }

    fn outside(&self, width: u32, height: u32) -> PlaygroundError {
        PlaygroundError::Config(format!("cell layout region {self:?} outside {width}x{height} frame"))
    }
}

/// Where the board and its nine cells sit in the camera image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CellLayout {
    /// Region fed to the validity classifier.
    pub board: Rect,
    /// Cell regions, image row-major.
    pub cells: [Rect; 9],
}

impl CellLayout {
    /// Fixed calibration of the robot's head camera looking down at the
    /// playground from its resting head pose.
    pub const fn head_camera() -> Self {
        Self {
            board: Rect::new(250, 700, 350, 1000),
            cells: [
                Rect::new(209, 316, 253, 346),
                Rect::new(316, 425, 253, 346),
                Rect::new(425, 529, 253, 346),
                Rect::new(189, 306, 346, 455),
                Rect::new(306, 428, 346, 455),
                Rect::new(428, 538, 346, 455),
                Rect::new(174, 299, 455, 580),
                Rect::new(299, 429, 455, 580),
                Rect::new(429, 551, 455, 580),
            ],
        }
    }

    /// A regular grid of `cell_width x cell_height` cells starting at the
    /// image origin; the board region covers the whole grid.
    pub fn grid(cell_width: u32, cell_height: u32) -> Self {
        let cells = std::array::from_fn(|i| {
            let (row, col) = ((i / 3) as u32, (i % 3) as u32);
            Rect::new(
                col * cell_width,
                (col + 1) * cell_width,
                row * cell_height,
                (row + 1) * cell_height,
            )
        });
        Self {
            board: Rect::new(0, 3 * cell_width, 0, 3 * cell_height),
            cells,
        }
    }

    /// Check every region against a `width x height` camera image.
    ///
    /// # Errors
    ///
    /// Returns [`PlaygroundError::Config`] naming the first region that does
    /// not fit.
    pub fn check_fits(&self, width: u32, height: u32) -> Result<(), PlaygroundError> {
        match std::iter::once(&self.board)
            .chain(&self.cells)
            .find(|rect| !rect.fits(width, height))
        {
            Some(rect) => Err(rect.outside(width, height)),
            None => Ok(()),
        }
    }
}

/// [`BoardObserver`] backed by a [`Camera`] and a [`CellClassifier`].
///
/// # Example
///
/// ```rust
/// use tictac_hal::sim::{SimConfig, SimPlayground};
/// use tictac_perception::{BoardObserver, CellLayout, Observation, ShadeClassifier, VisionObserver};
/// use tictac_types::Board;
///
/// let sim = SimPlayground::new(SimConfig::default());
/// let mut observer = VisionObserver::new(sim.camera(), ShadeClassifier, CellLayout::grid(1, 1));
/// assert_eq!(observer.observe_board().unwrap(), Observation::Board(Board::empty()));
/// ```
pub struct VisionObserver<C: Camera, K: CellClassifier> {
    camera: C,
    classifier: K,
    layout: CellLayout,
    gaze: Option<(Arc<dyn HeadControl>, Duration)>,
}

impl<C: Camera, K: CellClassifier> VisionObserver<C, K> {
    pub fn new(camera: C, classifier: K, layout: CellLayout) -> Self {
        Self {
            camera,
            classifier,
            layout,
            gaze: None,
        }
    }

    /// Look at the board before each capture and wait `settle` for the
    /// image to stabilise.
    pub fn with_gaze(mut self, head: Arc<dyn HeadControl>, settle: Duration) -> Self {
        self.gaze = Some((head, settle));
        self
    }

    /// Capture one frame and check the layout against it, so a bad
    /// calibration fails at startup rather than mid-game.  A camera that is
    /// not delivering yet is only logged.
    ///
    /// # Errors
    ///
    /// Returns [`PlaygroundError::Config`] when the layout does not fit the
    /// camera image.
    pub fn verify_layout(&mut self) -> Result<(), PlaygroundError> {
        match self.camera.capture() {
            Ok(frame) => {
                self.layout.check_fits(frame.width, frame.height)?;
                info!(camera = self.camera.id(), width = frame.width, height = frame.height, "cell layout fits the camera");
                Ok(())
            }
            Err(e) => {
                warn!(error = %e, "could not verify the cell layout yet");
                Ok(())
            }
        }
    }

    fn look(&self, target: Point3) {
        let Some((head, _)) = &self.gaze else {
            return;
        };
        match head.look_at(target) {
            Ok(LookAt::Reached) => {}
            Ok(LookAt::OutOfRange) => warn!(?target, "gaze target out of range"),
            Err(e) => warn!(error = %e, "gaze failed"),
        }
    }

    fn capture(&mut self) -> Result<CameraFrame, PlaygroundError> {
        if let Some((_, settle)) = &self.gaze {
            let settle = *settle;
            self.look(BOARD_TARGET);
            thread::sleep(settle);
        }
        let frame = self.camera.capture();
        self.look(HUMAN_TARGET);
        frame
    }

    fn read_cells(&mut self, frame: &CameraFrame) -> Result<Board, PlaygroundError> {
        let mut cells = [Cell::Empty; 9];
        for (i, rect) in self.layout.cells.iter().enumerate() {
            let (row, col) = (i / 3, i % 3);
            let scored = self.classifier.classify_cell(&rect.crop(frame)?)?;
            let piece = if scored.score < CELL_THRESHOLD {
                Cell::Empty
            } else {
                scored.label
            };
            // Present the board from the human's point of view.
            cells[(2 - row) * 3 + (2 - col)] = piece;
        }
        Ok(Board::from_cells(cells))
    }
}

impl<C: Camera, K: CellClassifier> BoardObserver for VisionObserver<C, K> {
    fn observe_board(&mut self) -> Result<Observation, PlaygroundError> {
        let frame = self.capture()?;

        let validity = self.classifier.classify_board(&self.layout.board.crop(&frame)?)?;
        debug!(
            camera = self.camera.id(),
            label = ?validity.label,
            score = validity.score,
            "board validity check"
        );
        if validity.label != BoardLabel::Valid || validity.score <= VALIDITY_THRESHOLD {
            return Ok(Observation::Invalid);
        }

        Ok(Observation::Board(self.read_cells(&frame)?))
    }
}
