//! `tictac-perception` – board perception.
//!
//! Turns head-camera frames into [`Board`][tictac_types::Board] values the
//! game controller can reason about.
//!
//! # Modules
//!
//! - [`observer`] – [`BoardObserver`][observer::BoardObserver]: the single
//!   `observe_board` operation the controller consumes, and its
//!   [`Observation`][observer::Observation] result.
//! - [`classifier`] – [`CellClassifier`][classifier::CellClassifier]: the
//!   image-classification seam (board validity and per-cell piece), plus
//!   [`ShadeClassifier`][classifier::ShadeClassifier] for simulated frames.
//! - [`vision`] – [`VisionObserver`][vision::VisionObserver]: camera +
//!   classifier glue applying the validity gate, the per-cell confidence
//!   threshold and the robot-to-human orientation flip.

pub mod classifier;
pub mod observer;
pub mod vision;

pub use classifier::{BoardLabel, CellClassifier, Scored, ShadeClassifier};
pub use observer::{BoardObserver, Observation};
pub use vision::{CellLayout, Rect, VisionObserver};
