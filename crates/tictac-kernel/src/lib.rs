//! `tictac-kernel` – Safety & Rules
//!
//! Pure, hardware-free rule checks the game controller consults before it
//! trusts an observation or keeps the motors running.
//!
//! # Modules
//!
//! - [`cheat`] – [`CheatDetector`][cheat::CheatDetector]: classifies the
//!   per-cell delta between the last accepted board and a new observation;
//!   [`BoardValidator`][cheat::BoardValidator] rejects boards whose piece
//!   counts cannot come from alternating play.
//! - [`thermal_policy`] – [`ThermalPolicy`][thermal_policy::ThermalPolicy]:
//!   warning / resume thresholds per joint kind with hysteresis.
//! - [`watchdog`] – [`Watchdog`][watchdog::Watchdog]: tracks heartbeats from
//!   data producers (the camera) and reports components that went silent.

pub mod cheat;
pub mod thermal_policy;
pub mod watchdog;

pub use cheat::{BoardValidator, CellChange, CheatDetector, Delta, Transition};
pub use thermal_policy::{ThermalPolicy, Thresholds};
pub use watchdog::{ComponentHealth, Watchdog};
