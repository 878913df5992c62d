//! `tictac-runtime` – Game Orchestration
//!
//! Everything between "a board was observed" and "the arm moved".
//!
//! # Modules
//!
//! - [`controller`] – [`GameController`]: the game state machine, its
//!   single-step [`GameController::step`], the per-game
//!   [`GameController::run_game_loop`] and the endless outer loop.
//! - [`move_selector`] – [`MoveSelector`]: value-table lookup with opening
//!   diversification.
//! - [`value_table`] – [`ActionValueTable`]: the pre-computed X / O value
//!   tables loaded from JSON.
//! - [`choreography`] – [`Choreography`][choreography::Choreography]:
//!   composable motion programs such as the place-piece sequence.
//! - [`idle`] – [`IdleBehaviorScheduler`]: random idle behaviors while
//!   waiting.
//! - [`thermal`] – [`ThermalSupervisor`]: between-game cooldown pauses.
//! - [`background`] – cancellable worker threads for auxiliary behaviors
//!   (antenna wiggle, follow-hand) and the [`JointArbiter`] that keeps them
//!   off the joints a choreography needs.
//! - [`telemetry`] – [`init_tracing`]: console / file / OTLP tracing setup.

pub mod background;
pub mod choreography;
pub mod controller;
pub mod idle;
pub mod move_selector;
pub mod telemetry;
pub mod thermal;
pub mod value_table;

#[cfg(test)]
mod test_support;

pub use background::{AntennaWiggle, Behavior, CancelToken, FollowHand, JointArbiter};
pub use controller::{GameController, GameControllerConfig, GameOutcome, GameSession, GameState};
pub use idle::{IdleBehaviorScheduler, IdleVariant};
pub use move_selector::{Move, MoveSelector};
pub use telemetry::{TracerProviderGuard, init_tracing};
pub use thermal::ThermalSupervisor;
pub use value_table::ActionValueTable;
