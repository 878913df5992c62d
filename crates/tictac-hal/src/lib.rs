//! `tictac-hal` – Hardware Abstraction Layer
//!
//! The only place in the workspace that talks to the robot.  Game logic is
//! written against the traits in this crate and never against a concrete
//! driver.
//!
//! # Modules
//!
//! - [`camera`] – [`Camera`][camera::Camera]: raw head-camera frames.
//! - [`motion`] – [`MotionExecutor`][motion::MotionExecutor]: plays named
//!   choreographies to completion.
//! - [`head`] – [`HeadControl`][head::HeadControl] and
//!   [`ArmState`][head::ArmState]: shared, thread-safe head targeting and
//!   arm kinematics used by auxiliary behaviors.
//! - [`thermal`] – [`TemperatureSensor`][thermal::TemperatureSensor]:
//!   motor temperature snapshots.
//! - [`handle`] – [`RobotHandle`][handle::RobotHandle]: the explicitly
//!   passed bundle of all robot-side drivers.
//! - [`sim`] – [`SimPlayground`][sim::SimPlayground]: an in-process table,
//!   camera, arm and simulated human for demos and tests.

pub mod camera;
pub mod handle;
pub mod head;
pub mod motion;
pub mod sim;
pub mod thermal;

pub use camera::{Camera, CameraFrame};
pub use handle::RobotHandle;
pub use head::{ArmState, HeadControl};
pub use motion::MotionExecutor;
pub use sim::{SimConfig, SimPlayground};
pub use thermal::TemperatureSensor;
