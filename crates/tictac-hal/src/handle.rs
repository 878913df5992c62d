//! [`RobotHandle`] – the single, explicitly passed entry point to the robot.
//!
//! There is no ambient robot object.  Process bootstrap builds one
//! `RobotHandle` from concrete drivers and gives it to the game controller,
//! which keeps the exclusive [`MotionExecutor`] for itself and hands out
//! capability-scoped sub-handles: the [`TemperatureSensor`] to thermal
//! supervision, and shared [`HeadControl`] / [`ArmState`] references to
//! auxiliary behaviors.

use std::sync::Arc;

use crate::head::{ArmState, HeadControl};
use crate::motion::MotionExecutor;
use crate::thermal::TemperatureSensor;

/// All robot-side collaborators of a playground.
pub struct RobotHandle {
    /// Exclusive choreography player.
    pub motion: Box<dyn MotionExecutor>,
    /// Shared head / antenna control.
    pub head: Arc<dyn HeadControl>,
    /// Shared arm kinematic state.
    pub arm: Arc<dyn ArmState>,
    /// Motor temperature sensor.
    pub thermal: Box<dyn TemperatureSensor>,
}

impl RobotHandle {
    /// Assemble a handle from its drivers.
    pub fn new(
        motion: Box<dyn MotionExecutor>,
        head: Arc<dyn HeadControl>,
        arm: Arc<dyn ArmState>,
        thermal: Box<dyn TemperatureSensor>,
    ) -> Self {
        Self {
            motion,
            head,
            arm,
            thermal,
        }
    }
}
