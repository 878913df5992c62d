//! [`ThermalPolicy`] – motor temperature limits with hysteresis.
//!
//! A cooldown is triggered when any actuator rises *above* its warning
//! threshold, and only ends once every actuator has fallen strictly *below*
//! its (lower) resume threshold.  The gap between the two keeps the robot
//! from oscillating around a single limit.

use tictac_types::{ActuatorId, JointKind, PlaygroundError, TemperatureReading};

/// Warning / resume pair for one joint kind, degrees Celsius.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Thresholds {
    pub warn: f32,
    pub resume: f32,
}

impl Thresholds {
    pub const fn new(warn: f32, resume: f32) -> Self {
        Self { warn, resume }
    }
}

/// Thresholds for every joint kind.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ThermalPolicy {
    pub standard: Thresholds,
    pub precision: Thresholds,
}

impl Default for ThermalPolicy {
    fn default() -> Self {
        Self {
            standard: Thresholds::new(50.0, 45.0),
            precision: Thresholds::new(45.0, 40.0),
        }
    }
}

impl ThermalPolicy {
    /// Build a policy, rejecting pairs without hysteresis.
    ///
    /// # Errors
    ///
    /// Returns [`PlaygroundError::Config`] when a resume threshold is not
    /// strictly below its warning threshold.
    pub fn new(standard: Thresholds, precision: Thresholds) -> Result<Self, PlaygroundError> {
        for (kind, t) in [("standard", standard), ("precision", precision)] {
            if t.resume >= t.warn {
                return Err(PlaygroundError::Config(format!(
                    "{kind} resume threshold {} must be below warning threshold {}",
                    t.resume, t.warn
                )));
            }
        }
        Ok(Self {
            standard,
            precision,
        })
    }

    pub fn thresholds(&self, id: ActuatorId) -> Thresholds {
        match id.kind() {
            JointKind::Standard => self.standard,
            JointKind::Precision => self.precision,
        }
    }

    /// Actuators currently above their warning threshold.
    pub fn overheating(&self, reading: &TemperatureReading) -> Vec<(ActuatorId, f32)> {
        reading
            .iter()
            .filter(|(id, t)| *t > self.thresholds(*id).warn)
            .collect()
    }

    /// `true` when any actuator is above its warning threshold.
    pub fn needs_cooldown(&self, reading: &TemperatureReading) -> bool {
        reading.iter().any(|(id, t)| t > self.thresholds(id).warn)
    }

    /// `true` when every actuator is strictly below its resume threshold.
    pub fn cooled_down(&self, reading: &TemperatureReading) -> bool {
        reading.iter().all(|(id, t)| t < self.thresholds(id).resume)
    }
}
