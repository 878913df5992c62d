//! `TemperatureSensor` trait for polling actuator temperatures.

use tictac_types::{PlaygroundError, TemperatureReading};

/// Reads the temperature of every tracked actuator.
pub trait TemperatureSensor: Send {
    /// Return a fresh snapshot.
    ///
    /// # Errors
    ///
    /// Returns [`PlaygroundError::HardwareFault`] if the motors could not be
    /// queried.
    fn read_temperatures(&mut self) -> Result<TemperatureReading, PlaygroundError>;
}
