//! [`ThermalSupervisor`] – scheduled cooldown pauses between games.

use std::sync::Arc;
use std::thread;
use std::time::Duration;

use tictac_hal::{HeadControl, MotionExecutor, TemperatureSensor};
use tictac_kernel::ThermalPolicy;
use tictac_types::{Motion, TemperatureReading};
use tracing::{info, warn};

use crate::background::{AntennaWiggle, spawn_behavior};

/// `name=degrees` pairs for log lines.
fn describe(reading: &TemperatureReading) -> String {
    reading
        .iter()
        .map(|(id, t)| format!("{id}={t:.1}"))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Watches motor temperatures and parks the robot when they run hot.
pub struct ThermalSupervisor {
    sensor: Box<dyn TemperatureSensor>,
    head: Arc<dyn HeadControl>,
    policy: ThermalPolicy,
    poll_interval: Duration,
}

impl ThermalSupervisor {
    pub fn new(
        sensor: Box<dyn TemperatureSensor>,
        head: Arc<dyn HeadControl>,
        policy: ThermalPolicy,
        poll_interval: Duration,
    ) -> Self {
        Self {
            sensor,
            head,
            policy,
            poll_interval,
        }
    }

    /// Read the temperatures and apply the warning thresholds.  A failed
    /// read is logged and counts as "no cooldown".
    pub fn needs_cooldown(&mut self) -> bool {
        match self.sensor.read_temperatures() {
            Ok(reading) => {
                info!(temperatures = %describe(&reading), "checking motor temperatures");
                let hot = self.policy.overheating(&reading);
                if !hot.is_empty() {
                    warn!(overheating = ?hot, "motors above warning threshold");
                }
                !hot.is_empty()
            }
            Err(e) => {
                warn!(error = %e, "temperature read failed; skipping cooldown check");
                false
            }
        }
    }

    /// Park the arm, show the sleep pose and wiggle the antennas until every
    /// motor is below its resume threshold.
    ///
    /// Never returns while a motor is at or above its resume threshold.
    /// Failed reads count as "still hot".
    pub fn wait_for_cooldown(&mut self, motion: &mut dyn MotionExecutor) {
        for m in [Motion::Rest, Motion::SleepPose] {
            if let Err(e) = motion.execute(&m) {
                warn!(motion = %m, error = %e, "cooldown pose failed");
            }
        }

        let wiggle = match spawn_behavior(Arc::new(AntennaWiggle::new(Arc::clone(&self.head)))) {
            Ok(task) => Some(task),
            Err(e) => {
                warn!(error = %e, "antenna wiggle unavailable during cooldown");
                None
            }
        };

        loop {
            match self.sensor.read_temperatures() {
                Ok(reading) => {
                    warn!(temperatures = %describe(&reading), "motors cooling down");
                    if self.policy.cooled_down(&reading) {
                        break;
                    }
                }
                Err(e) => warn!(error = %e, "temperature read failed during cooldown"),
            }
            if !self.poll_interval.is_zero() {
                thread::sleep(self.poll_interval);
            }
        }

        if let Some(task) = wiggle {
            task.stop();
        }
        info!("cooldown finished");
    }
}
