//! Head and arm-state handles shared with auxiliary behaviors.
//!
//! Unlike [`MotionExecutor`][crate::motion::MotionExecutor], these traits take
//! `&self` and are `Sync`: background threads hold them behind an `Arc` and
//! drivers synchronise internally.

use tictac_types::{LookAt, PlaygroundError, Point3};

/// Direct control over the neck and antennas.
pub trait HeadControl: Send + Sync {
    /// Orient the head towards `target` (robot frame, metres).
    ///
    /// Returns [`LookAt::OutOfRange`] when the target is outside the neck's
    /// reachable cone; in that case the head does not move.
    ///
    /// # Errors
    ///
    /// Returns [`PlaygroundError::HardwareFault`] on a communication or
    /// motor failure.
    fn look_at(&self, target: Point3) -> Result<LookAt, PlaygroundError>;

    /// Set both antenna goal positions, in degrees.
    fn set_antennas(&self, left_deg: f32, right_deg: f32) -> Result<(), PlaygroundError>;
}

/// Read-only view of the arm's live state.
pub trait ArmState: Send + Sync {
    /// Current end-effector position from forward kinematics.
    fn end_effector_position(&self) -> Result<Point3, PlaygroundError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    struct MockHead {
        antennas: Mutex<(f32, f32)>,
    }

    impl HeadControl for MockHead {
        fn look_at(&self, target: Point3) -> Result<LookAt, PlaygroundError> {
            if target.x <= 0.0 {
                Ok(LookAt::OutOfRange)
            } else {
                Ok(LookAt::Reached)
            }
        }

        fn set_antennas(&self, left_deg: f32, right_deg: f32) -> Result<(), PlaygroundError> {
            *self.antennas.lock().unwrap() = (left_deg, right_deg);
            Ok(())
        }
    }

    #[test]
    fn head_is_shareable_across_threads() {
        let head: Arc<dyn HeadControl> = Arc::new(MockHead {
            antennas: Mutex::new((0.0, 0.0)),
        });
        let remote = Arc::clone(&head);
        std::thread::spawn(move || remote.set_antennas(10.0, -10.0).unwrap())
            .join()
            .unwrap();
        assert_eq!(head.look_at(Point3::new(-1.0, 0.0, 0.0)).unwrap(), LookAt::OutOfRange);
        assert_eq!(head.look_at(Point3::new(0.5, 0.0, 0.0)).unwrap(), LookAt::Reached);
    }
}
