//! `MotionExecutor` trait for playing named choreographies on the arm and
//! head.
//!
//! The game logic never looks inside a motion: it names one, hands it to the
//! executor and waits until it either completed or failed.  Physical motion
//! calls have no timeout; they run to completion.

use tictac_types::{Motion, PlaygroundError};

/// Plays [`Motion`] assets to completion.
pub trait MotionExecutor: Send {
    /// Play `motion` and block until it is done.
    ///
    /// # Errors
    ///
    /// Returns [`PlaygroundError::MotionFailed`] when the choreography could
    /// not be completed (missing asset, motor fault, gripper jam, ...).
    fn execute(&mut self, motion: &Motion) -> Result<(), PlaygroundError>;
}

impl<M: MotionExecutor + ?Sized> MotionExecutor for Box<M> {
    fn execute(&mut self, motion: &Motion) -> Result<(), PlaygroundError> {
        (**self).execute(motion)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Minimal in-process executor used only for tests.
    struct MockExecutor {
        played: Vec<Motion>,
        broken: Option<Motion>,
    }

    impl MotionExecutor for MockExecutor {
        fn execute(&mut self, motion: &Motion) -> Result<(), PlaygroundError> {
            if self.broken == Some(*motion) {
                return Err(PlaygroundError::MotionFailed {
                    motion: motion.name(),
                    details: "asset missing".to_string(),
                });
            }
            self.played.push(*motion);
            Ok(())
        }
    }

    #[test]
    fn boxed_executor_forwards_calls() {
        let mut exec: Box<dyn MotionExecutor> = Box::new(MockExecutor {
            played: Vec::new(),
            broken: None,
        });
        exec.execute(&Motion::Lift).unwrap();
        exec.execute(&Motion::Rest).unwrap();
    }

    #[test]
    fn failing_motion_reports_its_name() {
        let mut exec = MockExecutor {
            played: Vec::new(),
            broken: Some(Motion::Grab(2)),
        };
        let err = exec.execute(&Motion::Grab(2)).unwrap_err();
        assert!(matches!(err, PlaygroundError::MotionFailed { ref motion, .. } if motion == "grab_2"));
        assert!(exec.played.is_empty());
    }
}
