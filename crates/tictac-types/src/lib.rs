//! `tictac-types` – shared vocabulary of the playground.
//!
//! Every crate in the workspace speaks in these types: the [`Board`] value
//! produced by perception, the [`Motion`] names dispatched to the arm, the
//! [`TemperatureReading`] snapshots used by thermal supervision, and the
//! workspace-wide [`PlaygroundError`].

pub mod board;
pub mod motion;
pub mod sensors;

use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

pub use board::{Board, CENTER, Cell, Player, WIN_LINES, Winner};
pub use motion::{IdleMotion, JointGroup, Motion};
pub use sensors::{ActuatorId, JointKind, LookAt, Point3, TemperatureReading};

/// Record of one finished (or reset) game, logged by the outer loop.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameSummary {
    pub session_id: Uuid,
    /// 1-based count of games played since process start.
    pub game_number: u64,
    /// `None` when the game was abandoned after a confirmed cheat.
    pub winner: Option<Winner>,
    pub robot_pieces: u8,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

/// Error type shared by hardware collaborators, perception and the runtime.
#[derive(Error, Debug)]
pub enum PlaygroundError {
    #[error("Hardware Fault on {component}: {details}")]
    HardwareFault { component: String, details: String },

    #[error("Motion '{motion}' failed: {details}")]
    MotionFailed { motion: String, details: String },

    #[error("Camera unavailable: {0}")]
    CameraUnavailable(String),

    #[error("Camera produced no frame for {silent_for:?}")]
    CameraStalled { silent_for: Duration },

    #[error("No legal move on a final board")]
    NoLegalMove,

    #[error("Value table error: {0}")]
    ValueTable(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl PlaygroundError {
    /// `true` for errors after which no in-process recovery exists.
    pub fn is_fatal(&self) -> bool {
        matches!(self, PlaygroundError::CameraStalled { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn game_summary_roundtrip() {
        let summary = GameSummary {
            session_id: Uuid::new_v4(),
            game_number: 3,
            winner: Some(Winner::Robot),
            robot_pieces: 3,
            started_at: Utc::now(),
            finished_at: Utc::now(),
        };
        let json = serde_json::to_string(&summary).unwrap();
        let back: GameSummary = serde_json::from_str(&json).unwrap();
        assert_eq!(summary.session_id, back.session_id);
        assert_eq!(back.winner, Some(Winner::Robot));
    }

    #[test]
    fn playground_error_display() {
        let err = PlaygroundError::MotionFailed {
            motion: "grab_2".to_string(),
            details: "gripper jammed".to_string(),
        };
        assert!(err.to_string().contains("grab_2"));

        let err = PlaygroundError::HardwareFault {
            component: "head".to_string(),
            details: "overload".to_string(),
        };
        assert!(err.to_string().contains("head"));
    }

    #[test]
    fn only_camera_stall_is_fatal() {
        assert!(PlaygroundError::CameraStalled { silent_for: Duration::from_secs(31) }.is_fatal());
        assert!(!PlaygroundError::CameraUnavailable("usb".to_string()).is_fatal());
        assert!(!PlaygroundError::NoLegalMove.is_fatal());
    }
}
