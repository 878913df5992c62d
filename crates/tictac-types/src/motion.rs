//! Named choreographies understood by the motion executor.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A group of joints that a motion or an auxiliary behavior drives.
///
/// Two activities that share a group must never run at the same time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JointGroup {
    Arm,
    Gripper,
    Head,
    Antennas,
}

/// Non-committal motions played while waiting on the human.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IdleMotion {
    LookAround,
    AntennaTwitch,
    GlanceAtHuman,
}

/// A named motion asset.
///
/// Grab slots are 1-based (the robot's pieces wait in numbered slots next to
/// the board); cells are 0-based board indices and are rendered 1-based in
/// asset names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "motion", content = "arg", rename_all = "snake_case")]
pub enum Motion {
    /// Arm hovering above the playground, ready to grab.
    Base,
    /// Arm folded next to the body, low torque.
    Rest,
    Grab(u8),
    Lift,
    Put(usize),
    BackUpright(usize),
    GripperClose,
    GripperOpen,
    AnnounceRobotFirst,
    AnnounceHumanFirst,
    Celebrate,
    Defeat,
    Draw,
    /// Mixes the pieces up after a confirmed cheat.
    Shuffle,
    Idle(IdleMotion),
    /// Head down, antennas relaxed, used while cooling down.
    SleepPose,
}

impl Motion {
    /// Asset name of this motion.
    pub fn name(&self) -> String {
        match self {
            Motion::Base => "base".to_string(),
            Motion::Rest => "rest".to_string(),
            Motion::Grab(slot) => format!("grab_{slot}"),
            Motion::Lift => "lift".to_string(),
            Motion::Put(cell) => format!("put_{}_smooth_10_kp", cell + 1),
            Motion::BackUpright(cell) => format!("back_{}_upright", cell + 1),
            Motion::GripperClose => "gripper_close".to_string(),
            Motion::GripperOpen => "gripper_open".to_string(),
            Motion::AnnounceRobotFirst => "announce_robot_first".to_string(),
            Motion::AnnounceHumanFirst => "announce_human_first".to_string(),
            Motion::Celebrate => "happy".to_string(),
            Motion::Defeat => "sad".to_string(),
            Motion::Draw => "surprise".to_string(),
            Motion::Shuffle => "shuffle".to_string(),
            Motion::Idle(IdleMotion::LookAround) => "idle_look_around".to_string(),
            Motion::Idle(IdleMotion::AntennaTwitch) => "idle_antenna_twitch".to_string(),
            Motion::Idle(IdleMotion::GlanceAtHuman) => "idle_glance_at_human".to_string(),
            Motion::SleepPose => "sleep_pose".to_string(),
        }
    }

    /// Joint groups driven by this motion.
    pub fn joints(&self) -> &'static [JointGroup] {
        use JointGroup::*;
        match self {
            Motion::Base
            | Motion::Rest
            | Motion::Grab(_)
            | Motion::Lift
            | Motion::Put(_)
            | Motion::BackUpright(_) => &[Arm],
            Motion::GripperClose | Motion::GripperOpen => &[Gripper],
            Motion::Idle(IdleMotion::GlanceAtHuman) => &[Head],
            Motion::Idle(IdleMotion::AntennaTwitch) => &[Antennas],
            Motion::AnnounceRobotFirst
            | Motion::AnnounceHumanFirst
            | Motion::Celebrate
            | Motion::Defeat
            | Motion::Draw
            | Motion::Idle(IdleMotion::LookAround)
            | Motion::SleepPose => &[Head, Antennas],
            Motion::Shuffle => &[Arm, Gripper, Head],
        }
    }

    /// `true` if this motion drives any of `groups`.
    pub fn conflicts_with(&self, groups: &[JointGroup]) -> bool {
        self.joints().iter().any(|g| groups.contains(g))
    }
}

impl fmt::Display for Motion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name())
    }
}
