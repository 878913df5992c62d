//! Sensor-side value types: actuator identifiers, temperature snapshots and
//! head targeting.

use std::collections::BTreeMap;
use std::fmt;
use std::ops::{Add, Sub};

use serde::{Deserialize, Serialize};

/// Thermal class of a joint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JointKind {
    /// Regular servo motor.
    Standard,
    /// High-precision neck disk; runs with tighter thermal limits.
    Precision,
}

/// Every actuator whose temperature is tracked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActuatorId {
    ShoulderPitch,
    ShoulderRoll,
    ArmYaw,
    ElbowPitch,
    ForearmYaw,
    WristPitch,
    WristRoll,
    Gripper,
    LeftAntenna,
    RightAntenna,
    NeckDiskTop,
    NeckDiskMiddle,
    NeckDiskBottom,
}

impl ActuatorId {
    pub const ALL: [ActuatorId; 13] = [
        ActuatorId::ShoulderPitch,
        ActuatorId::ShoulderRoll,
        ActuatorId::ArmYaw,
        ActuatorId::ElbowPitch,
        ActuatorId::ForearmYaw,
        ActuatorId::WristPitch,
        ActuatorId::WristRoll,
        ActuatorId::Gripper,
        ActuatorId::LeftAntenna,
        ActuatorId::RightAntenna,
        ActuatorId::NeckDiskTop,
        ActuatorId::NeckDiskMiddle,
        ActuatorId::NeckDiskBottom,
    ];

    /// Hardware name of the motor, e.g. `"right_arm.elbow_pitch"`.
    pub const fn name(self) -> &'static str {
        match self {
            ActuatorId::ShoulderPitch => "right_arm.shoulder_pitch",
            ActuatorId::ShoulderRoll => "right_arm.shoulder_roll",
            ActuatorId::ArmYaw => "right_arm.arm_yaw",
            ActuatorId::ElbowPitch => "right_arm.elbow_pitch",
            ActuatorId::ForearmYaw => "right_arm.hand.forearm_yaw",
            ActuatorId::WristPitch => "right_arm.hand.wrist_pitch",
            ActuatorId::WristRoll => "right_arm.hand.wrist_roll",
            ActuatorId::Gripper => "right_arm.hand.gripper",
            ActuatorId::LeftAntenna => "head.left_antenna",
            ActuatorId::RightAntenna => "head.right_antenna",
            ActuatorId::NeckDiskTop => "head.neck.disk_top",
            ActuatorId::NeckDiskMiddle => "head.neck.disk_middle",
            ActuatorId::NeckDiskBottom => "head.neck.disk_bottom",
        }
    }

    pub const fn kind(self) -> JointKind {
        match self {
            ActuatorId::NeckDiskTop | ActuatorId::NeckDiskMiddle | ActuatorId::NeckDiskBottom => {
                JointKind::Precision
            }
            _ => JointKind::Standard,
        }
    }
}

impl fmt::Display for ActuatorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Latest temperature snapshot, degrees Celsius per actuator.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TemperatureReading(BTreeMap<ActuatorId, f32>);

impl TemperatureReading {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    pub fn with(mut self, id: ActuatorId, degrees: f32) -> Self {
        self.0.insert(id, degrees);
        self
    }

    pub fn insert(&mut self, id: ActuatorId, degrees: f32) {
        self.0.insert(id, degrees);
    }

    pub fn get(&self, id: ActuatorId) -> Option<f32> {
        self.0.get(&id).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (ActuatorId, f32)> + '_ {
        self.0.iter().map(|(id, t)| (*id, *t))
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Hottest actuator, if any reading is present.
    pub fn hottest(&self) -> Option<(ActuatorId, f32)> {
        self.iter().max_by(|a, b| a.1.total_cmp(&b.1))
    }
}

impl FromIterator<(ActuatorId, f32)> for TemperatureReading {
    fn from_iter<I: IntoIterator<Item = (ActuatorId, f32)>>(iter: I) -> Self {
        TemperatureReading(iter.into_iter().collect())
    }
}

/// A point in the robot frame, metres.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Point3 {
    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }
}

impl Add for Point3 {
    type Output = Point3;

    fn add(self, rhs: Point3) -> Point3 {
        Point3::new(self.x + rhs.x, self.y + rhs.y, self.z + rhs.z)
    }
}

impl Sub for Point3 {
    type Output = Point3;

    fn sub(self, rhs: Point3) -> Point3 {
        Point3::new(self.x - rhs.x, self.y - rhs.y, self.z - rhs.z)
    }
}

/// Outcome of a head look-at request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LookAt {
    /// The head is moving towards the target.
    Reached,
    /// The target is outside the neck's reachable cone; nothing moved.
    OutOfRange,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn neck_disks_are_precision_joints() {
        let precision: Vec<_> = ActuatorId::ALL
            .iter()
            .filter(|id| id.kind() == JointKind::Precision)
            .collect();
        assert_eq!(precision.len(), 3);
        assert_eq!(ActuatorId::ElbowPitch.kind(), JointKind::Standard);
    }

    #[test]
    fn hottest_picks_the_maximum() {
        let reading = TemperatureReading::new()
            .with(ActuatorId::ElbowPitch, 41.0)
            .with(ActuatorId::ShoulderPitch, 52.5)
            .with(ActuatorId::NeckDiskTop, 38.0);
        assert_eq!(reading.hottest(), Some((ActuatorId::ShoulderPitch, 52.5)));
        assert_eq!(TemperatureReading::new().hottest(), None);
    }

    #[test]
    fn point_arithmetic() {
        let v = Point3::new(0.3, 0.1, -0.2) - Point3::new(0.0, 0.0, 0.09) + Point3::new(0.1, 0.0, 0.1);
        assert!((v.x - 0.4).abs() < 1e-6);
        assert!((v.y - 0.1).abs() < 1e-6);
        assert!((v.z - (-0.19)).abs() < 1e-6);
    }

    #[test]
    fn reading_serializes_with_actuator_names() {
        let reading = TemperatureReading::new().with(ActuatorId::Gripper, 40.0);
        let json = serde_json::to_string(&reading).unwrap();
        assert!(json.contains("gripper"));
    }
}
