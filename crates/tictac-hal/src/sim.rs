//! In-process simulated playground for demos and CI without a robot.
//!
//! [`SimPlayground`] owns a virtual table ([`SimTable`]) shared by a set of
//! stub drivers:
//!
//! | Driver | Behaviour |
//! |---|---|
//! | [`SimCamera`] | Renders the table as a 3x3 greyscale frame seen from the robot's side (rotated 180°).  Each capture lets the simulated human think, play or clear the board. |
//! | [`SimMotion`] | Records every motion; `put_N` drops a cylinder on the table, end-of-game motions make the human clear it, arm motions heat the arm. |
//! | [`SimHead`]   | Accepts look-at targets in front of the robot, reports `OutOfRange` otherwise. |
//! | [`SimArm`]    | End-effector position updated by arm motions. |
//! | [`SimThermal`]| Arm motors heat up with use and cool down on every read. |
//!
//! # Example
//!
//! ```rust
//! use tictac_hal::camera::Camera;
//! use tictac_hal::motion::MotionExecutor;
//! use tictac_hal::sim::{SimConfig, SimPlayground};
//! use tictac_types::Motion;
//!
//! let sim = SimPlayground::new(SimConfig::default());
//! let mut robot = sim.robot();
//! robot.motion.execute(&Motion::Put(4)).expect("sim motion must succeed");
//!
//! let frame = sim.camera().capture().expect("sim camera must succeed");
//! assert_eq!(frame.data[4], tictac_hal::sim::ROBOT_SHADE);
//! ```

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard};

use rand::rngs::SmallRng;
use rand::seq::IndexedRandom;
use rand::{Rng, SeedableRng};
use tictac_types::{
    ActuatorId, Board, Cell, JointGroup, LookAt, Motion, PlaygroundError, Point3,
    TemperatureReading,
};
use tracing::debug;

use crate::camera::{Camera, CameraFrame};
use crate::handle::RobotHandle;
use crate::head::{ArmState, HeadControl};
use crate::motion::MotionExecutor;
use crate::thermal::TemperatureSensor;

/// Pixel value of an empty cell.
pub const EMPTY_SHADE: u8 = 0;
/// Pixel value of a cube (human piece).
pub const HUMAN_SHADE: u8 = 100;
/// Pixel value of a cylinder (robot piece).
pub const ROBOT_SHADE: u8 = 200;
/// Pixel value of a blurred, unusable frame.
pub const BLUR_SHADE: u8 = 255;

const AMBIENT_DEG: f32 = 30.0;

fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

// ────────────────────────────────────────────────────────────────────────────
// Configuration
// ────────────────────────────────────────────────────────────────────────────

/// Tunables of the simulated world.
#[derive(Debug, Clone)]
pub struct SimConfig {
    /// Captures the simulated human waits before playing or clearing.
    pub human_think_frames: u32,
    /// Probability that a frame shows a phantom cube on an empty cell.
    pub glitch_rate: f64,
    /// Probability that a frame is blurred and must be rejected.
    pub blur_rate: f64,
    /// Degrees added to every arm motor per arm motion.
    pub heat_per_motion: f32,
    /// Degrees removed from every motor per temperature read.
    pub cooling_per_read: f32,
    pub seed: u64,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            human_think_frames: 2,
            glitch_rate: 0.0,
            blur_rate: 0.0,
            heat_per_motion: 0.05,
            cooling_per_read: 0.5,
            seed: 7,
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Virtual table
// ────────────────────────────────────────────────────────────────────────────

/// The physical board of the simulation plus the simulated human opponent.
pub struct SimTable {
    board: Board,
    human_to_move: bool,
    wait: u32,
    clearing: bool,
    config: SimConfig,
    rng: SmallRng,
}

/// Table handle shared between the simulated drivers.
pub type SharedTable = Arc<Mutex<SimTable>>;

impl SimTable {
    pub fn new(config: SimConfig) -> Self {
        Self {
            board: Board::empty(),
            human_to_move: false,
            wait: 0,
            clearing: false,
            rng: SmallRng::seed_from_u64(config.seed),
            config,
        }
    }

    pub fn board(&self) -> Board {
        self.board
    }

    /// Overwrite the table, e.g. to stage a scenario.
    pub fn set_board(&mut self, board: Board) {
        self.board = board;
    }

    /// Let the simulated world advance by one camera frame.
    fn advance(&mut self) {
        if self.clearing {
            if self.wait == 0 {
                debug!("simulated human clears the board");
                self.board = Board::empty();
                self.clearing = false;
                self.human_to_move = false;
            } else {
                self.wait -= 1;
            }
            return;
        }
        if !self.human_to_move || self.board.is_final() {
            return;
        }
        if self.wait > 0 {
            self.wait -= 1;
            return;
        }
        let empty: Vec<usize> = self.board.empty_cells().collect();
        if let Some(&cell) = empty.choose(&mut self.rng) {
            debug!(cell, "simulated human places a cube");
            self.board = self.board.with_move(cell, Cell::Human);
        }
        self.human_to_move = false;
    }

    fn hand_over_to_human(&mut self) {
        self.human_to_move = true;
        self.wait = self.config.human_think_frames;
    }

    fn place_robot_piece(&mut self, cell: usize) {
        if cell < 9 {
            self.board = self.board.with_move(cell, Cell::Robot);
        }
        if !self.board.is_final() {
            self.hand_over_to_human();
        }
    }

    fn schedule_clear(&mut self) {
        self.clearing = true;
        self.human_to_move = false;
        self.wait = self.config.human_think_frames;
    }

    /// Render the table from the robot's point of view.
    fn render(&mut self) -> CameraFrame {
        let mut shown = self.board;
        if self.rng.random_bool(self.config.blur_rate.clamp(0.0, 1.0)) {
            return CameraFrame {
                width: 3,
                height: 3,
                data: vec![BLUR_SHADE; 9],
            };
        }
        if self.rng.random_bool(self.config.glitch_rate.clamp(0.0, 1.0)) {
            let empty: Vec<usize> = shown.empty_cells().collect();
            if let Some(&cell) = empty.choose(&mut self.rng) {
                shown = shown.with_move(cell, Cell::Human);
            }
        }
        let mut data = vec![EMPTY_SHADE; 9];
        for (i, cell) in shown.cells().iter().enumerate() {
            // The camera sits across the table: image (r, c) is board (2-r, 2-c).
            data[8 - i] = match cell {
                Cell::Empty => EMPTY_SHADE,
                Cell::Human => HUMAN_SHADE,
                Cell::Robot => ROBOT_SHADE,
            };
        }
        CameraFrame {
            width: 3,
            height: 3,
            data,
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Stub camera
// ────────────────────────────────────────────────────────────────────────────

/// A simulated head camera looking at the [`SimTable`].
pub struct SimCamera {
    id: String,
    table: SharedTable,
}

impl Camera for SimCamera {
    fn id(&self) -> &str {
        &self.id
    }

    fn capture(&mut self) -> Result<CameraFrame, PlaygroundError> {
        let mut table = lock(&self.table);
        table.advance();
        Ok(table.render())
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Stub arm / head
// ────────────────────────────────────────────────────────────────────────────

/// Simulated arm whose end effector jumps to fixed poses.
#[derive(Default)]
pub struct SimArm {
    position: Mutex<Point3>,
}

impl SimArm {
    fn move_to(&self, p: Point3) {
        *lock(&self.position) = p;
    }
}

impl ArmState for SimArm {
    fn end_effector_position(&self) -> Result<Point3, PlaygroundError> {
        Ok(*lock(&self.position))
    }
}

/// Simulated head recording its most recent commands.
#[derive(Default)]
pub struct SimHead {
    last_target: Mutex<Option<Point3>>,
    antennas: Mutex<(f32, f32)>,
}

impl SimHead {
    pub fn last_target(&self) -> Option<Point3> {
        *lock(&self.last_target)
    }

    pub fn antennas(&self) -> (f32, f32) {
        *lock(&self.antennas)
    }
}

impl HeadControl for SimHead {
    fn look_at(&self, target: Point3) -> Result<LookAt, PlaygroundError> {
        // The neck cannot look behind itself.
        if target.x <= 0.05 {
            return Ok(LookAt::OutOfRange);
        }
        *lock(&self.last_target) = Some(target);
        Ok(LookAt::Reached)
    }

    fn set_antennas(&self, left_deg: f32, right_deg: f32) -> Result<(), PlaygroundError> {
        *lock(&self.antennas) = (left_deg, right_deg);
        Ok(())
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Stub thermal model
// ────────────────────────────────────────────────────────────────────────────

type SharedHeat = Arc<Mutex<BTreeMap<ActuatorId, f32>>>;

/// Simulated temperature sensor.
pub struct SimThermal {
    heat: SharedHeat,
    cooling_per_read: f32,
}

impl TemperatureSensor for SimThermal {
    fn read_temperatures(&mut self) -> Result<TemperatureReading, PlaygroundError> {
        let mut heat = lock(&self.heat);
        for t in heat.values_mut() {
            *t = (*t - self.cooling_per_read).max(AMBIENT_DEG);
        }
        Ok(heat.iter().map(|(id, t)| (*id, *t)).collect())
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Stub motion executor
// ────────────────────────────────────────────────────────────────────────────

/// Simulated choreography player.  Always succeeds.
pub struct SimMotion {
    table: SharedTable,
    arm: Arc<SimArm>,
    heat: SharedHeat,
    heat_per_motion: f32,
    log: Arc<Mutex<Vec<Motion>>>,
}

impl MotionExecutor for SimMotion {
    fn execute(&mut self, motion: &Motion) -> Result<(), PlaygroundError> {
        debug!(motion = %motion, "sim motion");
        lock(&self.log).push(*motion);

        match motion {
            Motion::Put(cell) => {
                self.arm.move_to(cell_position(*cell));
                lock(&self.table).place_robot_piece(*cell);
            }
            Motion::Grab(slot) => self.arm.move_to(Point3::new(0.3, -0.35 + 0.05 * *slot as f32, -0.3)),
            Motion::Base | Motion::Lift => self.arm.move_to(Point3::new(0.35, -0.2, -0.2)),
            Motion::Rest => self.arm.move_to(Point3::new(0.0, -0.2, -0.5)),
            Motion::AnnounceHumanFirst => lock(&self.table).hand_over_to_human(),
            Motion::Celebrate | Motion::Defeat | Motion::Draw | Motion::Shuffle => {
                lock(&self.table).schedule_clear()
            }
            _ => {}
        }

        if motion.joints().contains(&JointGroup::Arm) {
            let mut heat = lock(&self.heat);
            for (id, t) in heat.iter_mut() {
                if is_arm_motor(*id) {
                    *t += self.heat_per_motion;
                }
            }
        }
        Ok(())
    }
}

fn is_arm_motor(id: ActuatorId) -> bool {
    !matches!(
        id,
        ActuatorId::LeftAntenna
            | ActuatorId::RightAntenna
            | ActuatorId::NeckDiskTop
            | ActuatorId::NeckDiskMiddle
            | ActuatorId::NeckDiskBottom
    )
}

/// Robot-frame position above a board cell.
fn cell_position(cell: usize) -> Point3 {
    let (row, col) = ((cell / 3) as f32, (cell % 3) as f32);
    Point3::new(0.5 - 0.08 * row, 0.08 * (col - 1.0), -0.45)
}

// ────────────────────────────────────────────────────────────────────────────
// SimPlayground
// ────────────────────────────────────────────────────────────────────────────

/// A complete simulated playground: table, camera and robot drivers.
pub struct SimPlayground {
    table: SharedTable,
    arm: Arc<SimArm>,
    head: Arc<SimHead>,
    heat: SharedHeat,
    log: Arc<Mutex<Vec<Motion>>>,
    config: SimConfig,
}

impl SimPlayground {
    pub fn new(config: SimConfig) -> Self {
        let heat = ActuatorId::ALL.iter().map(|id| (*id, AMBIENT_DEG)).collect();
        Self {
            table: Arc::new(Mutex::new(SimTable::new(config.clone()))),
            arm: Arc::new(SimArm::default()),
            head: Arc::new(SimHead::default()),
            heat: Arc::new(Mutex::new(heat)),
            log: Arc::new(Mutex::new(Vec::new())),
            config,
        }
    }

    pub fn table(&self) -> SharedTable {
        Arc::clone(&self.table)
    }

    pub fn head(&self) -> Arc<SimHead> {
        Arc::clone(&self.head)
    }

    /// A camera looking at this playground's table.
    pub fn camera(&self) -> SimCamera {
        SimCamera {
            id: "sim_head_camera".to_string(),
            table: Arc::clone(&self.table),
        }
    }

    /// A [`RobotHandle`] whose drivers act on this playground.
    pub fn robot(&self) -> RobotHandle {
        RobotHandle::new(
            Box::new(SimMotion {
                table: Arc::clone(&self.table),
                arm: Arc::clone(&self.arm),
                heat: Arc::clone(&self.heat),
                heat_per_motion: self.config.heat_per_motion,
                log: Arc::clone(&self.log),
            }),
            self.head.clone(),
            self.arm.clone(),
            Box::new(SimThermal {
                heat: Arc::clone(&self.heat),
                cooling_per_read: self.config.cooling_per_read,
            }),
        )
    }

    /// Every motion played so far.
    pub fn motions(&self) -> Vec<Motion> {
        lock(&self.log).clone()
    }

    /// Force a motor temperature, e.g. to trigger a cooldown.
    pub fn set_temperature(&self, id: ActuatorId, degrees: f32) {
        lock(&self.heat).insert(id, degrees);
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
