//! Test doubles shared by the runtime's unit tests.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, OnceLock};

use tictac_hal::{ArmState, HeadControl, MotionExecutor, RobotHandle, TemperatureSensor};
use tictac_perception::{BoardObserver, Observation};
use tictac_types::{
    Board, Cell, LookAt, Motion, Player, PlaygroundError, Point3, TemperatureReading, Winner,
};

use crate::value_table::{ActionValueTable, TABLE_LEN};

// ── Minimax value table ─────────────────────────────────────────────────────

fn board_at(index: usize) -> Board {
    let mut codes = [0u8; 9];
    let mut rest = index;
    for code in codes.iter_mut().rev() {
        *code = (rest % 3) as u8;
        rest /= 3;
    }
    Board::from_codes(codes).unwrap()
}

fn solve(board: Board, to_move: Player, memo: &mut [Vec<Option<f32>>; 2]) -> f32 {
    let slot = to_move as usize;
    let idx = board.value_index();
    if let Some(v) = memo[slot][idx] {
        return v;
    }
    let empties = board.count(Cell::Empty) as f32;
    let value = match board.winner() {
        Winner::Human => (1.0 + empties) / 10.0,
        Winner::Robot => -(1.0 + empties) / 10.0,
        Winner::Nobody if empties == 0.0 => 0.0,
        Winner::Nobody => {
            let children: Vec<f32> = board
                .empty_cells()
                .collect::<Vec<_>>()
                .into_iter()
                .map(|c| solve(board.with_move(c, to_move.piece()), to_move.opponent(), memo))
                .collect();
            if to_move.is_maximizing() {
                children.into_iter().fold(f32::MIN, f32::max)
            } else {
                children.into_iter().fold(f32::MAX, f32::min)
            }
        }
    };
    memo[slot][idx] = Some(value);
    value
}

/// Perfect-play value table: each row is the minimax value of the board
/// with the other mark to move.
pub fn minimax_table() -> Arc<ActionValueTable> {
    static TABLE: OnceLock<Arc<ActionValueTable>> = OnceLock::new();
    TABLE
        .get_or_init(|| {
            let mut memo = [vec![None; TABLE_LEN], vec![None; TABLE_LEN]];
            let mut x = Vec::with_capacity(TABLE_LEN);
            let mut o = Vec::with_capacity(TABLE_LEN);
            for i in 0..TABLE_LEN {
                let board = board_at(i);
                x.push(solve(board, Player::Robot, &mut memo));
                o.push(solve(board, Player::Human, &mut memo));
            }
            Arc::new(ActionValueTable::from_tables(x, o).unwrap())
        })
        .clone()
}

pub fn board(codes: [u8; 9]) -> Board {
    Board::from_codes(codes).unwrap()
}

// ── Observer ────────────────────────────────────────────────────────────────

/// Replays a script of observations; repeats the last one when exhausted.
pub struct ScriptedObserver {
    script: VecDeque<Result<Observation, PlaygroundError>>,
    last: Observation,
    pub calls: Arc<Mutex<usize>>,
}

impl ScriptedObserver {
    pub fn new(boards: impl IntoIterator<Item = Observation>) -> Self {
        Self {
            script: boards.into_iter().map(Ok).collect(),
            last: Observation::Invalid,
            calls: Arc::new(Mutex::new(0)),
        }
    }

    pub fn boards(boards: impl IntoIterator<Item = Board>) -> Self {
        Self::new(boards.into_iter().map(Observation::Board))
    }

    pub fn push_err(&mut self, err: PlaygroundError) {
        self.script.push_back(Err(err));
    }
}

impl BoardObserver for ScriptedObserver {
    fn observe_board(&mut self) -> Result<Observation, PlaygroundError> {
        *self.calls.lock().unwrap() += 1;
        match self.script.pop_front() {
            Some(Ok(obs)) => {
                self.last = obs;
                Ok(obs)
            }
            Some(Err(e)) => Err(e),
            None => Ok(self.last),
        }
    }
}

// ── Motion ──────────────────────────────────────────────────────────────────

/// Records every motion; optionally fails one of them.
#[derive(Clone, Default)]
pub struct RecordingExecutor {
    pub played: Arc<Mutex<Vec<Motion>>>,
    pub failing: Option<Motion>,
}

impl RecordingExecutor {
    pub fn failing_on(motion: Motion) -> Self {
        Self {
            failing: Some(motion),
            ..Self::default()
        }
    }

    pub fn played(&self) -> Vec<Motion> {
        self.played.lock().unwrap().clone()
    }

    pub fn count(&self, motion: Motion) -> usize {
        self.played().iter().filter(|m| **m == motion).count()
    }
}

impl MotionExecutor for RecordingExecutor {
    fn execute(&mut self, motion: &Motion) -> Result<(), PlaygroundError> {
        self.played.lock().unwrap().push(*motion);
        if self.failing == Some(*motion) {
            return Err(PlaygroundError::MotionFailed {
                motion: motion.name(),
                details: "scripted failure".to_string(),
            });
        }
        Ok(())
    }
}

// ── Thermal ─────────────────────────────────────────────────────────────────

/// Replays temperature snapshots; repeats the last one when exhausted.
pub struct ScriptedSensor {
    readings: VecDeque<TemperatureReading>,
    last: TemperatureReading,
    pub reads: Arc<Mutex<usize>>,
}

impl ScriptedSensor {
    pub fn new(readings: impl IntoIterator<Item = TemperatureReading>) -> Self {
        Self {
            readings: readings.into_iter().collect(),
            last: TemperatureReading::new(),
            reads: Arc::new(Mutex::new(0)),
        }
    }
}

impl TemperatureSensor for ScriptedSensor {
    fn read_temperatures(&mut self) -> Result<TemperatureReading, PlaygroundError> {
        *self.reads.lock().unwrap() += 1;
        if let Some(r) = self.readings.pop_front() {
            self.last = r;
        }
        Ok(self.last.clone())
    }
}

// ── Head / arm ──────────────────────────────────────────────────────────────

#[derive(Default)]
pub struct CountingHead {
    pub looks: Mutex<Vec<Point3>>,
    pub antennas: Mutex<Vec<(f32, f32)>>,
}

impl HeadControl for CountingHead {
    fn look_at(&self, target: Point3) -> Result<LookAt, PlaygroundError> {
        if target.x <= 0.0 {
            return Ok(LookAt::OutOfRange);
        }
        self.looks.lock().unwrap().push(target);
        Ok(LookAt::Reached)
    }

    fn set_antennas(&self, left_deg: f32, right_deg: f32) -> Result<(), PlaygroundError> {
        self.antennas.lock().unwrap().push((left_deg, right_deg));
        Ok(())
    }
}

pub struct FixedArm(pub Point3);

impl ArmState for FixedArm {
    fn end_effector_position(&self) -> Result<Point3, PlaygroundError> {
        Ok(self.0)
    }
}

/// A robot handle around `motion` with a cool, silent body.
pub fn robot(motion: RecordingExecutor) -> RobotHandle {
    RobotHandle::new(
        Box::new(motion),
        Arc::new(CountingHead::default()),
        Arc::new(FixedArm(Point3::new(0.4, -0.2, -0.3))),
        Box::new(ScriptedSensor::new([TemperatureReading::new()])),
    )
}

#[test]
fn minimax_values_are_sane() {
    let table = minimax_table();
    // Perfect play from the empty board is a draw.
    let corner = Board::empty().with_move(0, Cell::Human);
    assert_eq!(table.value(Player::Human, &corner), 0.0);
    // Completing a line wins immediately.
    let won = board([2, 2, 2, 1, 1, 0, 0, 0, 0]);
    assert!(table.value(Player::Robot, &won) < -0.4);
}
