//! [`GameController`] – the game orchestration state machine.
//!
//! One game runs through these states:
//!
//! ```text
//! AwaitClearBoard ─► CoinFlip ─┬─► RobotTurnIntro ─► Polling(Robot) ◄─┐
//!                              └─► HumanTurnIntro ─► Polling(Human) ◄─┤
//!                                                      │    └─────────┘
//!                                                      ├─► Terminal(winner)
//!                                                      └─► Reset
//! ```
//!
//! Each [`GameController::step`] call performs exactly one transition.  A
//! polling step:
//!
//! 1. **Observe** – unavailable, invalid or incoherent boards change nothing.
//! 2. **Human turn** – a new cube hands the turn to the robot; otherwise an
//!    idle behavior is played.
//! 3. **Cheat check** – a suspicious delta is re-observed once; only a
//!    reproduced delta shuffles the board and ends the game in `Reset`.
//! 4. **Robot turn** – the [`MoveSelector`] picks a cell and the place-piece
//!    choreography is played.
//! 5. **Final board** – exactly one of celebrate / defeat / draw is played
//!    and the game ends in `Terminal`.
//!
//! Perception problems are retried forever.  A camera that stays silent for
//! longer than the configured timeout is fatal
//! ([`PlaygroundError::CameraStalled`]).
//!
//! # Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use std::path::Path;
//! use tictac_hal::sim::{SimConfig, SimPlayground};
//! use tictac_perception::{CellLayout, ShadeClassifier, VisionObserver};
//! use tictac_runtime::controller::{GameController, GameControllerConfig};
//! use tictac_runtime::value_table::ActionValueTable;
//!
//! let table = Arc::new(ActionValueTable::load(Path::new("data/q_values.json")).unwrap());
//! let sim = SimPlayground::new(SimConfig::default());
//! let observer = VisionObserver::new(sim.camera(), ShadeClassifier, CellLayout::grid(1, 1));
//! let mut controller = GameController::new(
//!     sim.robot(),
//!     Box::new(observer),
//!     table,
//!     GameControllerConfig::default(),
//! );
//! let summary = controller.play_one_game().unwrap();
//! println!("game {} won by {:?}", summary.game_number, summary.winner);
//! ```

use std::convert::Infallible;
use std::fmt;
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tictac_hal::{ArmState, HeadControl, MotionExecutor, RobotHandle};
use tictac_kernel::{BoardValidator, CheatDetector, ComponentHealth, Delta, ThermalPolicy, Watchdog};
use tictac_perception::{BoardObserver, Observation};
use tictac_types::{
    Board, Cell, GameSummary, JointGroup, Motion, Player, PlaygroundError, Winner,
};
use tracing::{debug, error, info, instrument, warn};
use uuid::Uuid;

use crate::background::{FollowHand, JointArbiter};
use crate::choreography::Choreography;
use crate::idle::IdleBehaviorScheduler;
use crate::move_selector::MoveSelector;
use crate::thermal::ThermalSupervisor;
use crate::value_table::ActionValueTable;

/// Watchdog component id of the board camera.
const CAMERA: &str = "camera";

// ─────────────────────────────────────────────────────────────────────────────
// Configuration
// ─────────────────────────────────────────────────────────────────────────────

/// Tunables of the [`GameController`].
#[derive(Debug, Clone)]
pub struct GameControllerConfig {
    /// Re-observe once before acting on a cheating suspicion.
    pub double_check: bool,
    /// Track the hand with the head while placing a piece.
    pub follow_hand: bool,
    /// Skip the coin flip (demos, tests).
    pub first_player: Option<Player>,
    /// Seed for every random choice; `None` seeds from the OS.
    pub seed: Option<u64>,
    /// Pause after each idle behavior.
    pub idle_pause: Duration,
    /// Maximum camera silence before [`PlaygroundError::CameraStalled`].
    pub camera_timeout: Duration,
    /// Delay before the cheat re-observation.
    pub recheck_delay: Duration,
    /// Temperature poll period while cooling down.
    pub cooldown_poll_interval: Duration,
    pub thermal_policy: ThermalPolicy,
}

impl Default for GameControllerConfig {
    fn default() -> Self {
        Self {
            double_check: true,
            follow_hand: true,
            first_player: None,
            seed: None,
            idle_pause: Duration::from_secs(5),
            camera_timeout: Duration::from_secs(30),
            recheck_delay: Duration::from_secs(1),
            cooldown_poll_interval: Duration::from_secs(30),
            thermal_policy: ThermalPolicy::default(),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// State
// ─────────────────────────────────────────────────────────────────────────────

/// Controller state; see the module docs for the transitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameState {
    AwaitClearBoard,
    CoinFlip,
    RobotTurnIntro,
    HumanTurnIntro,
    Polling(Player),
    Terminal(Winner),
    /// Game abandoned after a confirmed cheat.
    Reset,
}

impl fmt::Display for GameState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GameState::AwaitClearBoard => write!(f, "await_clear_board"),
            GameState::CoinFlip => write!(f, "coin_flip"),
            GameState::RobotTurnIntro => write!(f, "robot_turn_intro"),
            GameState::HumanTurnIntro => write!(f, "human_turn_intro"),
            GameState::Polling(p) => write!(f, "polling({p})"),
            GameState::Terminal(w) => write!(f, "terminal({w})"),
            GameState::Reset => write!(f, "reset"),
        }
    }
}

/// How a game ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameOutcome {
    Finished(Winner),
    Reset,
}

/// Book-keeping of the game in progress.
#[derive(Debug, Clone)]
pub struct GameSession {
    pub id: Uuid,
    pub started_at: DateTime<Utc>,
    /// Latest accepted observation.
    pub board: Board,
    /// Baseline for delta comparisons: the board as the robot last left it.
    pub last_board: Board,
    pub turn: Player,
    /// Robot pieces placed so far; the next one is taken from grab slot
    /// `pieces_played + 1`.
    pub pieces_played: u8,
    pub winner: Option<Winner>,
}

impl GameSession {
    fn new() -> Self {
        Self {
            id: Uuid::new_v4(),
            started_at: Utc::now(),
            board: Board::empty(),
            last_board: Board::empty(),
            turn: Player::Human,
            pieces_played: 0,
            winner: None,
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// GameController
// ─────────────────────────────────────────────────────────────────────────────

/// Plays tic-tac-toe games on a physical (or simulated) playground.
pub struct GameController {
    observer: Box<dyn BoardObserver>,
    motion: Box<dyn MotionExecutor>,
    head: Arc<dyn HeadControl>,
    arm: Arc<dyn ArmState>,
    selector: MoveSelector,
    idle: IdleBehaviorScheduler,
    thermal: ThermalSupervisor,
    arbiter: JointArbiter,
    watchdog: Watchdog,
    rng: StdRng,
    config: GameControllerConfig,
    state: GameState,
    session: GameSession,
    games_played: u64,
}

impl GameController {
    /// Take ownership of the robot and wire up every collaborator.
    pub fn new(
        robot: RobotHandle,
        observer: Box<dyn BoardObserver>,
        table: Arc<ActionValueTable>,
        config: GameControllerConfig,
    ) -> Self {
        let mut rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        let selector = MoveSelector::new(table, StdRng::seed_from_u64(rng.random()));
        let idle = IdleBehaviorScheduler::new(config.idle_pause, StdRng::seed_from_u64(rng.random()));

        let RobotHandle {
            motion,
            head,
            arm,
            thermal,
        } = robot;
        let thermal = ThermalSupervisor::new(
            thermal,
            Arc::clone(&head),
            config.thermal_policy,
            config.cooldown_poll_interval,
        );

        let mut watchdog = Watchdog::new();
        watchdog.register(CAMERA, config.camera_timeout);

        Self {
            observer,
            motion,
            head,
            arm,
            selector,
            idle,
            thermal,
            arbiter: JointArbiter::new(),
            watchdog,
            rng,
            config,
            state: GameState::AwaitClearBoard,
            session: GameSession::new(),
            games_played: 0,
        }
    }

    pub fn state(&self) -> GameState {
        self.state
    }

    pub fn session(&self) -> &GameSession {
        &self.session
    }

    pub fn games_played(&self) -> u64 {
        self.games_played
    }

    /// Neutral antennas and the arm at rest.
    ///
    /// # Errors
    ///
    /// Propagates a failure of the rest motion.
    pub fn setup(&mut self) -> Result<(), PlaygroundError> {
        info!("setting up the playground");
        if let Err(e) = self.head.set_antennas(0.0, 0.0) {
            warn!(error = %e, "could not centre the antennas");
        }
        self.play(&Choreography::step(Motion::Rest))
    }

    // ── State machine ────────────────────────────────────────────────────────

    /// Perform one transition and return the new state.
    ///
    /// # Errors
    ///
    /// Returns [`PlaygroundError::CameraStalled`] when the camera went
    /// silent, a failed place-piece choreography, or
    /// [`PlaygroundError::NoLegalMove`] on an inconsistent move request.
    pub fn step(&mut self) -> Result<GameState, PlaygroundError> {
        let next = match self.state {
            GameState::AwaitClearBoard => self.await_clear_board()?,
            GameState::CoinFlip => self.coin_flip(),
            GameState::RobotTurnIntro => {
                self.play_best_effort(Motion::AnnounceRobotFirst);
                GameState::Polling(Player::Robot)
            }
            GameState::HumanTurnIntro => {
                self.play_best_effort(Motion::AnnounceHumanFirst);
                GameState::Polling(Player::Human)
            }
            GameState::Polling(_) => self.poll()?,
            terminal @ (GameState::Terminal(_) | GameState::Reset) => terminal,
        };
        if next != self.state {
            debug!(from = %self.state, to = %next, "state transition");
        }
        self.state = next;
        Ok(next)
    }

    /// Play one game from a cleared board to its end.
    #[instrument(skip(self), fields(game = self.games_played + 1))]
    pub fn run_game_loop(&mut self) -> Result<GameOutcome, PlaygroundError> {
        self.state = GameState::AwaitClearBoard;
        // The camera may legitimately have been idle between games.
        self.watchdog.register(CAMERA, self.config.camera_timeout);
        loop {
            match self.step()? {
                GameState::Terminal(winner) => return Ok(GameOutcome::Finished(winner)),
                GameState::Reset => return Ok(GameOutcome::Reset),
                _ => {}
            }
        }
    }

    /// Play a game, log its summary and cool down if needed.
    pub fn play_one_game(&mut self) -> Result<GameSummary, PlaygroundError> {
        let outcome = self.run_game_loop()?;
        self.games_played += 1;

        let summary = GameSummary {
            session_id: self.session.id,
            game_number: self.games_played,
            winner: match outcome {
                GameOutcome::Finished(w) => Some(w),
                GameOutcome::Reset => None,
            },
            robot_pieces: self.session.pieces_played,
            started_at: self.session.started_at,
            finished_at: Utc::now(),
        };
        info!(
            game = summary.game_number,
            winner = ?summary.winner,
            summary = %serde_json::to_string(&summary).unwrap_or_default(),
            "game {} ended",
            summary.game_number
        );

        if self.thermal.needs_cooldown() {
            warn!("robot needs a cooldown");
            let thermal = &mut self.thermal;
            let motion = &mut self.motion;
            self.arbiter.with_exclusive(
                &[JointGroup::Arm, JointGroup::Head, JointGroup::Antennas],
                |_| thermal.wait_for_cooldown(&mut **motion),
            );
        }
        Ok(summary)
    }

    /// Play games until an unrecoverable error occurs.
    pub fn run_forever(&mut self) -> Result<Infallible, PlaygroundError> {
        loop {
            self.play_one_game()?;
        }
    }

    // ── States ───────────────────────────────────────────────────────────────

    fn await_clear_board(&mut self) -> Result<GameState, PlaygroundError> {
        match self.observe()? {
            Some(board) if board.is_empty() => {
                self.session = GameSession::new();
                info!(session = %self.session.id, "board is clear; starting a new game");
                Ok(GameState::CoinFlip)
            }
            board => {
                info!(board = ?board.map(|b| b.to_string()), "waiting for the board to be cleared");
                self.run_idle();
                Ok(GameState::AwaitClearBoard)
            }
        }
    }

    fn coin_flip(&mut self) -> GameState {
        let first = self.config.first_player.unwrap_or_else(|| {
            if self.rng.random_bool(0.5) {
                Player::Robot
            } else {
                Player::Human
            }
        });
        info!(first_player = %first, "coin flip");
        self.session.turn = first;
        match first {
            Player::Robot => GameState::RobotTurnIntro,
            Player::Human => GameState::HumanTurnIntro,
        }
    }

    fn poll(&mut self) -> Result<GameState, PlaygroundError> {
        let accepted_turn = self.session.turn;
        let unchanged = GameState::Polling(accepted_turn);

        // 1. Observe
        let Some(board) = self.observe()? else {
            return Ok(unchanged);
        };
        let last = self.session.last_board;
        if BoardValidator::incoherent(&board) {
            // A count mismatch that survives the re-observation is a real
            // cheat, not a misread.
            if CheatDetector::cheating(&board, &last, false) && self.confirm_cheat(&board, &last)? {
                return Ok(self.reset());
            }
            warn!(board = %board, "incoherent board discarded");
            return Ok(unchanged);
        }

        // 2. Human turn
        let mut turn = accepted_turn;
        if turn == Player::Human {
            if board.has_human_played(&last) {
                info!(board = %board, "human has played");
                turn = Player::Robot;
            } else {
                self.run_idle();
            }
        }

        // 3. Cheat check
        if CheatDetector::cheating(&board, &last, turn == Player::Robot) {
            if self.confirm_cheat(&board, &last)? {
                return Ok(self.reset());
            }
            return Ok(unchanged);
        }
        self.session.board = board;
        self.session.turn = turn;

        // 4. Robot turn
        let mut board = board;
        if turn == Player::Robot && !board.is_final() {
            let chosen = self.selector.choose(&board, Player::Robot)?;
            self.place_piece(chosen.cell)?;
            board = board.with_move(chosen.cell, Cell::Robot);
            info!(board = %board, cell = chosen.cell, pieces = self.session.pieces_played, "robot played");
            self.session.board = board;
            self.session.last_board = board;
            self.session.turn = Player::Human;
        }

        // 5. Final board
        if board.is_final() {
            return Ok(self.finish(&board));
        }
        Ok(GameState::Polling(self.session.turn))
    }

    fn finish(&mut self, board: &Board) -> GameState {
        let winner = board.winner();
        info!(winner = %winner, board = %board, session = %self.session.id, "game over");
        let behavior = match winner {
            Winner::Robot => Motion::Celebrate,
            Winner::Human => Motion::Defeat,
            Winner::Nobody => Motion::Draw,
        };
        self.play_best_effort(behavior);
        self.session.winner = Some(winner);
        GameState::Terminal(winner)
    }

    fn reset(&mut self) -> GameState {
        self.play_best_effort(Motion::Shuffle);
        info!(session = %self.session.id, "game reset after cheating");
        GameState::Reset
    }

    // ── Helpers ──────────────────────────────────────────────────────────────

    /// One perception attempt.  `Ok(None)` means "nothing usable this time".
    fn observe(&mut self) -> Result<Option<Board>, PlaygroundError> {
        match self.observer.observe_board() {
            Ok(observation) => {
                self.watchdog.heartbeat(CAMERA);
                match observation {
                    Observation::Board(board) => Ok(Some(board)),
                    Observation::Invalid => {
                        debug!("invalid board observation");
                        Ok(None)
                    }
                }
            }
            Err(e @ PlaygroundError::Config(_)) => {
                error!(error = %e, "observer misconfigured");
                Err(e)
            }
            Err(e) => {
                let now = Instant::now();
                if self.watchdog.health_at(CAMERA, now) == ComponentHealth::TimedOut {
                    let silent_for = self
                        .watchdog
                        .silent_for_at(CAMERA, now)
                        .unwrap_or(self.config.camera_timeout);
                    error!(error = %e, ?silent_for, "camera stalled");
                    return Err(PlaygroundError::CameraStalled { silent_for });
                }
                warn!(error = %e, "board observation failed");
                Ok(None)
            }
        }
    }

    /// Re-observe a suspicious board.  `true` when the same delta shows up
    /// again (or double-checking is disabled).
    fn confirm_cheat(&mut self, board: &Board, last: &Board) -> Result<bool, PlaygroundError> {
        let delta = Delta::between(last, board);
        warn!(board = %board, last = %last, changed = delta.len(), "possible cheating detected");
        if !self.config.double_check {
            return Ok(true);
        }
        if !self.config.recheck_delay.is_zero() {
            thread::sleep(self.config.recheck_delay);
        }
        match self.observe()? {
            Some(again) if Delta::between(last, &again) == delta => {
                warn!(board = %again, "cheating confirmed");
                Ok(true)
            }
            again => {
                info!(board = ?again.map(|b| b.to_string()), "cheating not reproduced; ignoring the first reading");
                Ok(false)
            }
        }
    }

    fn place_piece(&mut self, cell: usize) -> Result<(), PlaygroundError> {
        let slot = self.session.pieces_played + 1;
        info!(slot, cell, "placing a piece");
        if self.config.follow_hand {
            let follow = FollowHand::new(Arc::clone(&self.head), Arc::clone(&self.arm));
            if let Err(e) = self.arbiter.start(Arc::new(follow)) {
                warn!(error = %e, "follow-hand unavailable");
            }
        }
        let result = self.play(&Choreography::place_piece(slot, cell));
        if self.config.follow_hand {
            self.arbiter.stop("follow_hand");
        }
        result?;
        self.session.pieces_played = slot;
        Ok(())
    }

    fn run_idle(&mut self) {
        if let Some(motion) = self.idle.pick().motion() {
            self.play_best_effort(motion);
        }
        self.idle.rest();
    }

    /// Play `choreography` with exclusive use of its joints.
    fn play(&mut self, choreography: &Choreography) -> Result<(), PlaygroundError> {
        let joints = choreography.joints();
        let motion = &mut self.motion;
        self.arbiter
            .with_exclusive(&joints, |_| choreography.play(&mut **motion))
    }

    fn play_best_effort(&mut self, motion: Motion) {
        if let Err(e) = self.play(&Choreography::step(motion)) {
            warn!(motion = %motion, error = %e, "behavior failed; continuing");
        }
    }
}
