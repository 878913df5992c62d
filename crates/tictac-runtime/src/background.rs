//! Auxiliary behaviors on worker threads, and the arbiter that keeps them off
//! the joints a choreography needs.
//!
//! A [`BackgroundTask`] is a `std::thread` worker with a [`CancelToken`] and a
//! completion channel.  [`BackgroundTask::stop`] cancels, waits for the
//! completion signal and joins; dropping a running task does the same, so a
//! behavior can never outlive its owner.
//!
//! [`JointArbiter`] owns the running [`Behavior`]s.  Before the controller
//! plays motions on shared joints it calls [`JointArbiter::with_exclusive`],
//! which stops every behavior claiming one of those joints, runs the
//! motions, and restarts the stopped behaviors.

use std::f32::consts::TAU;
use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError, mpsc};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use tictac_hal::{ArmState, HeadControl};
use tictac_types::{JointGroup, LookAt, PlaygroundError, Point3};
use tracing::{debug, info, warn};

// ────────────────────────────────────────────────────────────────────────────
// Cancellation
// ────────────────────────────────────────────────────────────────────────────

/// Shared cancellation flag.  Sleepers block on a condition variable and are
/// woken by [`CancelToken::cancel`].
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<(Mutex<bool>, Condvar)>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    fn flag(&self) -> MutexGuard<'_, bool> {
        self.0.0.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn cancel(&self) {
        *self.flag() = true;
        self.0.1.notify_all();
    }

    pub fn is_cancelled(&self) -> bool {
        *self.flag()
    }

    /// Sleep for up to `period`, waking early on cancellation.  Returns
    /// `true` when cancelled.
    pub fn sleep(&self, period: Duration) -> bool {
        let (cancelled, _) = self
            .0
            .1
            .wait_timeout_while(self.flag(), period, |cancelled| !*cancelled)
            .unwrap_or_else(PoisonError::into_inner);
        *cancelled
    }
}

// ────────────────────────────────────────────────────────────────────────────
// BackgroundTask
// ────────────────────────────────────────────────────────────────────────────

/// A cancellable worker thread.
#[derive(Debug)]
pub struct BackgroundTask {
    name: String,
    cancel: CancelToken,
    done: mpsc::Receiver<()>,
    join: Option<JoinHandle<()>>,
}

impl BackgroundTask {
    /// Run `work` on a new thread named `name`.
    ///
    /// # Errors
    ///
    /// Returns [`PlaygroundError::HardwareFault`] when the OS refuses to
    /// spawn the thread.
    pub fn spawn<F>(name: &str, work: F) -> Result<Self, PlaygroundError>
    where
        F: FnOnce(CancelToken) + Send + 'static,
    {
        let cancel = CancelToken::new();
        let cancel_for_thread = cancel.clone();
        let (tx, rx) = mpsc::channel::<()>();
        let join = thread::Builder::new()
            .name(name.to_string())
            .spawn(move || {
                work(cancel_for_thread);
                let _ = tx.send(());
            })
            .map_err(|e| PlaygroundError::HardwareFault {
                component: name.to_string(),
                details: format!("cannot spawn worker: {e}"),
            })?;
        debug!(task = name, "background task started");
        Ok(Self {
            name: name.to_string(),
            cancel,
            done: rx,
            join: Some(join),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// `true` once the worker has returned on its own.
    pub fn is_finished(&self) -> bool {
        self.join.as_ref().is_none_or(|j| j.is_finished())
    }

    /// Cancel the worker and wait until it has fully stopped.
    pub fn stop(mut self) {
        self.shutdown();
    }

    fn shutdown(&mut self) {
        let Some(join) = self.join.take() else {
            return;
        };
        self.cancel.cancel();
        // A panicking worker drops the sender; `recv` then returns at once.
        let _ = self.done.recv();
        if join.join().is_err() {
            warn!(task = %self.name, "background task panicked");
        }
        debug!(task = %self.name, "background task stopped");
    }
}

impl Drop for BackgroundTask {
    fn drop(&mut self) {
        self.shutdown();
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Behaviors
// ────────────────────────────────────────────────────────────────────────────

/// A long-running auxiliary animation.
pub trait Behavior: Send + Sync {
    fn name(&self) -> &'static str;

    /// Joint groups this behavior writes to.
    fn joints(&self) -> &'static [JointGroup];

    /// Run until `cancel` fires.
    fn run(&self, cancel: &CancelToken);
}

/// Sinusoidal antenna motion, used while the robot rests.
pub struct AntennaWiggle {
    head: Arc<dyn HeadControl>,
    pub amplitude_deg: f32,
    pub period: Duration,
    pub tick: Duration,
}

impl AntennaWiggle {
    pub fn new(head: Arc<dyn HeadControl>) -> Self {
        Self {
            head,
            amplitude_deg: 20.0,
            period: Duration::from_secs(4),
            tick: Duration::from_millis(50),
        }
    }
}

impl Behavior for AntennaWiggle {
    fn name(&self) -> &'static str {
        "antenna_wiggle"
    }

    fn joints(&self) -> &'static [JointGroup] {
        &[JointGroup::Antennas]
    }

    fn run(&self, cancel: &CancelToken) {
        let start = Instant::now();
        let period = self.period.as_secs_f32().max(f32::EPSILON);
        loop {
            let phase = TAU * start.elapsed().as_secs_f32() / period;
            let angle = self.amplitude_deg * phase.sin();
            if let Err(e) = self.head.set_antennas(angle, -angle) {
                warn!(error = %e, "antenna wiggle failed");
            }
            if cancel.sleep(self.tick) {
                break;
            }
        }
        if let Err(e) = self.head.set_antennas(0.0, 0.0) {
            warn!(error = %e, "antennas did not return to neutral");
        }
    }
}

/// Head tracking of the gripper while the arm places a piece.
pub struct FollowHand {
    head: Arc<dyn HeadControl>,
    arm: Arc<dyn ArmState>,
    /// Position of the head's pivot in the robot frame.
    pub head_origin: Point3,
    /// Shift applied to the hand so the head looks slightly ahead of it.
    pub offset: Point3,
    pub tick: Duration,
}

impl FollowHand {
    pub fn new(head: Arc<dyn HeadControl>, arm: Arc<dyn ArmState>) -> Self {
        Self {
            head,
            arm,
            head_origin: Point3::new(0.0, 0.0, 0.09),
            offset: Point3::new(0.1, 0.0, 0.1),
            tick: Duration::from_millis(10),
        }
    }

    /// Look-at target for a hand at `hand`.
    pub fn target(&self, hand: Point3) -> Point3 {
        hand - self.head_origin + self.offset
    }
}

impl Behavior for FollowHand {
    fn name(&self) -> &'static str {
        "follow_hand"
    }

    fn joints(&self) -> &'static [JointGroup] {
        &[JointGroup::Head]
    }

    fn run(&self, cancel: &CancelToken) {
        loop {
            match self.arm.end_effector_position() {
                Ok(hand) => match self.head.look_at(self.target(hand)) {
                    Ok(LookAt::Reached) => {}
                    // Hand outside the neck's cone; skip this frame.
                    Ok(LookAt::OutOfRange) => {}
                    Err(e) => debug!(error = %e, "follow-hand look_at failed"),
                },
                Err(e) => debug!(error = %e, "follow-hand could not read the arm"),
            }
            if cancel.sleep(self.tick) {
                break;
            }
        }
    }
}

/// Start `behavior` on its own [`BackgroundTask`].
pub fn spawn_behavior(behavior: Arc<dyn Behavior>) -> Result<BackgroundTask, PlaygroundError> {
    let name = behavior.name();
    BackgroundTask::spawn(name, move |cancel| behavior.run(&cancel))
}

// ────────────────────────────────────────────────────────────────────────────
// JointArbiter
// ────────────────────────────────────────────────────────────────────────────

struct Slot {
    behavior: Arc<dyn Behavior>,
    task: Option<BackgroundTask>,
}

/// Owner of the running auxiliary behaviors.
///
/// # Example
///
/// ```rust
/// use std::sync::Arc;
/// use tictac_hal::sim::{SimConfig, SimPlayground};
/// use tictac_runtime::background::{AntennaWiggle, JointArbiter};
/// use tictac_types::JointGroup;
///
/// let sim = SimPlayground::new(SimConfig::default());
/// let mut arbiter = JointArbiter::new();
/// arbiter.start(Arc::new(AntennaWiggle::new(sim.head()))).unwrap();
///
/// let running_during = arbiter.with_exclusive(&[JointGroup::Antennas], |a| a.running());
/// assert!(running_during.is_empty());
/// assert_eq!(arbiter.running(), vec!["antenna_wiggle"]);
/// arbiter.stop_all();
/// ```
#[derive(Default)]
pub struct JointArbiter {
    slots: Vec<Slot>,
}

impl JointArbiter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start `behavior`, first stopping and forgetting every registered
    /// behavior that claims one of its joints.
    ///
    /// # Errors
    ///
    /// Propagates a failure to spawn the worker thread.
    pub fn start(&mut self, behavior: Arc<dyn Behavior>) -> Result<(), PlaygroundError> {
        let claimed = behavior.joints();
        self.slots.retain_mut(|slot| {
            let conflicts = slot.behavior.joints().iter().any(|g| claimed.contains(g));
            if conflicts {
                if let Some(task) = slot.task.take() {
                    task.stop();
                }
            }
            !conflicts
        });
        let task = spawn_behavior(Arc::clone(&behavior))?;
        info!(behavior = behavior.name(), "auxiliary behavior started");
        self.slots.push(Slot {
            behavior,
            task: Some(task),
        });
        Ok(())
    }

    /// Stop and forget the behavior called `name`.
    pub fn stop(&mut self, name: &str) {
        self.slots.retain_mut(|slot| {
            if slot.behavior.name() != name {
                return true;
            }
            if let Some(task) = slot.task.take() {
                task.stop();
            }
            info!(behavior = name, "auxiliary behavior stopped");
            false
        });
    }

    pub fn stop_all(&mut self) {
        for slot in self.slots.drain(..) {
            if let Some(task) = slot.task {
                task.stop();
            }
        }
    }

    /// Names of the behaviors currently running.
    pub fn running(&self) -> Vec<&'static str> {
        self.slots
            .iter()
            .filter(|s| s.task.is_some())
            .map(|s| s.behavior.name())
            .collect()
    }

    /// Run `f` with exclusive use of `joints`.
    ///
    /// Behaviors claiming any of `joints` are stopped (and joined) before `f`
    /// runs and restarted afterwards.  A behavior that fails to restart is
    /// logged and dropped.
    pub fn with_exclusive<T>(&mut self, joints: &[JointGroup], f: impl FnOnce(&Self) -> T) -> T {
        let mut paused = Vec::new();
        for (i, slot) in self.slots.iter_mut().enumerate() {
            if slot.behavior.joints().iter().any(|g| joints.contains(g)) {
                if let Some(task) = slot.task.take() {
                    task.stop();
                    paused.push(i);
                }
            }
        }

        let out = f(self);

        for i in paused.into_iter().rev() {
            match spawn_behavior(Arc::clone(&self.slots[i].behavior)) {
                Ok(task) => self.slots[i].task = Some(task),
                Err(e) => {
                    warn!(behavior = self.slots[i].behavior.name(), error = %e, "could not resume behavior");
                    self.slots.remove(i);
                }
            }
        }
        out
    }
}

impl Drop for JointArbiter {
    fn drop(&mut self) {
        self.stop_all();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{CountingHead, FixedArm};
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

    #[test]
    fn stop_joins_the_worker() {
        let ticks = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&ticks);
        let task = BackgroundTask::spawn("counter", move |cancel| {
            while !cancel.sleep(Duration::from_millis(1)) {
                counter.fetch_add(1, Ordering::Relaxed);
            }
        })
        .unwrap();
        thread::sleep(Duration::from_millis(20));
        task.stop();
        let after_stop = ticks.load(Ordering::Relaxed);
        thread::sleep(Duration::from_millis(20));
        assert_eq!(ticks.load(Ordering::Relaxed), after_stop);
    }

    #[test]
    fn drop_stops_the_worker() {
        let flag = Arc::new(AtomicBool::new(false));
        let seen = Arc::clone(&flag);
        {
            let _task = BackgroundTask::spawn("dropper", move |cancel| {
                while !cancel.sleep(Duration::from_millis(1)) {}
                seen.store(true, Ordering::Relaxed);
            })
            .unwrap();
        }
        assert!(flag.load(Ordering::Relaxed));
    }

    #[test]
    fn panicking_worker_does_not_hang_stop() {
        let task = BackgroundTask::spawn("boom", |_| panic!("worker failure")).unwrap();
        task.stop();
    }

    #[test]
    fn cancel_token_sleep_wakes_early() {
        let token = CancelToken::new();
        token.cancel();
        let start = Instant::now();
        assert!(token.sleep(Duration::from_secs(5)));
        assert!(start.elapsed() < Duration::from_secs(1));
    }

    #[test]
    fn cancel_wakes_a_sleeping_worker() {
        let token = CancelToken::new();
        let sleeper = token.clone();
        let start = Instant::now();
        let worker = thread::spawn(move || sleeper.sleep(Duration::from_secs(30)));
        thread::sleep(Duration::from_millis(20));
        token.cancel();
        assert!(worker.join().unwrap());
        assert!(start.elapsed() < Duration::from_secs(5));
    }

    #[test]
    fn uncancelled_sleep_runs_out() {
        let token = CancelToken::new();
        assert!(!token.sleep(Duration::from_millis(10)));
        assert!(!token.is_cancelled());
    }

    #[test]
    fn follow_hand_targets_ahead_of_the_hand() {
        let head = Arc::new(CountingHead::default());
        let follow = FollowHand::new(head.clone(), Arc::new(FixedArm(Point3::new(0.3, -0.2, -0.3))));
        let t = follow.target(Point3::new(0.3, -0.2, -0.3));
        assert!((t.x - 0.4).abs() < 1e-6);
        assert!((t.z - (-0.29)).abs() < 1e-6);

        let task = spawn_behavior(Arc::new(follow)).unwrap();
        thread::sleep(Duration::from_millis(30));
        task.stop();
        assert!(!head.looks.lock().unwrap().is_empty());
    }

    #[test]
    fn follow_hand_skips_unreachable_targets() {
        let head = Arc::new(CountingHead::default());
        let follow = FollowHand::new(head.clone(), Arc::new(FixedArm(Point3::new(-0.5, 0.0, 0.0))));
        let task = spawn_behavior(Arc::new(follow)).unwrap();
        thread::sleep(Duration::from_millis(30));
        task.stop();
        assert!(head.looks.lock().unwrap().is_empty());
    }

    #[test]
    fn wiggle_returns_antennas_to_neutral() {
        let head = Arc::new(CountingHead::default());
        let mut wiggle = AntennaWiggle::new(head.clone());
        wiggle.tick = Duration::from_millis(1);
        let task = spawn_behavior(Arc::new(wiggle)).unwrap();
        thread::sleep(Duration::from_millis(20));
        task.stop();
        let antennas = head.antennas.lock().unwrap();
        assert!(antennas.len() > 1);
        assert_eq!(antennas.last(), Some(&(0.0, 0.0)));
    }

    #[test]
    fn exclusive_section_pauses_only_conflicting_behaviors() {
        let head = Arc::new(CountingHead::default());
        let arm = Arc::new(FixedArm(Point3::new(0.3, 0.0, -0.3)));
        let mut arbiter = JointArbiter::new();
        arbiter.start(Arc::new(AntennaWiggle::new(head.clone()))).unwrap();
        arbiter.start(Arc::new(FollowHand::new(head, arm))).unwrap();

        let during = arbiter.with_exclusive(&[JointGroup::Head], |a| a.running());
        assert_eq!(during, vec!["antenna_wiggle"]);

        let mut after = arbiter.running();
        after.sort();
        assert_eq!(after, vec!["antenna_wiggle", "follow_hand"]);
        arbiter.stop_all();
        assert!(arbiter.running().is_empty());
    }

    #[test]
    fn starting_a_behavior_replaces_joint_owner() {
        let head = Arc::new(CountingHead::default());
        let mut arbiter = JointArbiter::new();
        arbiter.start(Arc::new(AntennaWiggle::new(head.clone()))).unwrap();
        arbiter.start(Arc::new(AntennaWiggle::new(head))).unwrap();
        assert_eq!(arbiter.running(), vec!["antenna_wiggle"]);
        arbiter.stop("antenna_wiggle");
        assert!(arbiter.running().is_empty());
    }
}
