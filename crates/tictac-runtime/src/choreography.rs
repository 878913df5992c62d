//! Choreography composition.
//!
//! A [`Choreography`] is a small tree of named [`Motion`]s played against a
//! [`MotionExecutor`].  The game controller never strings motions together
//! by hand; it builds one of these and plays it.
//!
//! | Node | Description |
//! |---|---|
//! | [`Step`][Choreography::Step] | Plays one motion. |
//! | [`Sequence`][Choreography::Sequence] | Plays children in order; stops on the first failure. |
//! | [`BestEffort`][Choreography::BestEffort] | Plays its child; a failure is logged and swallowed. |
//!
//! # Example
//!
//! ```rust
//! use tictac_runtime::choreography::Choreography;
//! use tictac_types::Motion;
//!
//! let place = Choreography::place_piece(2, 4);
//! assert_eq!(place.motions().first(), Some(&Motion::Base));
//! assert!(place.motions().contains(&Motion::Put(4)));
//! ```

use tictac_hal::MotionExecutor;
use tictac_types::{JointGroup, Motion, PlaygroundError};
use tracing::{debug, warn};

/// A composable motion program.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Choreography {
    Step(Motion),
    Sequence(Vec<Choreography>),
    BestEffort(Box<Choreography>),
}

impl Choreography {
    pub fn step(motion: Motion) -> Self {
        Choreography::Step(motion)
    }

    pub fn sequence(children: Vec<Choreography>) -> Self {
        Choreography::Sequence(children)
    }

    pub fn best_effort(child: Choreography) -> Self {
        Choreography::BestEffort(Box::new(child))
    }

    /// Carry the piece waiting in grab `slot` (1-based) to board `cell`.
    pub fn place_piece(slot: u8, cell: usize) -> Self {
        Choreography::sequence(
            [
                Motion::Base,
                Motion::Grab(slot),
                Motion::GripperClose,
                Motion::Lift,
                Motion::Put(cell),
                Motion::GripperOpen,
                Motion::BackUpright(cell),
                Motion::Lift,
                Motion::Rest,
            ]
            .into_iter()
            .map(Choreography::step)
            .collect(),
        )
    }

    /// Every motion in play order.
    pub fn motions(&self) -> Vec<Motion> {
        let mut out = Vec::new();
        self.collect_motions(&mut out);
        out
    }

    fn collect_motions(&self, out: &mut Vec<Motion>) {
        match self {
            Choreography::Step(m) => out.push(*m),
            Choreography::Sequence(children) => {
                children.iter().for_each(|c| c.collect_motions(out))
            }
            Choreography::BestEffort(child) => child.collect_motions(out),
        }
    }

    /// Union of the joint groups driven by any step.
    pub fn joints(&self) -> Vec<JointGroup> {
        let mut groups: Vec<JointGroup> = Vec::new();
        for m in self.motions() {
            for g in m.joints() {
                if !groups.contains(g) {
                    groups.push(*g);
                }
            }
        }
        groups
    }

    /// Play the program to completion.
    ///
    /// # Errors
    ///
    /// Returns the error of the first failing step outside a
    /// [`BestEffort`][Choreography::BestEffort] node.
    pub fn play(&self, executor: &mut dyn MotionExecutor) -> Result<(), PlaygroundError> {
        match self {
            Choreography::Step(m) => {
                debug!(motion = %m, "playing motion");
                executor.execute(m)
            }
            Choreography::Sequence(children) => {
                for child in children {
                    child.play(executor)?;
                }
                Ok(())
            }
            Choreography::BestEffort(child) => {
                if let Err(e) = child.play(executor) {
                    warn!(error = %e, "best-effort motion failed; continuing");
                }
                Ok(())
            }
        }
    }
}
