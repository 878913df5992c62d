//! [`IdleBehaviorScheduler`] – what the robot does while it waits.

use std::thread;
use std::time::Duration;

use rand::rngs::StdRng;
use rand::seq::IndexedRandom;
use tictac_types::{IdleMotion, Motion};
use tracing::info;

/// One idle variant.  [`IdleVariant::Pause`] keeps the robot still.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IdleVariant {
    LookAround,
    AntennaTwitch,
    GlanceAtHuman,
    Pause,
}

impl IdleVariant {
    pub const ALL: [IdleVariant; 4] = [
        IdleVariant::LookAround,
        IdleVariant::AntennaTwitch,
        IdleVariant::GlanceAtHuman,
        IdleVariant::Pause,
    ];

    /// The motion to dispatch, if any.
    pub fn motion(self) -> Option<Motion> {
        match self {
            IdleVariant::LookAround => Some(Motion::Idle(IdleMotion::LookAround)),
            IdleVariant::AntennaTwitch => Some(Motion::Idle(IdleMotion::AntennaTwitch)),
            IdleVariant::GlanceAtHuman => Some(Motion::Idle(IdleMotion::GlanceAtHuman)),
            IdleVariant::Pause => None,
        }
    }
}

/// Uniform random choice among the configured idle variants, followed by a
/// fixed pause.
pub struct IdleBehaviorScheduler {
    variants: Vec<IdleVariant>,
    pause: Duration,
    rng: StdRng,
}

impl IdleBehaviorScheduler {
    pub fn new(pause: Duration, rng: StdRng) -> Self {
        Self {
            variants: IdleVariant::ALL.to_vec(),
            pause,
            rng,
        }
    }

    /// Restrict the choice to `variants`.  An empty list means "always pause".
    pub fn with_variants(mut self, variants: Vec<IdleVariant>) -> Self {
        self.variants = variants;
        self
    }

    /// Draw the next idle variant.
    pub fn pick(&mut self) -> IdleVariant {
        let variant = self
            .variants
            .choose(&mut self.rng)
            .copied()
            .unwrap_or(IdleVariant::Pause);
        info!(variant = ?variant, "playing a random idle behavior");
        variant
    }

    /// Wait out the idle interval.
    pub fn rest(&self) {
        if !self.pause.is_zero() {
            thread::sleep(self.pause);
        }
    }
}
