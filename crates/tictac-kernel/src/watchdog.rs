//! [`Watchdog`] – component health monitor.
//!
//! Components that are expected to produce data regularly (the head camera
//! in particular) are registered with a timeout.  Every successful read
//! calls [`Watchdog::heartbeat`]; a component that stays silent longer than
//! its timeout is reported as [`ComponentHealth::TimedOut`] so the caller can
//! escalate.
//!
//! All queries have an `*_at(now)` variant taking an explicit [`Instant`] so
//! that supervision logic can be tested without sleeping.

use std::collections::HashMap;
use std::time::{Duration, Instant};

// ────────────────────────────────────────────────────────────────────────────
// Public types
// ────────────────────────────────────────────────────────────────────────────

/// Health state reported for a single component.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ComponentHealth {
    /// The component has sent a heartbeat within its deadline.
    Healthy,
    /// The component has not sent a heartbeat within its deadline.
    TimedOut,
}

struct ComponentEntry {
    last_heartbeat: Instant,
    timeout: Duration,
}

// ────────────────────────────────────────────────────────────────────────────
// Watchdog
// ────────────────────────────────────────────────────────────────────────────

/// Tracks heartbeats from registered components and detects silent ones.
///
/// # Example
///
/// ```
/// use std::time::{Duration, Instant};
/// use tictac_kernel::watchdog::{ComponentHealth, Watchdog};
///
/// let start = Instant::now();
/// let mut wd = Watchdog::new();
/// wd.register_at("camera", Duration::from_secs(30), start);
///
/// assert_eq!(wd.health_at("camera", start + Duration::from_secs(10)), ComponentHealth::Healthy);
/// assert_eq!(wd.health_at("camera", start + Duration::from_secs(31)), ComponentHealth::TimedOut);
/// ```
#[derive(Default)]
pub struct Watchdog {
    components: HashMap<String, ComponentEntry>,
}

impl Watchdog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `component_id` with a maximum silence of `timeout`, starting
    /// now.  Re-registering resets the deadline.
    pub fn register(&mut self, component_id: &str, timeout: Duration) {
        self.register_at(component_id, timeout, Instant::now());
    }

    pub fn register_at(&mut self, component_id: &str, timeout: Duration, now: Instant) {
        self.components.insert(
            component_id.to_string(),
            ComponentEntry {
                last_heartbeat: now,
                timeout,
            },
        );
    }

    /// Record a heartbeat for `component_id`.  No-op for unknown components.
    pub fn heartbeat(&mut self, component_id: &str) {
        self.heartbeat_at(component_id, Instant::now());
    }

    pub fn heartbeat_at(&mut self, component_id: &str, now: Instant) {
        if let Some(entry) = self.components.get_mut(component_id) {
            entry.last_heartbeat = now;
        }
    }

    /// Time since the last heartbeat of `component_id`, `None` if unknown.
    pub fn silent_for_at(&self, component_id: &str, now: Instant) -> Option<Duration> {
        self.components
            .get(component_id)
            .map(|entry| now.saturating_duration_since(entry.last_heartbeat))
    }

    /// Health of `component_id`.  Unknown components are
    /// [`ComponentHealth::TimedOut`].
    pub fn health(&self, component_id: &str) -> ComponentHealth {
        self.health_at(component_id, Instant::now())
    }

    pub fn health_at(&self, component_id: &str, now: Instant) -> ComponentHealth {
        match self.components.get(component_id) {
            Some(entry) if now.saturating_duration_since(entry.last_heartbeat) <= entry.timeout => {
                ComponentHealth::Healthy
            }
            _ => ComponentHealth::TimedOut,
        }
    }
}
