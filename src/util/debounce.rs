//! Quiet-period debouncer for the search box
//!
//! Every trigger pushes the deadline out to `now + quiet`; the action fires
//! once, on the first poll at or after the deadline. Time is passed in so the
//! front-end can drive it from a real timer and tests can drive it directly.

use super::{Duration, Instant};

/// Coalesces bursts of triggers into a single firing.
///
/// # Example
/// ```
/// use otcmarket::util::debounce::Debounce;
/// use std::time::{Duration, Instant};
///
/// let mut d = Debounce::new(Duration::from_millis(500));
/// let t0 = Instant::now();
///
/// d.trigger(t0);
/// d.trigger(t0 + Duration::from_millis(200));
///
/// // Quiet period restarts at the second keystroke
/// assert!(!d.fire(t0 + Duration::from_millis(600)));
/// assert!(d.fire(t0 + Duration::from_millis(700)));
///
/// // Fires only once per burst
/// assert!(!d.fire(t0 + Duration::from_millis(900)));
/// ```
#[derive(Debug, Clone)]
pub struct Debounce {
    deadline: Option<Instant>,
    quiet: Duration,
}

impl Debounce {
    pub fn new(quiet: Duration) -> Self {
        Self {
            deadline: None,
            quiet,
        }
    }

    pub fn quiet(&self) -> Duration {
        self.quiet
    }

    /// Register an input event; restarts the quiet period.
    pub fn trigger(&mut self, now: Instant) {
        self.deadline = Some(now + self.quiet);
    }

    /// Returns `true` exactly once when the quiet period has elapsed.
    pub fn fire(&mut self, now: Instant) -> bool {
        match self.deadline {
            Some(deadline) if now >= deadline => {
                self.deadline = None;
                true
            }
            _ => false,
        }
    }

    /// Time left until the pending firing, `None` when idle.
    pub fn remaining(&self, now: Instant) -> Option<Duration> {
        self.deadline
            .map(|deadline| deadline.saturating_duration_since(now))
    }

    pub fn is_pending(&self) -> bool {
        self.deadline.is_some()
    }

    /// Drop a pending firing (e.g. an immediate search made it redundant).
    pub fn cancel(&mut self) {
        self.deadline = None;
    }
}
