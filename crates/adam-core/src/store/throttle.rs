// ── Refresh throttle ──
//
// Time-based gate only: it does not serialize concurrent callers, it just
// reports whether the interval has elapsed since the last recorded run.

use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use tokio::time::Instant;

pub(crate) struct Throttle {
    interval: Duration,
    last_run: Mutex<Option<Instant>>,
}

impl Throttle {
    pub(crate) fn new(interval: Duration) -> Self {
        Self {
            interval,
            last_run: Mutex::new(None),
        }
    }

    pub(crate) fn interval(&self) -> Duration {
        self.interval
    }

    /// `true` if nothing ran yet or at least `interval` has passed.
    pub(crate) fn is_ready(&self) -> bool {
        let last_run = *self.last_run.lock().unwrap_or_else(PoisonError::into_inner);
        last_run.is_none_or(|at| at.elapsed() >= self.interval)
    }

    /// Record a run at the current instant.
    pub(crate) fn mark(&self) {
        *self.last_run.lock().unwrap_or_else(PoisonError::into_inner) = Some(Instant::now());
    }
}
