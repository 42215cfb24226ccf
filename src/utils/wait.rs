//! Bounded waiting helpers for action implementations.
//!
//! An action's `perform` may block briefly while it waits for the environment
//! to react ("wait until the door reports open"). Every wait here has a hard
//! timeout so a tick can never hang.

use std::thread;
use std::time::{Duration, Instant};

const FAR_FUTURE: Duration = Duration::from_secs(100 * 365 * 24 * 60 * 60);

/// Polls `condition` every `poll` until it holds or `timeout` elapses.
///
/// The condition is checked once more right at the deadline. Returns `false`
/// on timeout.
///
/// ```
/// use std::time::Duration;
/// use goap_engine::utils::wait::wait_until;
///
/// let mut polls = 0;
/// let opened = wait_until(Duration::from_millis(200), Duration::from_millis(1), || {
///     polls += 1;
///     polls >= 3
/// });
/// assert!(opened);
/// ```
pub fn wait_until<F>(timeout: Duration, poll: Duration, mut condition: F) -> bool
where
    F: FnMut() -> bool,
{
    let deadline = Deadline::after(timeout);

    loop {
        if condition() {
            return true;
        }
        if deadline.expired() {
            return false;
        }
        thread::sleep(poll.min(deadline.remaining()));
    }
}

/// A point in time after which a multi-tick action should give up.
///
/// Store one in the action's execution context on start and check it on each
/// `perform` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Deadline {
    at: Instant,
}

impl Deadline {
    pub fn after(timeout: Duration) -> Self {
        Self::starting_at(Instant::now(), timeout)
    }

    /// Saturates to a deadline roughly a century out when `timeout` does not
    /// fit in an `Instant`.
    pub fn starting_at(start: Instant, timeout: Duration) -> Self {
        let at = start
            .checked_add(timeout)
            .or_else(|| start.checked_add(FAR_FUTURE))
            .unwrap_or(start);
        Self { at }
    }

    pub fn at(&self) -> Instant {
        self.at
    }

    pub fn expired(&self) -> bool {
        Instant::now() >= self.at
    }

    /// Time left, zero once expired.
    pub fn remaining(&self) -> Duration {
        self.at.saturating_duration_since(Instant::now())
    }
}
