//! Monotonic time source.
//!
//! [`Time`] wraps the monotonic clock used for all timer and timeout
//! arithmetic in the loop. It is immune to wall-clock adjustment and
//! never decreases across calls.

use std::sync::LazyLock;
use std::time::{Duration, Instant};

/// Process start epoch, captured on first access to the clock.
static START: LazyLock<Instant> = LazyLock::new(Instant::now);

/// The monotonic time source.
pub struct Time;

impl Time {
    /// Returns the current monotonic instant.
    pub fn now() -> Instant {
        Instant::now()
    }

    /// Returns the time elapsed since the clock was first accessed.
    pub fn running() -> Duration {
        Time::now().duration_since(*START)
    }
}
