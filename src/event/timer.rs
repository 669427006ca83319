use super::{Event, sealed};
use crate::sys;

use std::os::fd::{AsRawFd, RawFd};
use std::time::Duration;

/// A repeating timer with an updateable interval.
///
/// Backed by a monotonic `timerfd`. The timer first fires one interval
/// after it is armed, then once per interval thereafter; each dispatch
/// consumes the accumulated expiration count.
pub struct Timer {
    event: Event,
    interval: Duration,
}

impl Timer {
    /// Allocates a timer and arms it immediately with `interval`.
    pub fn new(interval: Duration) -> Self {
        let mut timer = Self {
            event: Event::new(sys::sys_timerfd(), true),
            interval: Duration::ZERO,
        };
        timer.set_interval(interval);
        timer
    }

    /// Re-arms the timer.
    ///
    /// The next fire happens `interval` from now, then every `interval`
    /// thereafter; any phase from a previous arming is discarded. A
    /// zero interval disarms the timer, per the `timerfd` convention.
    pub fn set_interval(&mut self, interval: Duration) {
        self.interval = interval;
        sys::sys_timerfd_arm(self.event.fd(), interval);
    }

    /// Returns the last configured interval.
    pub fn interval(&self) -> Duration {
        self.interval
    }
}

impl sealed::Sealed for Timer {
    fn event(&self) -> &Event {
        &self.event
    }

    fn requires_drain(&self) -> bool {
        true
    }
}

impl AsRawFd for Timer {
    fn as_raw_fd(&self) -> RawFd {
        self.event.fd()
    }
}
