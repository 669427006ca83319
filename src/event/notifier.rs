use super::{Event, sealed};
use crate::sys;

use std::os::fd::{AsRawFd, RawFd};

/// A counting cross-thread wake primitive.
///
/// Each [`notify`](Notifier::notify) adds one unit to a pending count;
/// the loop consumes exactly one unit per dispatch, so N notifications
/// yield N handler invocations — never fewer, never merged.
///
/// Backed by a semaphore-mode `eventfd`. The initial count is zero and
/// the descriptor is owned.
pub struct Notifier {
    event: Event,
}

impl Notifier {
    pub fn new() -> Self {
        Self {
            event: Event::new(sys::sys_eventfd(), true),
        }
    }

    /// Adds one unit to the pending count and wakes the watching loop.
    ///
    /// Safe to call from any thread; the signal is visible the moment
    /// this returns. Returns false only on a lower-level failure, e.g.
    /// the underlying descriptor was already closed.
    pub fn notify(&self) -> bool {
        sys::sys_notify(self.event.fd())
    }
}

impl Default for Notifier {
    fn default() -> Self {
        Self::new()
    }
}

impl sealed::Sealed for Notifier {
    fn event(&self) -> &Event {
        &self.event
    }

    fn requires_drain(&self) -> bool {
        true
    }
}

impl AsRawFd for Notifier {
    fn as_raw_fd(&self) -> RawFd {
        self.event.fd()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn each_notify_is_one_unit() {
        let notifier = Notifier::new();
        assert!(notifier.notify());
        assert!(notifier.notify());
        assert!(notifier.notify());

        // Semaphore mode: one unit per drain, then empty.
        assert!(sys::sys_drain(notifier.as_raw_fd()));
        assert!(sys::sys_drain(notifier.as_raw_fd()));
        assert!(sys::sys_drain(notifier.as_raw_fd()));
        assert!(!sys::sys_drain(notifier.as_raw_fd()));
    }

    #[test]
    fn notify_fails_on_released_descriptor() {
        let notifier = Notifier::new();
        notifier.event.release();
        assert!(!notifier.notify());
    }
}
