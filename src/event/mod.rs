//! Watchable event sources.
//!
//! Every source the loop can watch is a thin wrapper around an
//! owned-or-borrowed file descriptor:
//!
//! - [`Io`] — a readable/writable byte stream (socket, pipe, file),
//! - [`Notifier`] — a counting cross-thread wake primitive,
//! - [`Timer`] — a repeating interval timer.
//!
//! The variant set is closed: [`Source`] is sealed and implemented only
//! for the three types above.

mod io;
mod notifier;
mod timer;

pub use io::Io;
pub use notifier::Notifier;
pub use timer::Timer;

use crate::sys;

use std::os::fd::{AsRawFd, RawFd};
use std::sync::atomic::{AtomicI32, Ordering};

/// Sentinel for an unset or released descriptor.
pub(crate) const INVALID_FD: RawFd = -1;

/// An owned-or-borrowed watchable descriptor.
///
/// `Event` is the shared base of every source variant. Construction
/// performs no validation: an invalid descriptor is accepted and
/// surfaces later as a registration failure.
///
/// When `owned`, the event is the exclusive owner of the descriptor's
/// lifetime: release happens exactly once, and the descriptor is marked
/// invalid immediately after. The atomic swap makes release race-free
/// under concurrent teardown.
pub struct Event {
    fd: AtomicI32,
    owned: bool,
}

impl Event {
    pub(crate) fn new(fd: RawFd, owned: bool) -> Self {
        Self {
            fd: AtomicI32::new(fd),
            owned,
        }
    }

    /// Returns the underlying descriptor, or `-1` if released.
    pub fn fd(&self) -> RawFd {
        self.fd.load(Ordering::Acquire)
    }

    /// Closes the descriptor and marks it invalid.
    ///
    /// Idempotent: a second call observes the sentinel and does nothing.
    pub(crate) fn release(&self) {
        let fd = self.fd.swap(INVALID_FD, Ordering::AcqRel);
        if fd >= 0 {
            sys::sys_close(fd);
        }
    }
}

impl Drop for Event {
    fn drop(&mut self) {
        if self.owned {
            self.release();
        }
    }
}

impl AsRawFd for Event {
    fn as_raw_fd(&self) -> RawFd {
        self.fd()
    }
}

pub(crate) mod sealed {
    use super::Event;

    pub trait Sealed {
        fn event(&self) -> &Event;

        /// Whether one pending unit must be consumed before each
        /// dispatch. True for counting sources (notifiers, timers),
        /// false for level-triggered byte streams.
        fn requires_drain(&self) -> bool;
    }
}

/// A watchable event source.
///
/// Sealed over the fixed variant set ([`Io`], [`Notifier`], [`Timer`]).
pub trait Source: sealed::Sealed {
    /// The descriptor this source is identified by in the loop.
    fn fd(&self) -> RawFd {
        self.event().fd()
    }
}

impl Source for Io {}
impl Source for Notifier {}
impl Source for Timer {}
