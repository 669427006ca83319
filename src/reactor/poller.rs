//! `epoll`-based readiness multiplexer.
//!
//! One poller instance belongs to one reactor, and therefore to one
//! thread. It registers descriptors for read readiness, blocks in
//! `epoll_wait` for up to a caller-supplied budget, and reports the
//! ready descriptors in the order the kernel returned them.

use crate::sys;

use libc::{
    EPOLL_CLOEXEC, EPOLL_CTL_ADD, EPOLL_CTL_DEL, EPOLLHUP, EPOLLIN, EPOLLPRI, epoll_create1,
    epoll_ctl, epoll_event, epoll_wait,
};
use std::io;
use std::os::fd::RawFd;
use std::time::Duration;

/// A readiness report for one descriptor.
pub(crate) struct Ready {
    pub(crate) fd: RawFd,
    pub(crate) hangup: bool,
}

/// The per-reactor `epoll` instance.
pub(crate) struct Poller {
    epoll: RawFd,
}

impl Poller {
    /// Creates the `epoll` instance.
    ///
    /// The loop cannot exist without its multiplexer, so creation
    /// failure is fatal.
    pub(crate) fn new() -> Self {
        let epoll = unsafe { epoll_create1(EPOLL_CLOEXEC) };
        assert!(epoll >= 0, "epoll_create1 failed");

        Self { epoll }
    }

    /// Registers a descriptor for read readiness.
    ///
    /// The descriptor itself is the lookup key carried back in each
    /// readiness report. Fails on duplicate registration, an invalid
    /// descriptor, or resource exhaustion.
    pub(crate) fn register(&self, fd: RawFd) -> io::Result<()> {
        let mut event = epoll_event {
            events: (EPOLLIN | EPOLLPRI) as u32,
            u64: fd as u64,
        };

        let rc = unsafe { epoll_ctl(self.epoll, EPOLL_CTL_ADD, fd, &mut event) };
        if rc < 0 {
            Err(io::Error::last_os_error())
        } else {
            Ok(())
        }
    }

    /// Removes a descriptor from the multiplexer.
    ///
    /// Best-effort: an already-deregistered or already-closed
    /// descriptor is ignored.
    pub(crate) fn deregister(&self, fd: RawFd) {
        unsafe {
            epoll_ctl(self.epoll, EPOLL_CTL_DEL, fd, std::ptr::null_mut());
        }
    }

    /// Waits for readiness and collects one batch of reports.
    ///
    /// `None` blocks indefinitely; `Some(ZERO)` performs a single
    /// non-blocking poll. An interrupted wait is reported as an empty
    /// batch rather than an error.
    pub(crate) fn wait(&self, ready: &mut Vec<Ready>, timeout: Option<Duration>) -> io::Result<()> {
        const MAX_EVENTS: usize = 64;

        let timeout_ms = timeout.map(|t| t.as_millis() as i32).unwrap_or(-1);
        let mut events: [epoll_event; MAX_EVENTS] = unsafe { std::mem::zeroed() };

        let n =
            unsafe { epoll_wait(self.epoll, events.as_mut_ptr(), MAX_EVENTS as i32, timeout_ms) };

        ready.clear();

        if n < 0 {
            let err = io::Error::last_os_error();
            if err.kind() == io::ErrorKind::Interrupted {
                return Ok(());
            }
            return Err(err);
        }

        for event in &events[..n as usize] {
            ready.push(Ready {
                fd: event.u64 as RawFd,
                hangup: event.events & EPOLLHUP as u32 != 0,
            });
        }

        Ok(())
    }
}

impl Drop for Poller {
    fn drop(&mut self) {
        sys::sys_close(self.epoll);
    }
}
