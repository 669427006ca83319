//! Process-wide registry of live reactors.
//!
//! Each reactor registers its private stop descriptor here at
//! construction and removes it at teardown. The registry exists for a
//! single purpose: letting [`broadcast_stop`] reach every loop in the
//! process. Per-thread dispatch state never crosses this boundary.

use crate::sys;

use std::os::fd::RawFd;
use std::sync::Mutex;
use std::thread::{self, ThreadId};

/// Membership is the only thing this lock guards; dispatch tables are
/// single-threaded by construction.
static REGISTRY: Mutex<Vec<(ThreadId, RawFd)>> = Mutex::new(Vec::new());

/// Registers the calling thread's stop descriptor.
pub(crate) fn register(stop_fd: RawFd) {
    let mut registry = REGISTRY.lock().unwrap();
    registry.push((thread::current().id(), stop_fd));
}

/// Removes the calling thread's entry, if present.
pub(crate) fn deregister() {
    let id = thread::current().id();
    let mut registry = REGISTRY.lock().unwrap();
    registry.retain(|(thread, _)| *thread != id);
}

/// Signals every registered reactor to stop.
///
/// The descriptors are snapshotted under the lock, then notified
/// outside it so that registry mutation is never blocked on the wake
/// syscalls. A target whose thread exited mid-broadcast has a closed
/// descriptor; that failure is ignored, the broadcast is best-effort.
pub(crate) fn broadcast_stop() {
    let stop_fds: Vec<RawFd> = {
        let registry = REGISTRY.lock().unwrap();
        registry.iter().map(|&(_, fd)| fd).collect()
    };

    for fd in stop_fds {
        let _ = sys::sys_notify(fd);
    }
}
