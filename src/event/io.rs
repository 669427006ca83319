use super::{Event, sealed};
use crate::sys;

use std::os::fd::{AsRawFd, RawFd};

/// A readable/writable event source, e.g. a socket, pipe, or file.
///
/// `Io` never buffers and never retries: reads and writes map directly
/// onto the non-blocking syscalls, and the caller decides what to do
/// with a short result.
pub struct Io {
    event: Event,
}

impl Io {
    /// Wraps a descriptor.
    ///
    /// When `owned`, the descriptor is closed when the `Io` is dropped.
    /// No validation is performed; a bad descriptor surfaces later as a
    /// registration failure.
    pub fn new(fd: RawFd, owned: bool) -> Self {
        Self {
            event: Event::new(fd, owned),
        }
    }

    /// Returns the number of bytes immediately readable without
    /// blocking. Pure query, no side effect.
    pub fn pending(&self) -> usize {
        sys::sys_pending(self.event.fd())
    }

    /// Non-blocking read into the caller's buffer.
    ///
    /// Returns the number of bytes read, or a negative value if the
    /// read would block or failed. No internal retry.
    pub fn read(&self, buffer: &mut [u8]) -> isize {
        sys::sys_read(self.event.fd(), buffer)
    }

    /// Non-blocking write of the whole buffer.
    ///
    /// Returns true only if every byte was written in this call. A
    /// short write is reported as failure and never retried here;
    /// retry policy belongs to the caller.
    pub fn write(&self, buffer: &[u8]) -> bool {
        sys::sys_write(self.event.fd(), buffer) == buffer.len() as isize
    }
}

#[cfg(feature = "strings")]
impl Io {
    /// Upper bound on a single [`read_string`](Io::read_string) call.
    const MAX_READ: usize = 65536;

    /// Reads everything currently pending, as a string.
    ///
    /// Reads up to [`pending`](Io::pending) bytes, capped at 64 KiB,
    /// and converts them lossily. Returns an empty string when nothing
    /// is readable or the read fails.
    pub fn read_string(&self) -> String {
        let mut len = self.pending();
        if len > Self::MAX_READ {
            len = Self::MAX_READ;
        }

        let mut buffer = vec![0u8; len];
        let count = self.read(&mut buffer);
        if count < 0 {
            return String::new();
        }

        buffer.truncate(count as usize);
        String::from_utf8_lossy(&buffer).into_owned()
    }

    /// Writes a string, with the same all-or-nothing contract as
    /// [`write`](Io::write).
    pub fn write_string(&self, s: &str) -> bool {
        self.write(s.as_bytes())
    }
}

impl sealed::Sealed for Io {
    fn event(&self) -> &Event {
        &self.event
    }

    // Data readiness is level-triggered; reading is the handler's job.
    fn requires_drain(&self) -> bool {
        false
    }
}

impl AsRawFd for Io {
    fn as_raw_fd(&self) -> RawFd {
        self.event.fd()
    }
}
