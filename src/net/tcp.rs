use crate::event::{INVALID_FD, Io, Source};
use crate::sys;

use std::cell::Cell;
use std::os::fd::RawFd;
use std::rc::Rc;

/// A single-connection TCP accept loop.
///
/// The server registers its listening socket with the calling thread's
/// event loop and accepts at most one concurrent connection. Further
/// inbound attempts stay queued in the OS accept backlog until
/// [`disconnect`](TcpServer::disconnect) releases the tracked
/// connection.
pub struct TcpServer {
    inner: Rc<Inner>,
}

struct Inner {
    listener: Io,

    /// Descriptor of the tracked connection, `-1` when none.
    connection: Cell<RawFd>,
}

impl TcpServer {
    pub fn new() -> Self {
        Self {
            inner: Rc::new(Inner {
                listener: Io::new(sys::sys_socket(), true),
                connection: Cell::new(INVALID_FD),
            }),
        }
    }

    /// Binds to all local addresses on `port` and starts accepting.
    ///
    /// `on_connect` runs on the loop thread with a borrowed handle to
    /// each newly accepted connection. Returns false if the socket
    /// could not be bound, marked listening, or registered.
    pub fn listen(&self, port: u16, mut on_connect: impl FnMut(Io) + 'static) -> bool {
        let fd = self.inner.listener.fd();
        if fd < 0 {
            return false;
        }

        if sys::sys_bind_any(fd, port).is_err() {
            return false;
        }

        if sys::sys_listen(fd).is_err() {
            return false;
        }

        if let Err(e) = sys::sys_set_reuseaddr(fd) {
            log::warn!("failed to set SO_REUSEADDR on fd {fd}: {e}");
        }

        let inner = Rc::clone(&self.inner);
        crate::add(&self.inner.listener, move || {
            // Only one connection at a time; the backlog holds the rest.
            if inner.listener.pending() == 0 && inner.connection.get() < 0 {
                let accepted = match sys::sys_accept(inner.listener.fd()) {
                    Ok(fd) => fd,
                    Err(_) => return,
                };

                inner.connection.set(accepted);
                on_connect(Io::new(accepted, false));
            }
        })
    }

    /// Releases the tracked connection.
    ///
    /// No-op unless `source` is the tracked connection; on match the
    /// descriptor is removed from the loop, closed, and the server
    /// goes back to accepting.
    pub fn disconnect(&self, source: &impl Source) -> bool {
        let fd = self.inner.connection.get();
        if source.fd() != fd || fd < 0 {
            return false;
        }

        crate::remove(source);
        sys::sys_close(fd);
        self.inner.connection.set(INVALID_FD);

        true
    }
}

impl Default for TcpServer {
    fn default() -> Self {
        Self::new()
    }
}
