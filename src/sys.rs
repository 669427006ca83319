use libc::{
    AF_INET, CLOCK_MONOTONIC, EFD_CLOEXEC, EFD_NONBLOCK, EFD_SEMAPHORE, F_GETFL, F_SETFL, FIONREAD,
    INADDR_ANY, O_NONBLOCK, SO_REUSEADDR, SOCK_STREAM, SOL_SOCKET, TFD_CLOEXEC, TFD_NONBLOCK,
    accept, bind, c_int, close, eventfd, fcntl, ioctl, itimerspec, listen, read, setsockopt,
    sockaddr, sockaddr_in, socket, socklen_t, timerfd_create, timerfd_settime, timespec, write,
};
use std::os::fd::RawFd;
use std::time::Duration;
use std::{io, mem, ptr};

/// Reads from a file descriptor into the given buffer.
///
/// Returns the number of bytes read, or a negative value on error.
/// A non-blocking descriptor reports "would block" as a negative value too.
pub(crate) fn sys_read(fd: RawFd, buffer: &mut [u8]) -> isize {
    unsafe { read(fd, buffer.as_mut_ptr() as *mut _, buffer.len()) }
}

/// Writes the buffer to a file descriptor.
///
/// Returns the number of bytes written, or a negative value on error.
pub(crate) fn sys_write(fd: RawFd, buffer: &[u8]) -> isize {
    unsafe { write(fd, buffer.as_ptr() as *const _, buffer.len()) }
}

/// Closes a file descriptor.
pub(crate) fn sys_close(fd: RawFd) {
    unsafe { close(fd) };
}

/// Returns the number of bytes immediately readable from a descriptor.
///
/// Uses `ioctl(FIONREAD)`; an error is reported as zero pending bytes.
pub(crate) fn sys_pending(fd: RawFd) -> usize {
    let mut count: c_int = 0;
    let rc = unsafe { ioctl(fd, FIONREAD, &mut count) };
    if rc < 0 { 0 } else { count as usize }
}

/// Sets a file descriptor to non-blocking mode.
pub(crate) fn sys_set_nonblocking(fd: RawFd) -> io::Result<()> {
    let flags = unsafe { fcntl(fd, F_GETFL) };
    if flags < 0 {
        return Err(io::Error::last_os_error());
    }

    let rc = unsafe { fcntl(fd, F_SETFL, flags | O_NONBLOCK) };
    if rc < 0 {
        return Err(io::Error::last_os_error());
    }

    Ok(())
}

/// Creates a counting-semaphore `eventfd`.
///
/// Each write adds to the pending count; each read removes exactly one
/// unit. Returns `-1` on failure, which surfaces later as a registration
/// failure.
pub(crate) fn sys_eventfd() -> RawFd {
    unsafe { eventfd(0, EFD_NONBLOCK | EFD_SEMAPHORE | EFD_CLOEXEC) }
}

/// Adds one unit to an `eventfd` pending count.
pub(crate) fn sys_notify(fd: RawFd) -> bool {
    let value: u64 = 1;
    let wrote = unsafe { write(fd, &value as *const _ as *const _, mem::size_of::<u64>()) };
    wrote == mem::size_of::<u64>() as isize
}

/// Removes one unit from a counting descriptor's pending count.
///
/// Works for both semaphore `eventfd`s (one unit per read) and
/// `timerfd`s (the expiration count is consumed whole).
pub(crate) fn sys_drain(fd: RawFd) -> bool {
    let mut value: u64 = 0;
    let got = unsafe { read(fd, &mut value as *mut _ as *mut _, mem::size_of::<u64>()) };
    got == mem::size_of::<u64>() as isize
}

/// Creates a non-blocking monotonic `timerfd`.
pub(crate) fn sys_timerfd() -> RawFd {
    unsafe { timerfd_create(CLOCK_MONOTONIC, TFD_NONBLOCK | TFD_CLOEXEC) }
}

/// Arms a `timerfd` with the same initial delay and period.
///
/// A zero duration disarms the timer, per the `timerfd_settime`
/// convention.
pub(crate) fn sys_timerfd_arm(fd: RawFd, period: Duration) {
    let ts = timespec {
        tv_sec: period.as_secs() as _,
        tv_nsec: period.subsec_nanos() as _,
    };
    let its = itimerspec {
        it_interval: ts,
        it_value: ts,
    };

    unsafe { timerfd_settime(fd, 0, &its, ptr::null_mut()) };
}

/// Creates an IPv4 stream socket.
///
/// Returns `-1` on failure; the invalid descriptor surfaces later when
/// the socket is bound or registered.
pub(crate) fn sys_socket() -> RawFd {
    unsafe { socket(AF_INET, SOCK_STREAM, 0) }
}

/// Binds a socket to `INADDR_ANY` on the given port.
pub(crate) fn sys_bind_any(fd: RawFd, port: u16) -> io::Result<()> {
    let mut addr: sockaddr_in = unsafe { mem::zeroed() };
    addr.sin_family = AF_INET as _;
    addr.sin_port = port.to_be();
    addr.sin_addr.s_addr = INADDR_ANY.to_be();

    let rc = unsafe {
        bind(
            fd,
            &addr as *const _ as *const sockaddr,
            mem::size_of::<sockaddr_in>() as socklen_t,
        )
    };
    if rc < 0 {
        Err(io::Error::last_os_error())
    } else {
        Ok(())
    }
}

/// Marks a socket as a listening socket with a minimal backlog.
pub(crate) fn sys_listen(fd: RawFd) -> io::Result<()> {
    let rc = unsafe { listen(fd, 1) };
    if rc < 0 {
        Err(io::Error::last_os_error())
    } else {
        Ok(())
    }
}

/// Accepts a new incoming connection.
///
/// The returned client socket is automatically set to non-blocking mode.
pub(crate) fn sys_accept(fd: RawFd) -> io::Result<RawFd> {
    let client_fd = unsafe { accept(fd, ptr::null_mut(), ptr::null_mut()) };
    if client_fd < 0 {
        return Err(io::Error::last_os_error());
    }

    if let Err(e) = sys_set_nonblocking(client_fd) {
        sys_close(client_fd);
        return Err(e);
    }

    Ok(client_fd)
}

/// Enables `SO_REUSEADDR` on a socket.
pub(crate) fn sys_set_reuseaddr(fd: RawFd) -> io::Result<()> {
    let yes: c_int = 1;
    let rc = unsafe {
        setsockopt(
            fd,
            SOL_SOCKET,
            SO_REUSEADDR,
            &yes as *const _ as *const _,
            mem::size_of::<c_int>() as socklen_t,
        )
    };

    if rc < 0 {
        Err(io::Error::last_os_error())
    } else {
        Ok(())
    }
}
