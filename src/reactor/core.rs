use super::poller::{Poller, Ready};
use super::registry;
use crate::event::{Notifier, Source, Timer, sealed::Sealed};
use crate::sys;
use crate::time::Time;

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::os::fd::{AsRawFd, RawFd};
use std::rc::Rc;
use std::time::Duration;

/// Boxed handler storage.
///
/// The single point to swap for deployments that cannot afford heap
/// allocation per handler; the reactor's contract does not depend on
/// the representation.
pub(crate) type Handler = Box<dyn FnMut() + 'static>;

/// One registered descriptor and how to dispatch it.
struct DispatchEntry {
    /// Consume one pending unit before each dispatch. True for
    /// counting sources (notifiers, timers), false for byte streams.
    requires_drain: bool,

    /// Shared so a running handler can mutate the table re-entrantly
    /// (register, remove, even remove itself) without aliasing it.
    handler: Rc<RefCell<Handler>>,
}

thread_local! {
    static CURRENT: Rc<Reactor> = Rc::new(Reactor::new());
}

/// Returns the calling thread's reactor, creating it on first use.
pub(crate) fn current() -> Rc<Reactor> {
    CURRENT.with(Rc::clone)
}

/// The per-thread event loop engine.
///
/// Owns the readiness multiplexer, the dispatch table, any timers
/// created through [`every`](Reactor::every), and a private stop
/// signal watched unconditionally from construction. Never shared
/// across threads; cross-thread coordination goes through notifiers
/// and the registry-mediated stop broadcast.
pub(crate) struct Reactor {
    poller: Poller,
    stop: Notifier,

    /// Cleared when a stop signal is processed, never set again.
    running: Cell<bool>,

    dispatch: RefCell<HashMap<RawFd, DispatchEntry>>,

    /// Timers created by `every`, owned by the reactor itself.
    timers: RefCell<HashMap<RawFd, Timer>>,
}

impl Reactor {
    fn new() -> Self {
        let poller = Poller::new();
        let stop = Notifier::new();
        poller
            .register(stop.as_raw_fd())
            .expect("failed to register the stop descriptor");

        registry::register(stop.as_raw_fd());

        Self {
            poller,
            stop,
            running: Cell::new(true),
            dispatch: RefCell::new(HashMap::new()),
            timers: RefCell::new(HashMap::new()),
        }
    }

    /// Registers a source for dispatch.
    ///
    /// Returns false if the multiplexer rejects the descriptor
    /// (duplicate registration, invalid descriptor, exhaustion); no
    /// partial state is retained on failure.
    pub(crate) fn add(&self, source: &impl Source, handler: Handler) -> bool {
        self.add_fd(source.event().fd(), source.requires_drain(), handler)
    }

    fn add_fd(&self, fd: RawFd, requires_drain: bool, handler: Handler) -> bool {
        if let Err(e) = self.poller.register(fd) {
            log::warn!("failed to register fd {fd}: {e}");
            return false;
        }

        self.dispatch.borrow_mut().insert(
            fd,
            DispatchEntry {
                requires_drain,
                handler: Rc::new(RefCell::new(handler)),
            },
        );

        true
    }

    /// Registers a repeating timer owned by the reactor.
    ///
    /// The timer is only stored once registration succeeded, so a
    /// failed registration cannot leak it.
    pub(crate) fn every(&self, interval: Duration, handler: Handler) -> bool {
        let timer = Timer::new(interval);
        let fd = timer.as_raw_fd();

        if !self.add_fd(fd, true, handler) {
            return false;
        }

        self.timers.borrow_mut().insert(fd, timer);
        true
    }

    /// Removes a registered descriptor.
    ///
    /// Deregisters from the multiplexer so that a subsequent `add` of
    /// the same descriptor behaves as a fresh registration. Releases
    /// the timer if the descriptor was an internally-owned one.
    /// Returns false if the descriptor was never registered.
    pub(crate) fn remove(&self, fd: RawFd) -> bool {
        self.timers.borrow_mut().remove(&fd);

        if self.dispatch.borrow_mut().remove(&fd).is_none() {
            return false;
        }

        self.poller.deregister(fd);
        true
    }

    /// Runs the loop for up to `timeout`.
    ///
    /// `None` runs forever; `Some(ZERO)` performs a single
    /// non-blocking poll pass. Handlers for ready descriptors are
    /// invoked synchronously, in the order the multiplexer reported
    /// them. Returns false as soon as a stop signal is processed,
    /// otherwise returns the running flag once the budget is spent.
    pub(crate) fn run(&self, timeout: Option<Duration>) -> bool {
        let mut ready: Vec<Ready> = Vec::with_capacity(64);
        let mut remaining = timeout;

        loop {
            let started = Time::now();

            if self.poller.wait(&mut ready, remaining).is_err() {
                return self.running.get();
            }

            for event in &ready {
                if event.hangup {
                    // Detected but not surfaced to handlers.
                    log::debug!("hangup on fd {}", event.fd);
                }

                if event.fd == self.stop.as_raw_fd() {
                    sys::sys_drain(event.fd);
                    self.running.set(false);
                    // TODO: decide whether the rest of this ready
                    // batch should be dispatched before returning.
                    return false;
                }

                self.dispatch_one(event.fd);
            }

            if let Some(budget) = remaining {
                let elapsed = started.elapsed();
                if elapsed >= budget {
                    break;
                }
                remaining = Some(budget - elapsed);
            }
        }

        self.running.get()
    }

    fn dispatch_one(&self, fd: RawFd) {
        // A handler earlier in the batch may have removed this entry.
        let handler = {
            let dispatch = self.dispatch.borrow();
            match dispatch.get(&fd) {
                Some(entry) => {
                    if entry.requires_drain {
                        sys::sys_drain(fd);
                    }
                    Rc::clone(&entry.handler)
                }
                None => return,
            }
        };

        // Table borrow is released: the handler may call back into
        // add/remove/stop on this reactor.
        (handler.borrow_mut())();
    }

    pub(crate) fn stop(&self) -> bool {
        self.stop.notify()
    }
}

impl Drop for Reactor {
    fn drop(&mut self) {
        registry::deregister();

        let fds: Vec<RawFd> = self.dispatch.borrow().keys().copied().collect();
        for fd in fds {
            self.remove(fd);
        }
    }
}
