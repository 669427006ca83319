//! # Eddy
//!
//! **Eddy** is a minimal reactor-pattern event loop: one
//! readiness-driven dispatcher per thread, watching file-like
//! descriptors, cross-thread wake signals, and repeating timers, and
//! invoking your callbacks synchronously when they become ready.
//!
//! There is no executor, no futures, and no background thread. Each
//! thread that calls into the facade gets its own loop, created
//! lazily and torn down at thread exit. Threads coordinate through
//! [`Notifier`] wake signals and the process-wide [`quit`] broadcast,
//! nothing else is shared.
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use std::time::Duration;
//!
//! // Tick twice a second.
//! eddy::every(Duration::from_millis(500), || println!("tick"));
//!
//! // Run the loop on this thread until `stop` or `quit`.
//! while eddy::run(None) {}
//! ```
//!
//! ## Modules
//!
//! - [`event`] — watchable sources: [`Io`], [`Notifier`], [`Timer`]
//! - [`net`] — a single-connection TCP accept loop
//! - [`time`] — the monotonic clock used for all timeout arithmetic

mod reactor;
mod sys;

pub mod event;
pub mod net;
pub mod time;

pub use event::{Event, Io, Notifier, Source, Timer};
pub use time::Time;

use event::sealed::Sealed;
use std::time::Duration;

/// Watches a source on the calling thread's loop.
///
/// The handler runs synchronously on this thread each time the source
/// is ready. Counting sources ([`Notifier`], [`Timer`]) have one
/// pending unit consumed before every invocation; an [`Io`] source is
/// left for the handler to read.
///
/// Returns false if the multiplexer rejected the descriptor
/// (duplicate registration, invalid descriptor, resource exhaustion);
/// no partial state is retained on failure.
pub fn add(source: &impl Source, handler: impl FnMut() + 'static) -> bool {
    reactor::current().add(source, Box::new(handler))
}

/// Runs `handler` every `interval` on the calling thread's loop.
///
/// The loop allocates and owns the underlying timer; it is released
/// when the registration is [`remove`]d or the thread exits. Returns
/// false if the timer could not be allocated or registered, in which
/// case nothing is leaked.
pub fn every(interval: Duration, handler: impl FnMut() + 'static) -> bool {
    reactor::current().every(interval, Box::new(handler))
}

/// Stops watching a source on the calling thread's loop.
///
/// Removing a registration and adding the same descriptor again
/// behaves as a fresh registration. Returns false if the descriptor
/// was never registered here. Idempotent.
///
/// Must be called on the thread that registered the source, either
/// between [`run`] calls or from within a handler.
pub fn remove(source: &impl Source) -> bool {
    reactor::current().remove(source.event().fd())
}

/// Runs the calling thread's loop.
///
/// Blocks dispatching ready handlers for up to `timeout`: `None`
/// runs forever, `Some(Duration::ZERO)` performs a single
/// non-blocking poll pass. Returns true if the loop is still live
/// when the budget runs out, false as soon as a stop signal is
/// processed.
pub fn run(timeout: Option<Duration>) -> bool {
    reactor::current().run(timeout)
}

/// Signals the calling thread's loop to stop.
///
/// Only this thread's [`run`] is affected. Returns whether the signal
/// was delivered.
pub fn stop() -> bool {
    reactor::current().stop()
}

/// Signals every loop in the process to stop.
///
/// Best-effort: a loop whose thread already exited is skipped.
pub fn quit() {
    reactor::broadcast_stop();
}
