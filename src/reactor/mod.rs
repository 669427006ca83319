//! Reactor core.
//!
//! One reactor per thread, created lazily on the first facade call and
//! torn down when the thread exits. The reactor owns:
//! - the readiness multiplexer,
//! - the dispatch table (descriptor to handler),
//! - timers created through `every`,
//! - a private stop signal.
//!
//! The process-wide registry is touched only for the stop broadcast;
//! everything else is single-threaded by construction.

mod core;
mod poller;
mod registry;

pub(crate) use self::core::current;
pub(crate) use self::registry::broadcast_stop;
