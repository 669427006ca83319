//! Networking built on top of the event loop.

mod tcp;

pub use tcp::TcpServer;
