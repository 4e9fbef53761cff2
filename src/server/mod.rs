//! Connection acceptance and per-connection service
//!
//! A fixed pool of OS threads all block in `accept` on one shared
//! listening socket; the kernel decides which worker takes a connection.
//! Each accepted connection gets exactly one response and is closed.

pub mod connection;
pub mod listener;

pub use listener::Server;
