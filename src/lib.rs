//! staticd - a minimal static file HTTP server.
//!
//! One request per connection: read until the blank line, look at the
//! request line only, map the URI to a file under the document root and
//! write back a complete HTTP/1.1 response with a fixed header set.
//! Concurrency is a fixed pool of OS threads all blocking in `accept`
//! on one shared listening socket; the kernel picks the worker.
//!
//! # Example
//!
//! ```no_run
//! use staticd::config::ServerConfig;
//! use staticd::server::Server;
//!
//! let config = ServerConfig::new("site");
//! let server = Server::bind(config).unwrap();
//! println!("listening on {}", server.local_addr().unwrap());
//! server.run().unwrap();
//! ```

pub mod config;
pub mod http;
pub mod server;
