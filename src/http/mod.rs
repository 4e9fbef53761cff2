//! HTTP/1.x protocol pieces: status table, request-line resolution and
//! response assembly.
//!
//! The server answers every request with a one-shot HTTP/1.1 response and
//! closes the connection, so this layer stays deliberately small: requests
//! are parsed only as far as the request line, responses carry a fixed
//! header set, and everything works on plain byte slices with blocking I/O.

pub mod headers;
pub mod resolve;
pub mod response;
pub mod status;

pub use headers::Headers;
pub use resolve::{Resolution, Resolver};
pub use response::Response;
pub use status::Status;

/// Result type for protocol and transport operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors on the way from accepted socket to finished response
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid status code: {0}")]
    InvalidStatus(u16),

    #[error("Invalid header: {0}")]
    InvalidHeader(String),

    #[error("Request head of {received} bytes exceeds the {limit} byte cap")]
    RequestTooLarge { received: usize, limit: usize },

    #[error("Connection closed")]
    ConnectionClosed,

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Cannot resolve listen address: {0}")]
    Addr(String),
}

/// CRLF line ending
pub const CRLF: &str = "\r\n";

/// Protocol written on every status line, whatever the client sent
pub const PROTOCOL: &str = "HTTP/1.1";

/// Value of the `Server` response header
pub const SERVER_SOFTWARE: &str = concat!("staticd/", env!("CARGO_PKG_VERSION"));
