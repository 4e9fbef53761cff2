//! Server configuration
//!
//! An explicit, immutable bundle of everything the server needs: where to
//! listen, how many workers, where the files live, how requests are read.
//! The binary fills it in from CLI options; the library itself never reads
//! flags, environment or any other process-global state.

use crate::http::{Error, Result};
use std::env;
use std::path::PathBuf;

/// Address bound when none is configured
pub const DEFAULT_HOST: &str = "127.0.0.1";
/// Port bound when none is configured
pub const DEFAULT_PORT: u16 = 8080;
/// Worker thread count when none is configured
pub const DEFAULT_WORKERS: usize = 5;
/// Directory served when none is configured
pub const DEFAULT_DOC_ROOT: &str = "doc_root";
/// Listen backlog handed to the kernel
pub const DEFAULT_BACKLOG: i32 = 128;
/// Bytes per read while accumulating a request head
pub const DEFAULT_CHUNK_SIZE: usize = 4096;
/// Cap on accumulated request bytes before the connection is abandoned
pub const DEFAULT_MAX_REQUEST_LEN: usize = 8192;

/// Immutable server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Host or address to bind
    pub host: String,
    /// TCP port to bind (0 picks a free one)
    pub port: u16,
    /// Number of accept workers
    pub workers: usize,
    /// Directory served to clients
    pub doc_root: PathBuf,
    /// Directory holding the `<code>.html` error pages
    pub error_dir: PathBuf,
    /// Listen backlog
    pub backlog: i32,
    /// Read chunk size
    pub chunk_size: usize,
    /// Maximum accumulated request size
    pub max_request_len: usize,
}

impl ServerConfig {
    /// Configuration with defaults for everything but the document root
    pub fn new(doc_root: impl Into<PathBuf>) -> Self {
        ServerConfig {
            doc_root: doc_root.into(),
            ..ServerConfig::default()
        }
    }

    /// `host:port` string for binding and logs
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Reject configurations the server cannot run with
    pub fn validate(&self) -> Result<()> {
        if self.workers == 0 {
            return Err(Error::Config("workers must be at least 1".into()));
        }
        if self.chunk_size == 0 {
            return Err(Error::Config("chunk size must be at least 1 byte".into()));
        }
        if self.backlog <= 0 {
            return Err(Error::Config("backlog must be positive".into()));
        }
        Ok(())
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        ServerConfig {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            workers: DEFAULT_WORKERS,
            doc_root: PathBuf::from(DEFAULT_DOC_ROOT),
            error_dir: default_error_dir(),
            backlog: DEFAULT_BACKLOG,
            chunk_size: DEFAULT_CHUNK_SIZE,
            max_request_len: DEFAULT_MAX_REQUEST_LEN,
        }
    }
}

/// Error pages shipped next to the binary win; a working-directory
/// `errors_html/` is the development fallback.
fn default_error_dir() -> PathBuf {
    env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(|dir| dir.join("errors_html")))
        .filter(|dir| dir.is_dir())
        .unwrap_or_else(|| PathBuf::from("errors_html"))
}
