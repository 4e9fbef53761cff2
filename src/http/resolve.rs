//! Request-line parsing and URI-to-file resolution
//!
//! Only the first line of a request is ever interpreted. The resolver
//! turns it into a status code, the method token and the file the
//! response body will come from. Nothing here returns `Err`: a malformed
//! or unservable request resolves to one of the fixed error pages, so
//! the connection handler always has something to send.
//!
//! Resolution order for the URI: percent-decode, strip the query, strip
//! leading slashes, join onto the document root, reject `../`, apply the
//! trailing-slash `index.html` rule, require an existing regular file.

use super::status::Status;
use percent_encoding::percent_decode_str;
use std::path::PathBuf;

/// Methods the server is willing to serve
pub const ALLOWED_METHODS: &[&str] = &["GET", "HEAD"];

/// Outcome of resolving a request line against the document root
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    /// Status the response will carry
    pub status: Status,
    /// Method token exactly as the client sent it (empty when missing)
    pub method: String,
    /// File the response body comes from: the target for OK, the
    /// `<code>.html` error page otherwise
    pub path: PathBuf,
}

/// Resolves request lines to files under a document root
#[derive(Debug, Clone)]
pub struct Resolver {
    doc_root: PathBuf,
    error_dir: PathBuf,
}

impl Resolver {
    /// Create a resolver over a document root and an error-page directory
    pub fn new(doc_root: impl Into<PathBuf>, error_dir: impl Into<PathBuf>) -> Self {
        Resolver {
            doc_root: doc_root.into(),
            error_dir: error_dir.into(),
        }
    }

    /// Resolve the raw bytes of a request head
    ///
    /// Splits the first line into whitespace-separated tokens. Method and
    /// URI are required; the protocol token and anything after it are
    /// ignored. An unsupported method resolves to 405 with the token
    /// preserved for logging.
    pub fn resolve(&self, raw: &[u8]) -> Resolution {
        let line = first_line(raw);
        let tokens: Vec<&str> = line.split_whitespace().collect();

        if tokens.len() < 2 {
            let method = tokens.first().copied().unwrap_or("").to_string();
            return self.error(Status::BAD_REQUEST, method);
        }
        let method = tokens[0].to_string();
        let uri = tokens[1];

        if !ALLOWED_METHODS.contains(&method.as_str()) {
            return self.error(Status::METHOD_NOT_ALLOWED, method);
        }

        match self.validate_uri(uri) {
            Ok(path) => Resolution {
                status: Status::OK,
                method,
                path,
            },
            Err(status) => self.error(status, method),
        }
    }

    /// Map a request URI to a regular file under the document root
    fn validate_uri(&self, uri: &str) -> std::result::Result<PathBuf, Status> {
        let decoded = percent_decode_str(uri).decode_utf8_lossy();
        // Decoding runs first, so an encoded '?' also starts the query.
        let path_part = match decoded.split_once('?') {
            Some((before_query, _)) => before_query,
            None => decoded.as_ref(),
        };

        // Every leading slash goes, so the join below can never replace
        // the root with an absolute path.
        let relative = path_part.trim_start_matches('/');
        let mut candidate = if relative.is_empty() {
            self.doc_root.clone()
        } else {
            self.doc_root.join(relative)
        };

        // Textual check on the joined path, document root included:
        // `/sub/../file` is rejected even though it would land back
        // inside the root.
        if candidate.to_string_lossy().contains("../") {
            return Err(Status::FORBIDDEN);
        }

        if path_part.ends_with('/') {
            candidate.push("index.html");
        }

        // is_file follows symlinks and is false for directories.
        if !candidate.is_file() {
            return Err(Status::NOT_FOUND);
        }

        Ok(candidate)
    }

    fn error(&self, status: Status, method: String) -> Resolution {
        Resolution {
            status,
            method,
            path: self.error_dir.join(format!("{}.html", status.code())),
        }
    }
}

/// Extract the first line of a request head
///
/// Bytes up to the first CRLF, or the whole buffer if there is none;
/// decoded lossily so undecodable bytes cannot take the worker down.
fn first_line(raw: &[u8]) -> String {
    let end = raw
        .windows(2)
        .position(|w| w == b"\r\n")
        .unwrap_or(raw.len());
    String::from_utf8_lossy(&raw[..end]).into_owned()
}
