//! Response assembly
//!
//! Builds the one-shot wire response for a resolution: status line, the
//! fixed five-header set, then the file bytes. `Content-Length` always
//! comes from a stat, never from loading the file; the body is read only
//! when it will actually be sent.

use super::{Headers, Resolution, Result, Status, CRLF, PROTOCOL, SERVER_SOFTWARE};
use bytes::{BufMut, Bytes, BytesMut};
use std::fs;
use std::path::Path;
use std::time::SystemTime;

/// Content type when the extension maps to nothing known
pub const FALLBACK_CONTENT_TYPE: &str = "application/octet-stream";

/// A fully assembled response, one write away from the wire
#[derive(Debug, Clone)]
pub struct Response {
    status: Status,
    headers: Headers,
    body: Vec<u8>,
}

impl Response {
    /// Build the response for a resolution
    ///
    /// The body is omitted only for a successful non-GET: a HEAD hit gets
    /// the exact headers of the GET it mirrors and nothing else. Error
    /// responses always carry their page, whatever the method was.
    pub fn build(resolution: &Resolution) -> Result<Response> {
        let length = fs::metadata(&resolution.path)?.len();

        let mut headers = Headers::new();
        headers.insert("Date", httpdate::fmt_http_date(SystemTime::now()));
        headers.insert("Server", SERVER_SOFTWARE);
        headers.insert("Content-Length", length.to_string());
        headers.insert("Content-Type", content_type(&resolution.path));
        headers.insert("Connection", "close");

        let body = if resolution.status == Status::OK && resolution.method != "GET" {
            Vec::new()
        } else {
            fs::read(&resolution.path)?
        };

        Ok(Response {
            status: resolution.status,
            headers,
            body,
        })
    }

    /// Status carried on the wire
    pub fn status(&self) -> Status {
        self.status
    }

    /// Response headers in emission order
    pub fn headers(&self) -> &Headers {
        &self.headers
    }

    /// Body bytes (empty for a successful HEAD)
    pub fn body(&self) -> &[u8] {
        &self.body
    }

    /// Serialize into a single wire buffer
    pub fn to_wire(&self) -> Bytes {
        let mut buf = BytesMut::with_capacity(256 + self.body.len());

        // Status line
        buf.put_slice(PROTOCOL.as_bytes());
        buf.put_u8(b' ');
        buf.put_slice(self.status.code().to_string().as_bytes());
        buf.put_u8(b' ');
        buf.put_slice(self.status.reason_phrase().as_bytes());
        buf.put_slice(CRLF.as_bytes());

        // Headers
        for (name, value) in self.headers.iter() {
            buf.put_slice(name.as_bytes());
            buf.put_slice(b": ");
            buf.put_slice(value.as_bytes());
            buf.put_slice(CRLF.as_bytes());
        }

        // Empty line, then the body
        buf.put_slice(CRLF.as_bytes());
        buf.put_slice(&self.body);

        buf.freeze()
    }
}

/// MIME type for a path, guessed from the extension
fn content_type(path: &Path) -> String {
    mime_guess::from_path(path)
        .first_raw()
        .unwrap_or(FALLBACK_CONTENT_TYPE)
        .to_string()
}
