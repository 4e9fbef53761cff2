//! HTTP status codes
//!
//! Only the codes this server actually produces are representable, which
//! keeps the reason-phrase table total: there is no "unknown status" on
//! the wire, ever.

use super::{Error, Result};
use std::fmt;

/// HTTP status code with its canonical reason phrase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Status {
    code: u16,
}

impl Status {
    /// Create a status from a numeric code
    ///
    /// Fails for codes outside the served table; use the associated
    /// constants where the code is known at compile time.
    pub fn new(code: u16) -> Result<Self> {
        match code {
            200 | 400 | 403 | 404 | 405 => Ok(Status { code }),
            _ => Err(Error::InvalidStatus(code)),
        }
    }

    /// Get the numeric code
    pub fn code(&self) -> u16 {
        self.code
    }

    /// Get the canonical reason phrase
    pub fn reason_phrase(&self) -> &'static str {
        match self.code {
            200 => "OK",
            400 => "Bad Request",
            403 => "Forbidden",
            404 => "Not Found",
            405 => "Method Not Allowed",
            _ => "Unknown",
        }
    }

    /// Check if this is a success status (2xx)
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.code)
    }

    /// Check if this is a client error status (4xx)
    pub fn is_client_error(&self) -> bool {
        (400..500).contains(&self.code)
    }

    // Status codes the server can produce
    pub const OK: Status = Status { code: 200 };
    pub const BAD_REQUEST: Status = Status { code: 400 };
    pub const FORBIDDEN: Status = Status { code: 403 };
    pub const NOT_FOUND: Status = Status { code: 404 };
    pub const METHOD_NOT_ALLOWED: Status = Status { code: 405 };
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.code, self.reason_phrase())
    }
}
