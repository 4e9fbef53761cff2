//! Response header assembly
//!
//! An insertion-ordered name/value list with case-insensitive lookups.
//! The server emits one fixed header set per response, so this stays far
//! simpler than a general header map; ordered iteration for the wire
//! writer and first-match lookup for tests are all that is needed.

use super::{Error, Result};

/// Ordered collection of response headers
#[derive(Debug, Clone, Default)]
pub struct Headers {
    headers: Vec<(String, String)>,
}

impl Headers {
    /// Create an empty collection
    pub fn new() -> Self {
        Headers::default()
    }

    /// Append a header, keeping insertion order
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.headers.push((name.into(), value.into()));
    }

    /// Get the first value for a name (case-insensitive)
    pub fn get(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Get the number of headers
    pub fn len(&self) -> usize {
        self.headers.len()
    }

    /// Check if there are no headers
    pub fn is_empty(&self) -> bool {
        self.headers.is_empty()
    }

    /// Iterate over all headers in insertion order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.headers.iter().map(|(n, v)| (n.as_str(), v.as_str()))
    }

    /// Parse a `Name: value` line into its parts
    pub fn parse_header_line(line: &str) -> Result<(String, String)> {
        match line.split_once(':') {
            Some((name, value)) if !name.trim().is_empty() => {
                Ok((name.trim().to_string(), value.trim().to_string()))
            }
            Some(_) => Err(Error::InvalidHeader("Empty header name".to_string())),
            None => Err(Error::InvalidHeader(format!("No colon in header: {}", line))),
        }
    }
}
