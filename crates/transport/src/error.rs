//! Transport Error Types
//!
//! Structured errors using `exn` for automatic location tracking and error
//! tree construction. These only describe failures to *exchange* a request
//! and response; an unsuccessful HTTP status is still a successful exchange
//! and is interpreted by the calling client.

use derive_more::{Display, Error};

/// A transport error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for transport operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Actionable error categories.
///
/// These describe what the caller should *do*, not what went wrong internally.
#[derive(Debug, Display, Error, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    /// The request could not be turned into a URL for this transport.
    #[display("invalid request: {_0}")]
    InvalidRequest(#[error(not(source))] String),
    /// Connecting, sending, or waiting for the response failed.
    #[display("network error: {_0}")]
    Network(#[error(not(source))] String),
    /// The response arrived but its body could not be read in full.
    #[display("failed to read response body")]
    Body,
    /// The HTTP client itself could not be constructed.
    #[display("failed to build HTTP client")]
    Client,
}

impl ErrorKind {
    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Network(_) | Self::Body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_kind_display() {
        assert_eq!(ErrorKind::Network("connection refused".to_string()).to_string(), "network error: connection refused");
        assert_eq!(ErrorKind::Body.to_string(), "failed to read response body");
    }

    #[test]
    fn error_kind_retryable() {
        assert!(ErrorKind::Network(String::new()).is_retryable());
        assert!(ErrorKind::Body.is_retryable());
        assert!(!ErrorKind::InvalidRequest(String::new()).is_retryable());
        assert!(!ErrorKind::Client.is_retryable());
    }
}
