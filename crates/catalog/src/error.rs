//! Catalog Error Types
//!
//! This module provides structured errors using `exn` for automatic location
//! tracking and error tree construction.

use derive_more::{Display, Error};

/// A catalog error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for catalog operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Actionable error categories.
///
/// These describe what the caller should *do*, not what went wrong internally.
#[derive(Debug, Display, Error, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    /// The service could not be reached, or the exchange broke off.
    #[display("network error")]
    Network,
    /// The service answered with a non-2xx status not covered by another kind.
    #[display("unexpected response status: {_0}")]
    HttpStatus(#[error(not(source))] u16),
    /// The credential was rejected.
    #[display("authorization rejected")]
    Auth,
    /// The body did not have the expected shape.
    #[display("failed to decode response")]
    Decode,
    /// The requested document (or endpoint) does not exist.
    #[display("not found: {_0}")]
    NotFound(#[error(not(source))] String),
    /// The request could not be expressed as a URL.
    #[display("invalid request")]
    InvalidRequest,
}

impl ErrorKind {
    /// Transport failures and non-2xx statuses both count as network errors.
    pub fn is_network(&self) -> bool {
        matches!(self, Self::Network | Self::HttpStatus(_))
    }

    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Network => true,
            Self::HttpStatus(status) => *status >= 500,
            _ => false,
        }
    }
}
