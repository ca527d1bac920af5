//! Preview Error Types
//!
//! This module provides structured errors using `exn` for automatic location
//! tracking and error tree construction.
//!
//! [`ErrorKind`] is `Clone` on purpose: the [`PreviewStore`](crate::PreviewStore)
//! keeps the kind of a failed retrieval per version and hands a fresh error
//! to every caller that was waiting on it.

use derive_more::{Display, Error};

/// A preview error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for preview operations.
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
    /// The body is unreadable as the kind it was classified as.
    #[display("preview content could not be decoded")]
    Decode,
    /// The version (or its stored file) does not exist.
    #[display("not found: {_0}")]
    NotFound(#[error(not(source))] String),
    /// The service refuses to preview this type of file.
    #[display("preview not supported for this file type")]
    Unsupported,
    /// The body exceeds the configured preview size limit.
    #[display("preview of {actual} bytes exceeds the {limit} byte limit")]
    TooLarge { limit: u64, actual: u64 },
    /// The downloaded image could not be written to the scratch directory.
    #[display("failed to store preview locally")]
    Scratch,
    /// The retrieval this request was attached to vanished without an outcome.
    #[display("preview retrieval abandoned")]
    Abandoned,
}

impl ErrorKind {
    /// Transport failures and non-2xx statuses both count as network errors.
    pub fn is_network(&self) -> bool {
        matches!(self, Self::Network | Self::HttpStatus(_))
    }

    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Network | Self::Scratch | Self::Abandoned => true,
            Self::HttpStatus(status) => *status >= 500,
            _ => false,
        }
    }
}
