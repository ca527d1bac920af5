//! Configuration Error Types

use derive_more::{Display, Error};
use std::path::PathBuf;

/// A configuration error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for configuration operations.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Display, Error, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    /// An explicitly requested config file does not exist.
    #[display("config file not found: {}", _0.display())]
    Missing(#[error(not(source))] PathBuf),
    /// A source could not be read or didn't match the expected shape.
    #[display("invalid configuration")]
    Invalid,
    /// The service base URL is unusable.
    #[display("invalid service URL: {_0}")]
    InvalidUrl(#[error(not(source))] String),
    /// A field holds a value outside its allowed range.
    #[display("invalid value for {_0}")]
    OutOfRange(#[error(not(source))] &'static str),
}
