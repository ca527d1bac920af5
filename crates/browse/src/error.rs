//! View Error Types

use derive_more::{Display, Error};
use folio_model::{DocId, VersionId};

/// A view error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for view operations.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Display, Error, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    /// The catalog request behind the view failed. The view carries a [`Notice`](crate::Notice) too.
    #[display("catalog unavailable")]
    Catalog,
    /// Nothing has been loaded into the view yet.
    #[display("nothing loaded")]
    NotLoaded,
    #[display("document {_0} is not in this view")]
    UnknownDocument(#[error(not(source))] DocId),
    #[display("version {_0} is not in this view")]
    UnknownVersion(#[error(not(source))] VersionId),
    #[display("no documents titled {_0:?}")]
    UnknownTitle(#[error(not(source))] String),
    /// The document has no versions, so there is nothing to preview.
    #[display("document {_0} has no versions")]
    NoVersions(#[error(not(source))] DocId),
}

impl ErrorKind {
    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Catalog)
    }
}
