//! Catalog data model.
//!
//! These types mirror what the document service returns from its search,
//! detail and version-history endpoints. They're read-only from the client's
//! point of view: the service owns them, we only deserialize and display them.

mod document;
mod ids;
mod timestamp;

pub use crate::document::{Document, Tag, Version};
pub use crate::ids::{DocId, TagId, UserId, VersionId};
