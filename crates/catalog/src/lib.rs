//! Catalog access for the document service.
//!
//! [`CatalogClient`] issues the search/detail/version-history requests and
//! returns typed [`Document`](folio_model::Document)s; [`group_by_title`]
//! buckets a result list by title for the grouped browse view. Neither
//! retries, caches, or filters anything on the client side.

mod client;
pub mod error;
mod group;

pub use crate::client::CatalogClient;
pub use crate::group::{TitleGroups, group_by_title};
