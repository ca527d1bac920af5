//! Headless views over the folio catalog.
//!
//! Each view holds its own listing and renders rows on demand; previews are
//! shared between all views of a [`Browser`] and always looked up by version.

mod browser;
mod detail;
pub mod error;
mod grouped;
mod row;
mod search;
mod slot;

pub use self::browser::Browser;
pub use self::detail::DetailView;
pub use self::grouped::BrowseView;
pub use self::row::{SearchRow, VersionRow};
pub use self::search::SearchView;
pub use self::slot::{Notice, PreviewSlot, ShownImage};
