//! Inline previews of document versions.
//!
//! [`PreviewFetcher`] turns one `/preview/{doc}/{version}` exchange into a
//! [`PreviewResult`]; [`PreviewStore`] tracks the loading state of every
//! version so each is retrieved at most once at a time.

mod classify;
pub mod error;
mod fetcher;
mod result;
mod store;

pub use self::classify::{PreviewKind, classify};
pub use self::fetcher::PreviewFetcher;
pub use self::result::{ImageRef, PreviewResult};
pub use self::store::{PreviewEntry, PreviewState, PreviewStore};
