//! Transport seam between the folio clients and the document service.
//!
//! The clients never see `reqwest` directly: they build a [`Request`], hand
//! it to a [`Session`] (which attaches the credential) and interpret the
//! buffered [`Response`] themselves.

pub mod backend;
pub mod error;
mod message;
mod session;

pub use crate::backend::HttpTransport;
#[cfg(any(test, feature = "mock"))]
pub use crate::backend::MockTransport;
pub use crate::backend::Transport;
pub use crate::message::{Credential, Request, Response, StatusClass};
pub use crate::session::{Session, SessionHandle};
pub use reqwest::Url;
use std::sync::Arc;

pub type TransportHandle = Arc<dyn Transport + Send + Sync>;
