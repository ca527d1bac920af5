//! Transport trait and implementations.
//!
//! This module defines the [`Transport`] trait, the single place where the
//! folio clients touch the network. Everything above it (status handling,
//! decoding, classification) is transport-agnostic, which is what lets the
//! [`MockTransport`] drive the real client code in tests.

mod http;
#[cfg(any(test, feature = "mock"))]
mod mock;

pub use self::http::HttpTransport;
#[cfg(any(test, feature = "mock"))]
pub use self::mock::MockTransport;
use crate::error::{ErrorKind, Result};
use crate::message::{Credential, Request, Response};
use async_trait::async_trait;
use exn::OptionExt;
use reqwest::Url;

/// Unified interface for reaching the document service.
///
/// Implementations exchange one buffered request/response pair per call and
/// never retry: retry policy (if any) belongs to whoever calls the client.
/// A non-2xx status is *not* an error at this level.
///
/// # Examples
///
/// ```no_run
/// use folio_transport::{Credential, Request, Transport, error::Result};
///
/// async fn catalog_size(transport: &dyn Transport, credential: &Credential) -> Result<usize> {
///     let response = transport.get(&Request::get(["search"]).with_query("q", ""), credential).await?;
///     Ok(response.body().len())
/// }
/// ```
#[async_trait]
pub trait Transport: Send + Sync {
    /// Name of the configured transport (used for logging only).
    fn name(&self) -> &str;

    /// Absolute URL the request resolves to.
    ///
    /// Used both internally and to hand out links the client never fetches
    /// itself (raw downloads).
    fn url(&self, request: &Request) -> Result<Url>;

    /// Perform a `GET`, attaching `credential` as a bearer token.
    async fn get(&self, request: &Request, credential: &Credential) -> Result<Response>;
}

/// Append the request's segments and query to `base`.
///
/// Segments are percent-encoded individually, so an identifier or title can
/// never introduce extra path components.
pub(crate) fn join(base: &Url, request: &Request) -> Result<Url> {
    let mut url = base.clone();
    {
        let mut segments =
            url.path_segments_mut().ok().ok_or_raise(|| ErrorKind::InvalidRequest(format!("cannot-be-a-base URL: {base}")))?;
        segments.pop_if_empty().extend(request.segments());
    }
    if !request.query().is_empty() {
        url.query_pairs_mut().extend_pairs(request.query());
    }
    Ok(url)
}
