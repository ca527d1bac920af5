//! HTTP transport backed by `reqwest`.

use super::join;
use crate::error::{ErrorKind, Result};
use crate::message::{Credential, Request, Response};
use crate::Transport;
use async_trait::async_trait;
use exn::ResultExt;
use reqwest::{Client, Url, header::CONTENT_TYPE};
use std::time::Duration;
use tracing::instrument;

/// Talks to a live document service over HTTP(S).
///
/// The underlying [`Client`] pools connections, so construct one transport
/// per service and share it (via [`TransportHandle`](crate::TransportHandle)).
///
/// # Examples
///
/// ```no_run
/// use folio_transport::HttpTransport;
/// use std::time::Duration;
///
/// # fn example() -> folio_transport::error::Result<()> {
/// let base = "http://127.0.0.1:8000".parse().unwrap();
/// let transport = HttpTransport::new(base, Duration::from_secs(30), "folio/dev")?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct HttpTransport {
    name: String,
    base: Url,
    client: Client,
}

impl HttpTransport {
    /// Create a transport rooted at `base`.
    ///
    /// `timeout` bounds each whole exchange. The clients on top never cancel
    /// a request themselves, so this is the only timeout in play.
    pub fn new(base: Url, timeout: Duration, user_agent: &str) -> Result<Self> {
        let client = Client::builder().timeout(timeout).user_agent(user_agent).build().or_raise(|| ErrorKind::Client)?;
        Ok(Self {
            name: base.host_str().unwrap_or("http").to_string(),
            base,
            client,
        })
    }

    /// Change the name used in logs.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }
}

#[async_trait]
impl Transport for HttpTransport {
    fn name(&self) -> &str {
        &self.name
    }

    fn url(&self, request: &Request) -> Result<Url> {
        join(&self.base, request)
    }

    #[instrument(skip(self, credential), fields(transport = %self.name, request = %request))]
    async fn get(&self, request: &Request, credential: &Credential) -> Result<Response> {
        let url = self.url(request)?;
        let response = self
            .client
            .get(url)
            .bearer_auth(credential.expose())
            .send()
            .await
            .or_raise(|| ErrorKind::Network(request.to_string()))?;
        let status = response.status().as_u16();
        let content_type = response.headers().get(CONTENT_TYPE).and_then(|v| v.to_str().ok()).map(str::to_string);
        let body = response.bytes().await.or_raise(|| ErrorKind::Body)?;
        tracing::debug!(status, content_type = content_type.as_deref(), bytes = body.len(), "Received response");
        Ok(Response::new(status, content_type, body.to_vec()))
    }
}
