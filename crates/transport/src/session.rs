use crate::error::Result;
use crate::message::{Credential, Request, Response};
use crate::TransportHandle;
use reqwest::Url;
use std::fmt::{Debug, Formatter, Result as FmtResult};
use std::sync::Arc;

/// Shared handle to a [`Session`].
pub type SessionHandle = Arc<Session>;

/// An authenticated connection to the document service.
///
/// Built once (after the external login flow has issued a credential) and
/// shared by handle with every client that talks to the service. Whoever
/// manages login/logout owns its lifecycle; dropping the last handle is all
/// "logging out" means at this level.
pub struct Session {
    transport: TransportHandle,
    credential: Credential,
}
impl Session {
    pub fn new(transport: TransportHandle, credential: Credential) -> Self {
        Self { transport, credential }
    }

    pub fn into_handle(self) -> SessionHandle {
        Arc::new(self)
    }

    pub fn transport(&self) -> &TransportHandle {
        &self.transport
    }

    /// Perform an authenticated `GET`.
    pub async fn get(&self, request: &Request) -> Result<Response> {
        self.transport.get(request, &self.credential).await
    }

    /// Resolve a request to an absolute URL without performing it.
    pub fn url(&self, request: &Request) -> Result<Url> {
        self.transport.url(request)
    }
}
impl Debug for Session {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("Session")
            .field("transport", &self.transport.name())
            .field("credential", &self.credential)
            .finish()
    }
}
