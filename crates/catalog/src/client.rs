use crate::error::{ErrorKind, Result};
use exn::{OptionExt, ResultExt};
use folio_model::{DocId, Document, Version};
use folio_transport::{Request, Response, SessionHandle, StatusClass, Url};
use serde::de::DeserializeOwned;
use tracing::instrument;

/// Typed access to the catalog endpoints of the document service.
///
/// Cheap to clone: it only holds the shared [`SessionHandle`].
///
/// # Examples
///
/// ```no_run
/// use folio_catalog::{CatalogClient, error::Result};
/// use folio_transport::SessionHandle;
///
/// async fn titles(session: SessionHandle) -> Result<Vec<String>> {
///     let catalog = CatalogClient::new(session);
///     let documents = catalog.search("").await?;
///     Ok(documents.into_iter().map(|d| d.title).collect())
/// }
/// ```
#[derive(Debug, Clone)]
pub struct CatalogClient {
    session: SessionHandle,
}

impl CatalogClient {
    pub fn new(session: SessionHandle) -> Self {
        Self { session }
    }

    /// Search the catalog.
    ///
    /// An empty query returns the whole catalog. Results come back in
    /// whatever order the service chose; nothing is filtered or re-sorted.
    #[instrument(skip(self))]
    pub async fn search(&self, query: &str) -> Result<Vec<Document>> {
        let request = Request::get(["search"]).with_query("q", query);
        let response = self.exchange(&request).await?;
        let documents: Vec<Document> = decode(&response)?;
        tracing::debug!(results = documents.len(), "Search complete");
        Ok(documents)
    }

    /// Fetch one document with its tags and versions.
    ///
    /// Returns [`NotFound`](ErrorKind::NotFound) if the id doesn't resolve.
    #[instrument(skip(self))]
    pub async fn fetch_detail(&self, doc_id: DocId) -> Result<Document> {
        let request = document_request("document", doc_id);
        let response = self.exchange(&request).await?;
        // Some deployments answer a missing document with `200 null`.
        decode::<Option<Document>>(&response)?.ok_or_raise(|| ErrorKind::NotFound(request.to_string()))
    }

    /// Fetch the version history of a document, in server order.
    #[instrument(skip(self))]
    pub async fn fetch_versions(&self, doc_id: DocId) -> Result<Vec<Version>> {
        let response = self.exchange(&document_request("versions", doc_id)).await?;
        decode(&response)
    }

    /// Link to the raw download of a document's current version.
    ///
    /// Only the URL is built; downloading is left to whatever displays it.
    pub fn download_url(&self, doc_id: DocId) -> Result<Url> {
        self.session.url(&document_request("download", doc_id)).or_raise(|| ErrorKind::InvalidRequest)
    }

    async fn exchange(&self, request: &Request) -> Result<Response> {
        let response = self.session.get(request).await.or_raise(|| ErrorKind::Network)?;
        match response.status_class() {
            StatusClass::Success => Ok(response),
            StatusClass::Unauthorized => {
                tracing::warn!(%request, status = response.status(), "Catalog request rejected");
                exn::bail!(ErrorKind::Auth)
            },
            StatusClass::NotFound => exn::bail!(ErrorKind::NotFound(request.to_string())),
            StatusClass::UnsupportedMediaType | StatusClass::Other(_) => {
                tracing::warn!(%request, status = response.status(), "Catalog request failed");
                exn::bail!(ErrorKind::HttpStatus(response.status()))
            },
        }
    }
}

fn document_request(endpoint: &str, doc_id: DocId) -> Request {
    Request::get([endpoint.to_string(), doc_id.to_string()])
}

fn decode<T: DeserializeOwned>(response: &Response) -> Result<T> {
    serde_json::from_slice(response.body()).or_raise(|| ErrorKind::Decode)
}
