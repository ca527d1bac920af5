use crate::classify::{PreviewKind, classify};
use crate::error::{ErrorKind, Result};
use crate::result::{ImageRef, PreviewResult};
use exn::ResultExt;
use folio_model::{DocId, VersionId};
use folio_transport::{Request, SessionHandle, StatusClass};
use std::path::{Path, PathBuf};
use tracing::instrument;

/// Retrieves and decodes the preview of a single document version.
///
/// Stateless apart from its settings: two calls for the same version make two
/// requests. Deduplication and caching are the job of the
/// [`PreviewStore`](crate::PreviewStore).
#[derive(Debug, Clone)]
pub struct PreviewFetcher {
    session: SessionHandle,
    scratch_dir: Option<PathBuf>,
    max_bytes: Option<u64>,
}

impl PreviewFetcher {
    pub fn new(session: SessionHandle) -> Self {
        Self {
            session,
            scratch_dir: None,
            max_bytes: None,
        }
    }

    /// Write image previews under `dir` instead of the system temp directory.
    pub fn with_scratch_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.scratch_dir = Some(dir.into());
        self
    }

    /// Refuse preview bodies larger than `limit` bytes.
    ///
    /// The transport buffers whole responses, so the limit is checked once
    /// the body has arrived: it keeps oversized previews out of the scratch
    /// directory and the store, but does not bound memory while downloading.
    /// The transport's request timeout is what caps the download itself.
    pub fn with_max_bytes(mut self, limit: u64) -> Self {
        self.max_bytes = Some(limit);
        self
    }

    pub fn scratch_dir(&self) -> Option<&Path> {
        self.scratch_dir.as_deref()
    }

    /// Fetch `/preview/{doc_id}/{version_id}` and decode it by content type.
    ///
    /// A non-2xx response is always an error, whatever its body; it is never
    /// classified and shown as text.
    #[instrument(skip(self))]
    pub async fn retrieve(&self, doc_id: DocId, version_id: VersionId) -> Result<PreviewResult> {
        let request = Request::get(["preview".to_string(), doc_id.to_string(), version_id.to_string()]);
        let response = self.session.get(&request).await.or_raise(|| ErrorKind::Network)?;
        match response.status_class() {
            StatusClass::Success => {},
            StatusClass::Unauthorized => exn::bail!(ErrorKind::Auth),
            StatusClass::NotFound => exn::bail!(ErrorKind::NotFound(request.to_string())),
            StatusClass::UnsupportedMediaType => exn::bail!(ErrorKind::Unsupported),
            StatusClass::Other(status) => exn::bail!(ErrorKind::HttpStatus(status)),
        }

        let actual = u64::try_from(response.body().len()).unwrap_or(u64::MAX);
        if let Some(limit) = self.max_bytes
            && actual > limit
        {
            exn::bail!(ErrorKind::TooLarge { limit, actual });
        }

        let kind = classify(response.content_type());
        tracing::debug!(?kind, content_type = response.content_type(), bytes = actual, "Decoding preview");
        match kind {
            PreviewKind::Image => {
                let content_type = response.content_type().unwrap_or_default().to_string();
                let body = response.into_body();
                if body.is_empty() {
                    exn::bail!(ErrorKind::Decode);
                }
                let image = ImageRef::materialize(self.scratch_dir(), &content_type, body).await?;
                Ok(PreviewResult::Image(image))
            },
            PreviewKind::Text => {
                String::from_utf8(response.into_body()).map(PreviewResult::Text).or_raise(|| ErrorKind::Decode)
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use folio_transport::{Credential, MockTransport, Response, Session, error::ErrorKind as TransportErrorKind};
    use rstest::rstest;
    use std::sync::Arc;

    const PATH: &str = "/preview/4/12";

    fn fetcher(transport: Arc<MockTransport>) -> PreviewFetcher {
        PreviewFetcher::new(Session::new(transport, Credential::bearer("token")).into_handle())
    }

    async fn retrieve(response: Response) -> Result<PreviewResult> {
        let transport = Arc::new(MockTransport::default().with_route(PATH, response));
        fetcher(transport).retrieve(DocId::new(4), VersionId::new(12)).await
    }

    #[tokio::test]
    async fn test_text_preview() {
        let result = retrieve(Response::ok("text/plain; charset=utf-8", "Quarterly figures")).await.unwrap();
        assert_eq!(result.as_text(), Some("Quarterly figures"));
    }

    #[tokio::test]
    async fn test_missing_content_type_is_text() {
        let result = retrieve(Response::new(200, None, "plain words")).await.unwrap();
        assert_eq!(result.kind(), PreviewKind::Text);
        assert_eq!(result.as_text(), Some("plain words"));
    }

    #[tokio::test]
    async fn test_empty_text_preview() {
        let result = retrieve(Response::ok("text/plain", "")).await.unwrap();
        assert_eq!(result.as_text(), Some(""));
    }

    #[tokio::test]
    async fn test_invalid_utf8_is_decode_error() {
        let err = retrieve(Response::ok("text/plain", vec![0xff, 0xfe, 0x00])).await.unwrap_err();
        assert_eq!(*err, ErrorKind::Decode);
    }

    #[tokio::test]
    async fn test_image_preview_is_materialized() {
        let dir = tempfile::tempdir().unwrap();
        let transport = Arc::new(MockTransport::default().with_route(PATH, Response::ok("image/png", vec![1, 2, 3, 4])));
        let result = fetcher(transport)
            .with_scratch_dir(dir.path())
            .retrieve(DocId::new(4), VersionId::new(12))
            .await
            .unwrap();
        let image = result.as_image().unwrap();
        assert!(image.path().starts_with(dir.path()));
        assert_eq!(std::fs::read(image.path()).unwrap(), [1, 2, 3, 4]);
        assert_eq!(image.content_type(), "image/png");
    }

    #[tokio::test]
    async fn test_empty_image_is_decode_error() {
        let err = retrieve(Response::ok("image/png", Vec::new())).await.unwrap_err();
        assert_eq!(*err, ErrorKind::Decode);
    }

    #[rstest]
    #[case(401, ErrorKind::Auth)]
    #[case(403, ErrorKind::Auth)]
    #[case(404, ErrorKind::NotFound(PATH.to_string()))]
    #[case(415, ErrorKind::Unsupported)]
    #[case(500, ErrorKind::HttpStatus(500))]
    #[case(302, ErrorKind::HttpStatus(302))]
    #[tokio::test]
    async fn test_error_statuses(#[case] status: u16, #[case] expected: ErrorKind) {
        let err = retrieve(Response::new(status, Some("text/plain".to_string()), "not a preview")).await.unwrap_err();
        assert_eq!(*err, expected);
    }

    #[tokio::test]
    async fn test_transport_failure() {
        let transport = Arc::new(MockTransport::default());
        transport.set_failure(PATH, TransportErrorKind::Network("reset".to_string())).await;
        let err = fetcher(transport).retrieve(DocId::new(4), VersionId::new(12)).await.unwrap_err();
        assert_eq!(*err, ErrorKind::Network);
    }

    #[tokio::test]
    async fn test_size_limit() {
        let transport = Arc::new(MockTransport::default().with_route(PATH, Response::ok("text/plain", "0123456789")));
        let fetcher = fetcher(transport);
        let err = fetcher.clone().with_max_bytes(4).retrieve(DocId::new(4), VersionId::new(12)).await.unwrap_err();
        assert_eq!(*err, ErrorKind::TooLarge { limit: 4, actual: 10 });
        let result = fetcher.with_max_bytes(10).retrieve(DocId::new(4), VersionId::new(12)).await.unwrap();
        assert_eq!(result.as_text(), Some("0123456789"));
    }
}
