use crate::browser::Browser;
use crate::error::{ErrorKind, Result};
use crate::row::SearchRow;
use crate::slot::{Notice, PreviewSlot};
use exn::{OptionExt, ResultExt};
use folio_model::{DocId, Document};
use tracing::instrument;

/// Free-text search over the catalog.
#[derive(Debug)]
pub struct SearchView {
    browser: Browser,
    query: Option<String>,
    results: Vec<Document>,
    notice: Option<Notice>,
}

impl SearchView {
    pub fn new(browser: Browser) -> Self {
        Self {
            browser,
            query: None,
            results: Vec::new(),
            notice: None,
        }
    }

    /// Run `query` and replace the results with what the service returns.
    ///
    /// Previews of the replaced results are dropped. On failure the results
    /// stay empty and [`notice`](Self::notice) says why.
    #[instrument(skip(self))]
    pub async fn submit(&mut self, query: &str) -> Result<usize> {
        self.browser.forget(&self.results);
        self.results.clear();
        self.notice = None;
        self.query = Some(query.to_string());

        let outcome = self.browser.catalog().search(query).await;
        if let Err(err) = &outcome {
            self.notice = Some(Notice::from(&**err));
        }
        self.results = outcome.or_raise(|| ErrorKind::Catalog)?;
        Ok(self.results.len())
    }

    /// Preview the primary version of a listed document.
    pub async fn open_content(&self, doc_id: DocId) -> Result<PreviewSlot> {
        let document = self.document(doc_id)?;
        let version = document.primary_version().ok_or_raise(|| ErrorKind::NoVersions(doc_id))?;
        Ok(self.browser.preview(doc_id, version.version_id).await)
    }

    pub fn query(&self) -> Option<&str> {
        self.query.as_deref()
    }

    pub fn results(&self) -> &[Document] {
        &self.results
    }

    pub fn notice(&self) -> Option<&Notice> {
        self.notice.as_ref()
    }

    pub fn rows(&self) -> Vec<SearchRow> {
        self.results
            .iter()
            .map(|document| {
                let primary_version = document.primary_version().map(|version| version.version_id);
                SearchRow {
                    doc_id: document.doc_id,
                    title: document.title.clone(),
                    tags: document.tag_names().map(str::to_string).collect(),
                    primary_version,
                    preview: primary_version.map_or(PreviewSlot::Idle, |version_id| self.browser.slot(version_id)),
                }
            })
            .collect()
    }

    fn document(&self, doc_id: DocId) -> Result<&Document> {
        self.results.iter().find(|document| document.doc_id == doc_id).ok_or_raise(|| ErrorKind::UnknownDocument(doc_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{CATALOG, browser};
    use folio_model::VersionId;
    use folio_transport::{Credential, MockTransport, Response};
    use std::sync::Arc;

    #[tokio::test]
    async fn test_submit_lists_results_in_service_order() {
        let transport = Arc::new(MockTransport::default().with_json("/search?q=", CATALOG));
        let mut view = browser(&transport).search_view();
        assert_eq!(view.submit("").await.unwrap(), 3);
        assert_eq!(view.query(), Some(""));
        let rows = view.rows();
        let titles: Vec<_> = rows.iter().map(|row| row.title.as_str()).collect();
        assert_eq!(titles, ["Handbook", "Roadmap", "Handbook"]);
        assert_eq!(rows[0].tags, ["hr", "policy"]);
        assert_eq!(rows[1].primary_version, Some(VersionId::new(21)));
        assert_eq!(rows[2].primary_version, None);
        assert!(rows.iter().all(|row| row.preview.is_idle()));
        assert!(view.notice().is_none());
    }

    #[tokio::test]
    async fn test_open_content_previews_primary_version() {
        let transport = Arc::new(
            MockTransport::default()
                .with_json("/search?q=road", CATALOG)
                .with_route("/preview/2/21", Response::ok("text/plain", "Q3 goals")),
        );
        let mut view = browser(&transport).search_view();
        view.submit("road").await.unwrap();
        let slot = view.open_content(DocId::new(2)).await.unwrap();
        assert_eq!(slot, PreviewSlot::Text("Q3 goals".to_string()));
        assert_eq!(view.rows()[1].preview, slot);

        // Served from the store the second time.
        view.open_content(DocId::new(2)).await.unwrap();
        assert_eq!(transport.calls("/preview/2/21").await, 1);
    }

    #[tokio::test]
    async fn test_open_content_without_versions() {
        let transport = Arc::new(MockTransport::default().with_json("/search?q=", CATALOG));
        let mut view = browser(&transport).search_view();
        view.submit("").await.unwrap();
        let err = view.open_content(DocId::new(3)).await.unwrap_err();
        assert_eq!(*err, ErrorKind::NoVersions(DocId::new(3)));
        let err = view.open_content(DocId::new(42)).await.unwrap_err();
        assert_eq!(*err, ErrorKind::UnknownDocument(DocId::new(42)));
    }

    #[tokio::test]
    async fn test_new_search_drops_previous_previews() {
        let transport = Arc::new(
            MockTransport::default()
                .with_json("/search?q=", CATALOG)
                .with_json("/search?q=none", "[]")
                .with_route("/preview/1/11", Response::ok("text/plain", "welcome")),
        );
        let browser = browser(&transport);
        let mut view = browser.search_view();
        view.submit("").await.unwrap();
        view.open_content(DocId::new(1)).await.unwrap();
        assert_eq!(browser.previews().len(), 1);

        assert_eq!(view.submit("none").await.unwrap(), 0);
        assert!(browser.previews().is_empty());
        assert!(view.rows().is_empty());
    }

    #[tokio::test]
    async fn test_catalog_failure_sets_notice() {
        let transport = Arc::new(
            MockTransport::default().with_credential(Credential::bearer("someone-else")).with_json("/search?q=", CATALOG),
        );
        let mut view = browser(&transport).search_view();
        let err = view.submit("").await.unwrap_err();
        assert_eq!(*err, ErrorKind::Catalog);
        assert_eq!(view.notice(), Some(&Notice::SignInRequired));
        assert!(view.results().is_empty());
    }

    #[tokio::test]
    async fn test_failed_preview_shows_in_row_and_retries() {
        let transport = Arc::new(
            MockTransport::default()
                .with_json("/search?q=", CATALOG)
                .with_route("/preview/1/11", Response::status_only(415)),
        );
        let mut view = browser(&transport).search_view();
        view.submit("").await.unwrap();
        assert!(view.open_content(DocId::new(1)).await.unwrap().is_failed());
        assert!(view.rows()[0].preview.is_failed());

        transport.set_route("/preview/1/11", Response::ok("text/plain", "ok now")).await;
        assert_eq!(view.open_content(DocId::new(1)).await.unwrap(), PreviewSlot::Text("ok now".to_string()));
        assert_eq!(transport.calls("/preview/1/11").await, 2);
    }
}
