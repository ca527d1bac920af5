use crate::browser::Browser;
use crate::error::{ErrorKind, Result};
use crate::row::VersionRow;
use crate::slot::{Notice, PreviewSlot};
use exn::{OptionExt, ResultExt};
use folio_model::{DocId, Document, VersionId};
use tracing::instrument;

/// One document with its full version list.
#[derive(Debug)]
pub struct DetailView {
    browser: Browser,
    document: Option<Document>,
    notice: Option<Notice>,
}

impl DetailView {
    pub fn new(browser: Browser) -> Self {
        Self {
            browser,
            document: None,
            notice: None,
        }
    }

    /// Load (or reload) `doc_id`, replacing whatever was shown before.
    #[instrument(skip(self))]
    pub async fn load(&mut self, doc_id: DocId) -> Result<&Document> {
        self.document = None;
        self.notice = None;
        let outcome = self.browser.catalog().fetch_detail(doc_id).await;
        if let Err(err) = &outcome {
            self.notice = Some(Notice::from(&**err));
        }
        let document = outcome.or_raise(|| ErrorKind::Catalog)?;
        if !document.has_increasing_versions() {
            tracing::warn!(%doc_id, "Version numbers are not increasing; showing them in service order");
        }
        Ok(self.document.insert(document))
    }

    pub fn document(&self) -> Option<&Document> {
        self.document.as_ref()
    }

    pub fn notice(&self) -> Option<&Notice> {
        self.notice.as_ref()
    }

    /// Exactly the document's versions, in the order the service sent them.
    pub fn rows(&self) -> Vec<VersionRow> {
        self.document.as_ref().map(|document| self.browser.version_rows(document).collect()).unwrap_or_default()
    }

    /// Preview one version of the loaded document.
    pub async fn preview(&self, version_id: VersionId) -> Result<PreviewSlot> {
        let document = self.document.as_ref().ok_or_raise(|| ErrorKind::NotLoaded)?;
        let version = document.version(version_id).ok_or_raise(|| ErrorKind::UnknownVersion(version_id))?;
        Ok(self.browser.preview(document.doc_id, version.version_id).await)
    }
}
