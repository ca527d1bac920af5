use crate::browser::Browser;
use crate::error::{ErrorKind, Result};
use crate::row::VersionRow;
use crate::slot::{Notice, PreviewSlot};
use exn::{OptionExt, ResultExt};
use folio_catalog::{TitleGroups, group_by_title};
use folio_model::{DocId, Document, VersionId};
use tracing::instrument;

/// The whole catalog bucketed by title, one title expanded at a time.
#[derive(Debug)]
pub struct BrowseView {
    browser: Browser,
    groups: TitleGroups,
    selected: Option<String>,
    notice: Option<Notice>,
}

impl BrowseView {
    pub fn new(browser: Browser) -> Self {
        Self {
            browser,
            groups: TitleGroups::default(),
            selected: None,
            notice: None,
        }
    }

    /// Fetch the whole catalog (an empty search) and group it by title.
    ///
    /// The selection survives a reload as long as its title still exists.
    #[instrument(skip(self))]
    pub async fn load(&mut self) -> Result<usize> {
        self.notice = None;
        let outcome = self.browser.catalog().search("").await;
        if let Err(err) = &outcome {
            self.notice = Some(Notice::from(&**err));
        }
        let documents = outcome.or_raise(|| ErrorKind::Catalog)?;
        let total = documents.len();
        self.groups = group_by_title(documents);
        if let Some(title) = &self.selected
            && self.groups.get(title).is_none()
        {
            self.selected = None;
        }
        tracing::debug!(documents = total, titles = self.groups.len(), "Catalog grouped");
        Ok(total)
    }

    /// Titles in first-seen order.
    pub fn titles(&self) -> impl Iterator<Item = &str> {
        self.groups.titles()
    }

    pub fn groups(&self) -> &TitleGroups {
        &self.groups
    }

    /// Expand `title`, dropping the previews of the previously expanded one.
    ///
    /// Selecting the title that is already expanded changes nothing.
    pub fn select(&mut self, title: &str) -> Result<&[Document]> {
        if self.groups.get(title).is_none() {
            exn::bail!(ErrorKind::UnknownTitle(title.to_string()));
        }
        if self.selected.as_deref() == Some(title) {
            return self.selected_documents().ok_or_raise(|| ErrorKind::UnknownTitle(title.to_string()));
        }
        if let Some(previous) = self.selected.take()
            && let Some(documents) = self.groups.get(&previous)
        {
            self.browser.forget(documents);
        }
        self.selected = Some(title.to_string());
        self.selected_documents().ok_or_raise(|| ErrorKind::UnknownTitle(title.to_string()))
    }

    pub fn selected(&self) -> Option<&str> {
        self.selected.as_deref()
    }

    pub fn notice(&self) -> Option<&Notice> {
        self.notice.as_ref()
    }

    /// Every version of every document under the selected title.
    pub fn rows(&self) -> Vec<VersionRow> {
        self.selected_documents()
            .unwrap_or_default()
            .iter()
            .flat_map(|document| self.browser.version_rows(document))
            .collect()
    }

    /// Preview a version of one of the selected title's documents.
    pub async fn preview(&self, doc_id: DocId, version_id: VersionId) -> Result<PreviewSlot> {
        let documents = self.selected_documents().ok_or_raise(|| ErrorKind::NotLoaded)?;
        let document = documents
            .iter()
            .find(|document| document.doc_id == doc_id)
            .ok_or_raise(|| ErrorKind::UnknownDocument(doc_id))?;
        document.version(version_id).ok_or_raise(|| ErrorKind::UnknownVersion(version_id))?;
        Ok(self.browser.preview(doc_id, version_id).await)
    }

    fn selected_documents(&self) -> Option<&[Document]> {
        self.selected.as_deref().and_then(|title| self.groups.get(title))
    }
}
