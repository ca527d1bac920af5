use crate::row::VersionRow;
use crate::slot::PreviewSlot;
use crate::{BrowseView, DetailView, SearchView};
use folio_catalog::CatalogClient;
use folio_model::{DocId, Document, VersionId};
use folio_preview::{PreviewFetcher, PreviewStore};
use folio_transport::SessionHandle;

/// Everything the views of one signed-in session share.
///
/// Cheap to clone; clones share the same [`PreviewStore`], so a preview
/// loaded in one view shows up in every other view listing that version.
#[derive(Debug, Clone)]
pub struct Browser {
    session: SessionHandle,
    catalog: CatalogClient,
    previews: PreviewStore,
}

impl Browser {
    pub fn new(session: SessionHandle) -> Self {
        let fetcher = PreviewFetcher::new(session.clone());
        Self::with_fetcher(session, fetcher)
    }

    /// Use a preconfigured fetcher (scratch directory, size limit).
    pub fn with_fetcher(session: SessionHandle, fetcher: PreviewFetcher) -> Self {
        Self {
            catalog: CatalogClient::new(session.clone()),
            previews: PreviewStore::new(fetcher),
            session,
        }
    }

    pub fn session(&self) -> &SessionHandle {
        &self.session
    }

    pub fn catalog(&self) -> &CatalogClient {
        &self.catalog
    }

    pub fn previews(&self) -> &PreviewStore {
        &self.previews
    }

    pub fn search_view(&self) -> SearchView {
        SearchView::new(self.clone())
    }

    pub fn detail_view(&self) -> DetailView {
        DetailView::new(self.clone())
    }

    pub fn browse_view(&self) -> BrowseView {
        BrowseView::new(self.clone())
    }

    /// Tear the session down, releasing every preview nothing still shows.
    pub fn end(self) {
        tracing::debug!(previews = self.previews.len(), "Ending browse session");
        self.previews.clear();
    }

    /// Request a preview and render the outcome. Failures become a `Failed` slot.
    pub(crate) async fn preview(&self, doc_id: DocId, version_id: VersionId) -> PreviewSlot {
        match self.previews.request(doc_id, version_id).await {
            Ok(result) => result.into(),
            Err(err) => PreviewSlot::Failed((*err).to_string()),
        }
    }

    pub(crate) fn slot(&self, version_id: VersionId) -> PreviewSlot {
        self.previews.state(version_id).into()
    }

    pub(crate) fn version_rows<'a>(&'a self, document: &'a Document) -> impl Iterator<Item = VersionRow> + 'a {
        let download = self.catalog.download_url(document.doc_id).ok();
        let tags: Vec<String> = document.tag_names().map(str::to_string).collect();
        document.versions.iter().map(move |version| VersionRow {
            doc_id: document.doc_id,
            version_id: version.version_id,
            ver_num: version.ver_num,
            tags: tags.clone(),
            uploaded_by: version.uploaded_by,
            upload_date: version.upload_date,
            download: download.clone(),
            preview: self.slot(version.version_id),
        })
    }

    /// Evict the previews of every version of `documents`.
    pub(crate) fn forget<'a>(&self, documents: impl IntoIterator<Item = &'a Document>) {
        let evicted = documents
            .into_iter()
            .flat_map(|document| &document.versions)
            .filter(|version| self.previews.evict(version.version_id))
            .count();
        if evicted > 0 {
            tracing::debug!(evicted, "Dropped previews of replaced results");
        }
    }
}
