use crate::slot::PreviewSlot;
use folio_model::{DocId, UserId, VersionId};
use folio_transport::Url;
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;

/// One search result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchRow {
    pub doc_id: DocId,
    pub title: String,
    pub tags: Vec<String>,
    /// The version "open content" previews, if the document has any.
    pub primary_version: Option<VersionId>,
    pub preview: PreviewSlot,
}

/// One version of a document, as listed by the detail and browse views.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionRow {
    pub doc_id: DocId,
    pub version_id: VersionId,
    pub ver_num: u32,
    pub tags: Vec<String>,
    pub uploaded_by: Option<UserId>,
    pub upload_date: Option<OffsetDateTime>,
    /// Raw download link of the document.
    pub download: Option<Url>,
    pub preview: PreviewSlot,
}

impl VersionRow {
    /// Upload time in RFC 3339, if known.
    pub fn uploaded_at(&self) -> Option<String> {
        self.upload_date.and_then(|date| date.format(&Rfc3339).ok())
    }
}
