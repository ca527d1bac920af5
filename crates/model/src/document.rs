use crate::ids::{DocId, TagId, UserId, VersionId};
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

/// A named label attached to a [`Document`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Tag {
    pub tag_id: TagId,
    pub name: String,
}

/// One uploaded revision of a [`Document`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Version {
    /// Unique across the whole catalog; the preview key.
    pub version_id: VersionId,
    /// Owning document. Only present on some endpoints.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub doc_id: Option<DocId>,
    /// Increases monotonically within a document.
    pub ver_num: u32,
    #[serde(default)]
    pub uploaded_by: Option<UserId>,
    #[serde(default, with = "crate::timestamp::option")]
    pub upload_date: Option<OffsetDateTime>,
    /// Server-side file name of the uploaded content.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_path: Option<String>,
}

/// A titled, taggable unit holding one or more [`Version`]s.
///
/// The title is **not** an identity: several documents can share one, which
/// is exactly what the grouped browse view is for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    pub doc_id: DocId,
    pub title: String,
    /// The version served by the raw download endpoint.
    #[serde(default)]
    pub current_ver_id: Option<VersionId>,
    #[serde(default)]
    pub tags: Vec<Tag>,
    /// Server-defined order. Never re-sorted client-side.
    #[serde(default)]
    pub versions: Vec<Version>,
}
impl Document {
    /// First version in server order, which is what "open content" previews.
    pub fn primary_version(&self) -> Option<&Version> {
        self.versions.first()
    }

    pub fn version(&self, version_id: VersionId) -> Option<&Version> {
        self.versions.iter().find(|v| v.version_id == version_id)
    }

    pub fn tag_names(&self) -> impl Iterator<Item = &str> {
        self.tags.iter().map(|t| t.name.as_str())
    }

    /// Whether `ver_num` strictly increases across [`versions`](Self::versions).
    ///
    /// Purely diagnostic; a service that breaks this is still displayed as-is.
    pub fn has_increasing_versions(&self) -> bool {
        self.versions.windows(2).all(|pair| pair[0].ver_num < pair[1].ver_num)
    }
}
