use folio_catalog::error::ErrorKind as CatalogErrorKind;
use folio_preview::{PreviewResult, PreviewState};
use std::fmt::{Display, Formatter, Result as FmtResult};
use std::path::Path;
use std::sync::Arc;

/// What a row shows in place of its preview.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PreviewSlot {
    Idle,
    Loading,
    Image(ShownImage),
    Text(String),
    /// Retrieval failed; requesting the preview again retries it.
    Failed(String),
}

impl PreviewSlot {
    pub fn is_idle(&self) -> bool {
        matches!(self, Self::Idle)
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, Self::Failed(_))
    }
}

impl From<PreviewState> for PreviewSlot {
    fn from(state: PreviewState) -> Self {
        match state {
            PreviewState::Idle => Self::Idle,
            PreviewState::Loading => Self::Loading,
            PreviewState::Ready(result) => result.into(),
            PreviewState::Failed(kind) => Self::Failed(kind.to_string()),
        }
    }
}

impl From<Arc<PreviewResult>> for PreviewSlot {
    fn from(result: Arc<PreviewResult>) -> Self {
        match &*result {
            PreviewResult::Text(text) => Self::Text(text.clone()),
            PreviewResult::Image(_) => Self::Image(ShownImage(result)),
        }
    }
}

/// An image preview on screen.
///
/// Holds the preview alive, so its file is not deleted while any slot still
/// shows it, even if the store has evicted it meanwhile.
#[derive(Debug, Clone)]
pub struct ShownImage(Arc<PreviewResult>);

impl ShownImage {
    pub fn path(&self) -> &Path {
        match &*self.0 {
            PreviewResult::Image(image) => image.path(),
            PreviewResult::Text(_) => Path::new(""),
        }
    }
}

impl PartialEq for ShownImage {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}
impl Eq for ShownImage {}

/// The single top-level message a view shows when its catalog request fails.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    /// The session's credential was rejected.
    SignInRequired,
    NotFound,
    Unavailable(String),
}

impl From<&CatalogErrorKind> for Notice {
    fn from(kind: &CatalogErrorKind) -> Self {
        match kind {
            CatalogErrorKind::Auth => Self::SignInRequired,
            CatalogErrorKind::NotFound(_) => Self::NotFound,
            other => Self::Unavailable(other.to_string()),
        }
    }
}

impl Display for Notice {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            Self::SignInRequired => f.write_str("Please log in first."),
            Self::NotFound => f.write_str("Document not found."),
            Self::Unavailable(reason) => write!(f, "The document service is unavailable ({reason})."),
        }
    }
}
