use crate::classify::{PreviewKind, essence};
use crate::error::{ErrorKind, Result};
use exn::ResultExt;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

const SCRATCH_PREFIX: &str = "folio-preview-";

/// Decoded preview content for one document version.
#[derive(Debug)]
pub enum PreviewResult {
    /// Image bytes, materialized as a local file a viewer can open.
    Image(ImageRef),
    /// UTF-8 text, shown verbatim.
    Text(String),
}

impl PreviewResult {
    pub fn kind(&self) -> PreviewKind {
        match self {
            Self::Image(_) => PreviewKind::Image,
            Self::Text(_) => PreviewKind::Text,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            Self::Image(_) => None,
        }
    }

    pub fn as_image(&self) -> Option<&ImageRef> {
        match self {
            Self::Image(image) => Some(image),
            Self::Text(_) => None,
        }
    }
}

/// A locally materialized image.
///
/// The file lives for exactly as long as this value: dropping it (or calling
/// [`release`](Self::release)) deletes the file. Shared through an `Arc`, the
/// file therefore survives until the last holder lets go.
#[derive(Debug)]
pub struct ImageRef {
    content_type: String,
    len: u64,
    file: NamedTempFile,
}

impl ImageRef {
    /// Write `bytes` to a fresh scratch file in `dir` (or the system temp dir).
    ///
    /// The extension is derived from the content type so external viewers
    /// recognise the file.
    pub(crate) async fn materialize(dir: Option<&Path>, content_type: &str, bytes: Vec<u8>) -> Result<Self> {
        let dir = dir.map(Path::to_path_buf);
        let suffix = extension_for(content_type);
        let len = u64::try_from(bytes.len()).unwrap_or(u64::MAX);
        let file = tokio::task::spawn_blocking(move || write_scratch(dir.as_deref(), &suffix, &bytes))
            .await
            .or_raise(|| ErrorKind::Scratch)?
            .or_raise(|| ErrorKind::Scratch)?;
        tracing::debug!(path = %file.path().display(), bytes = len, "Materialized preview image");
        Ok(Self {
            content_type: content_type.to_string(),
            len,
            file,
        })
    }

    /// Local path of the image file.
    pub fn path(&self) -> &Path {
        self.file.path()
    }

    pub fn to_path_buf(&self) -> PathBuf {
        self.file.path().to_path_buf()
    }

    pub fn content_type(&self) -> &str {
        &self.content_type
    }

    /// Size of the image in bytes.
    pub fn len(&self) -> u64 {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Delete the backing file now, reporting any failure.
    ///
    /// Dropping an `ImageRef` deletes the file too, but silently.
    pub fn release(self) -> Result<()> {
        let path = self.to_path_buf();
        self.file.close().or_raise(|| ErrorKind::Scratch)?;
        tracing::trace!(path = %path.display(), "Released preview image");
        Ok(())
    }
}

fn write_scratch(dir: Option<&Path>, suffix: &str, bytes: &[u8]) -> std::io::Result<NamedTempFile> {
    let mut builder = tempfile::Builder::new();
    builder.prefix(SCRATCH_PREFIX).suffix(suffix);
    let mut file = match dir {
        Some(dir) => builder.tempfile_in(dir)?,
        None => builder.tempfile()?,
    };
    file.write_all(bytes)?;
    file.flush()?;
    Ok(file)
}

/// File extension (with leading dot) for a content type, or empty if unknown.
fn extension_for(content_type: &str) -> String {
    let essence = essence(content_type);
    let Some(extensions) = mime_guess::get_mime_extensions_str(&essence) else {
        return String::new();
    };
    // Prefer the subtype itself when it is a known extension (`jpeg` over `jfif`).
    let subtype = essence.split('/').nth(1).unwrap_or_default();
    extensions
        .iter()
        .find(|ext| **ext == subtype)
        .or_else(|| extensions.first())
        .map(|ext| format!(".{ext}"))
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("image/png", ".png")]
    #[case("image/jpeg", ".jpeg")]
    #[case("IMAGE/GIF; charset=binary", ".gif")]
    #[case("image/x-made-up", "")]
    fn test_extension_for(#[case] content_type: &str, #[case] expected: &str) {
        assert_eq!(extension_for(content_type), expected);
    }

    #[tokio::test]
    async fn test_materialize_and_release() {
        let dir = tempfile::tempdir().unwrap();
        let image = ImageRef::materialize(Some(dir.path()), "image/png", vec![0x89, b'P', b'N', b'G']).await.unwrap();
        let path = image.to_path_buf();
        assert!(path.starts_with(dir.path()));
        assert!(path.file_name().unwrap().to_string_lossy().starts_with(SCRATCH_PREFIX));
        assert_eq!(path.extension().unwrap(), "png");
        assert_eq!(std::fs::read(&path).unwrap(), [0x89, b'P', b'N', b'G']);
        assert_eq!(image.len(), 4);
        assert_eq!(image.content_type(), "image/png");
        image.release().unwrap();
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn test_drop_deletes_file() {
        let dir = tempfile::tempdir().unwrap();
        let image = ImageRef::materialize(Some(dir.path()), "image/gif", vec![1, 2, 3]).await.unwrap();
        let path = image.to_path_buf();
        assert!(path.exists());
        drop(image);
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn test_missing_scratch_dir() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope");
        let err = ImageRef::materialize(Some(&missing), "image/png", vec![1]).await.unwrap_err();
        assert_eq!(*err, ErrorKind::Scratch);
    }
}
