//! Plain-text rendering of the browse views.

use folio_browse::{PreviewSlot, SearchRow, VersionRow};
use folio_model::Document;
use std::io::{self, Write};
use std::path::Path;

const NONE: &str = "N/A";

pub fn search_row(out: &mut impl Write, row: &SearchRow) -> io::Result<()> {
    writeln!(out, "[{}] {}", row.doc_id, row.title)?;
    if !row.tags.is_empty() {
        writeln!(out, "    tags: {}", row.tags.join(", "))?;
    }
    if row.primary_version.is_none() {
        writeln!(out, "    (no versions)")?;
    }
    Ok(())
}

pub fn document_header(out: &mut impl Write, document: &Document) -> io::Result<()> {
    writeln!(out, "{} [{}]", document.title, document.doc_id)?;
    let tags: Vec<&str> = document.tag_names().collect();
    if !tags.is_empty() {
        writeln!(out, "tags: {}", tags.join(", "))?;
    }
    if document.versions.is_empty() {
        writeln!(out, "No versions found.")?;
    }
    Ok(())
}

pub fn version_row(out: &mut impl Write, row: &VersionRow) -> io::Result<()> {
    writeln!(out, "  Version {} (id {}, document {})", row.ver_num, row.version_id, row.doc_id)?;
    let uploader = row.uploaded_by.map(|user| user.to_string());
    writeln!(out, "    uploaded by: {}", uploader.as_deref().unwrap_or(NONE))?;
    writeln!(out, "    uploaded at: {}", row.uploaded_at().as_deref().unwrap_or(NONE))?;
    writeln!(out, "    tags: {}", if row.tags.is_empty() { "None".to_string() } else { row.tags.join(", ") })?;
    if let Some(download) = &row.download {
        writeln!(out, "    download: {download}")?;
    }
    Ok(())
}

/// Render a preview slot, copying images into `save_dir` when given.
pub fn preview(out: &mut impl Write, slot: &PreviewSlot, save_dir: Option<&Path>) -> io::Result<()> {
    match slot {
        PreviewSlot::Idle => Ok(()),
        PreviewSlot::Loading => writeln!(out, "    preview: loading"),
        PreviewSlot::Failed(message) => writeln!(out, "    preview failed: {message}"),
        PreviewSlot::Text(text) => {
            writeln!(out, "    preview:")?;
            for line in text.lines() {
                writeln!(out, "    | {line}")?;
            }
            Ok(())
        },
        PreviewSlot::Image(image) => match save_dir {
            Some(dir) => {
                let target = dir.join(image.path().file_name().unwrap_or_default());
                std::fs::copy(image.path(), &target)?;
                writeln!(out, "    preview: image saved to {}", target.display())
            },
            None => writeln!(out, "    preview: image at {} (removed on exit)", image.path().display()),
        },
    }
}
