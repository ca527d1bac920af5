/// How a preview body should be presented.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PreviewKind {
    Image,
    Text,
}

/// Decide how to present a preview from its declared content type.
///
/// Anything whose media type starts with `image/` (ignoring case and leading
/// whitespace) is an image. Everything else, including a missing or empty
/// content type, is treated as text.
pub fn classify(content_type: Option<&str>) -> PreviewKind {
    match content_type.map(str::trim_start) {
        Some(declared) if declared.get(..6).is_some_and(|prefix| prefix.eq_ignore_ascii_case("image/")) => {
            PreviewKind::Image
        },
        _ => PreviewKind::Text,
    }
}

/// The bare media type (`type/subtype`), lowercased and stripped of parameters.
pub(crate) fn essence(content_type: &str) -> String {
    content_type.split(';').next().unwrap_or_default().trim().to_ascii_lowercase()
}
