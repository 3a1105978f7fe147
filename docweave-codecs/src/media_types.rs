//! Extension to media type lookup

const MEDIA_TYPES: &[(&str, &str)] = &[
    ("md", "text/markdown"),
    ("markdown", "text/markdown"),
    ("html", "text/html"),
    ("htm", "text/html"),
    ("jats", "application/jats+xml"),
    ("xml", "application/xml"),
    ("ipynb", "application/x-ipynb+json"),
    ("json", "application/json"),
    ("yaml", "application/yaml"),
    ("yml", "application/yaml"),
    ("txt", "text/plain"),
    ("text", "text/plain"),
    ("pdf", "application/pdf"),
    ("png", "image/png"),
    ("jpg", "image/jpeg"),
    ("jpeg", "image/jpeg"),
    ("gif", "image/gif"),
    ("svg", "image/svg+xml"),
    ("webp", "image/webp"),
    ("mp4", "video/mp4"),
    ("webm", "video/webm"),
    ("ogv", "video/ogg"),
    ("mov", "video/quicktime"),
    ("mp3", "audio/mpeg"),
    ("ogg", "audio/ogg"),
    ("wav", "audio/wav"),
    ("flac", "audio/flac"),
];

/// Media type for an extension name
pub fn from_extension(ext: &str) -> Option<&'static str> {
    MEDIA_TYPES
        .iter()
        .find(|(name, _)| name.eq_ignore_ascii_case(ext))
        .map(|(_, media)| *media)
}

/// First extension registered for a media type, ignoring parameters such as `; charset=utf-8`
pub fn to_extension(media_type: &str) -> Option<&'static str> {
    let essence = media_type.split(';').next().unwrap_or_default().trim();
    MEDIA_TYPES
        .iter()
        .find(|(_, media)| media.eq_ignore_ascii_case(essence))
        .map(|(ext, _)| *ext)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn looks_up_both_ways() {
        assert_eq!(from_extension("yml"), Some("application/yaml"));
        assert_eq!(from_extension("docx"), None);
        assert_eq!(to_extension("text/html; charset=utf-8"), Some("html"));
    }
}
