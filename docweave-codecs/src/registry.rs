//! Codec registry and matcher
//!
//! The registry is an ordered list of codecs. Order is significant: when the matcher has to scan,
//! the first codec that claims the content wins, so remote pseudo-formats come first, document
//! formats next, and generic data formats (json, yaml) and the plain text catch-all last.
//!
//! Resolution, first match wins:
//!
//!     1. A format hint: containing `/` it is a media type, otherwise an extension name.
//!     2. Path-like content (always, when matching for output): file name, extension and media
//!        type derived from the path.
//!     3. URI-like content: a short list of scheme patterns selects a pseudo-format.
//!     4. A codec whose name is exactly the extension name is returned without scanning.
//!     5. Scan: file name, extension, media type, then sniffing when the codec sniffs.

use crate::codec::{Codec, DecodeOptions, EncodeOptions};
use crate::error::CodecError;
use crate::formats;
use crate::media_types;
use crate::vfile::VFile;
use docweave_schema::Node;
use once_cell::sync::Lazy;
use regex::Regex;
use std::fs::File;
use std::io::Read;
use std::path::Path;

/// How much of a file is handed to sniffers
const SNIFF_BYTES: usize = 1024;

/// How much of the content is quoted in `NoCodecMatch`
const SEARCHED_DISPLAY: usize = 64;

static URI: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[a-zA-Z][a-zA-Z0-9+.\-]*://").expect("scheme pattern is valid")
});

static URI_FORMATS: Lazy<Vec<(&'static str, Regex)>> = Lazy::new(|| {
    vec![(
        "http",
        Regex::new(r"^https?://").expect("http pattern is valid"),
    )]
});

static DEFAULT_REGISTRY: Lazy<CodecRegistry> = Lazy::new(CodecRegistry::with_defaults);

/// The process-wide registry of built-in codecs, built on first use
pub fn default_registry() -> &'static CodecRegistry {
    &DEFAULT_REGISTRY
}

/// Whether some built-in codec handles the content or format
pub fn handled(content: Option<&str>, format: Option<&str>) -> bool {
    default_registry().handled(content, format)
}

pub struct CodecRegistry {
    codecs: Vec<Box<dyn Codec>>,
}

/// What the matcher knows about the target after looking at the hints
#[derive(Debug, Default, PartialEq)]
struct Criteria {
    file_name: Option<String>,
    ext_name: Option<String>,
    media_type: Option<String>,
    sniff_text: Option<String>,
}

impl CodecRegistry {
    pub fn new() -> Self {
        CodecRegistry { codecs: Vec::new() }
    }

    /// Register a codec at the end of the scan order
    ///
    /// A codec with the same name is replaced in place, keeping its position.
    pub fn register<C: Codec + 'static>(&mut self, codec: C) {
        let boxed: Box<dyn Codec> = Box::new(codec);
        match self.codecs.iter().position(|c| c.name() == boxed.name()) {
            Some(index) => self.codecs[index] = boxed,
            None => self.codecs.push(boxed),
        }
    }

    pub fn get(&self, name: &str) -> Result<&dyn Codec, CodecError> {
        self.codecs
            .iter()
            .find(|codec| codec.name() == name)
            .map(|codec| codec.as_ref())
            .ok_or_else(|| CodecError::NoCodecMatch {
                searched: name.to_string(),
            })
    }

    pub fn has(&self, name: &str) -> bool {
        self.codecs.iter().any(|codec| codec.name() == name)
    }

    /// Codec names in scan order
    pub fn list_codecs(&self) -> Vec<&str> {
        self.codecs.iter().map(|codec| codec.name()).collect()
    }

    pub fn codecs(&self) -> impl Iterator<Item = &dyn Codec> {
        self.codecs.iter().map(|codec| codec.as_ref())
    }

    /// Resolve exactly one codec for the content and/or format
    ///
    /// `content` is a path, a URI, or the raw content itself. `is_output` treats the content as
    /// a path even when it does not look like one, since output targets usually do not exist yet.
    pub fn match_codec(
        &self,
        content: Option<&str>,
        format: Option<&str>,
        is_output: bool,
    ) -> Result<&dyn Codec, CodecError> {
        let criteria = criteria(content, format, is_output);
        self.match_criteria(&criteria)
            .ok_or_else(|| CodecError::NoCodecMatch {
                searched: searched_display(content, format),
            })
    }

    fn match_criteria(&self, criteria: &Criteria) -> Option<&dyn Codec> {
        tracing::debug!(?criteria, "matching codec");

        if let Some(ext) = &criteria.ext_name {
            if let Ok(codec) = self.get(ext) {
                tracing::debug!(codec = codec.name(), "matched codec by name");
                return Some(codec);
            }
        }

        let codec = self.codecs().find(|codec| criteria_match(*codec, criteria))?;
        tracing::debug!(codec = codec.name(), "matched codec");
        Some(codec)
    }

    pub fn handled(&self, content: Option<&str>, format: Option<&str>) -> bool {
        self.match_codec(content, format, false).is_ok()
    }

    /// Decode a file with the codec matched from the options' format, the file's media type, its
    /// path, or its content
    pub fn decode(&self, file: &VFile, options: &DecodeOptions) -> Result<Node, CodecError> {
        let path = file
            .path
            .as_ref()
            .map(|path| path.to_string_lossy().into_owned());
        let format = options.format.as_deref().or(file.media_type.as_deref());
        // The file is already in memory, so sniff its content rather than re-reading the path
        let mut criteria = match &path {
            Some(path) => criteria(Some(path.as_str()), format, true),
            None => criteria(None, format, false),
        };
        if format.is_none() {
            criteria.sniff_text = Some(file.head(SNIFF_BYTES));
        }
        let codec = self
            .match_criteria(&criteria)
            .ok_or_else(|| CodecError::NoCodecMatch {
                searched: searched_display(path.as_deref(), format),
            })?;
        if !codec.supports_decoding() {
            return Err(CodecError::unsupported(codec.name(), "decoding"));
        }
        codec.decode(file, options)
    }

    /// Encode a node with the codec matched from the options' format or output path
    pub fn encode(&self, node: &Node, options: &EncodeOptions) -> Result<VFile, CodecError> {
        let path = options
            .file_path
            .as_ref()
            .map(|path| path.to_string_lossy().into_owned());
        if path.is_none() && options.format.is_none() {
            return Err(CodecError::MissingTarget);
        }
        let codec = self.match_codec(path.as_deref(), options.format.as_deref(), true)?;
        if !codec.supports_encoding() {
            return Err(CodecError::unsupported(codec.name(), "encoding"));
        }
        codec.encode(node, options)
    }

    /// Create a registry with the built-in codecs in scan order
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();

        registry.register(formats::http::HttpCodec);
        registry.register(formats::jats::JatsCodec);
        registry.register(formats::ipynb::IpynbCodec);
        registry.register(formats::markdown::MarkdownCodec);
        registry.register(formats::html::HtmlCodec);
        registry.register(formats::pdf::PdfCodec);
        registry.register(formats::json::JsonCodec);
        registry.register(formats::yaml::YamlCodec);
        registry.register(formats::txt::TxtCodec);

        registry
    }
}

impl Default for CodecRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}

fn criteria(content: Option<&str>, format: Option<&str>, is_output: bool) -> Criteria {
    if let Some(format) = format {
        return if format.contains('/') {
            Criteria {
                media_type: Some(format.to_lowercase()),
                ..Default::default()
            }
        } else {
            let ext = format.to_lowercase();
            Criteria {
                media_type: media_types::from_extension(&ext).map(str::to_string),
                ext_name: Some(ext),
                ..Default::default()
            }
        };
    }

    let Some(content) = content else {
        return Criteria::default();
    };

    if is_output || is_path(content) {
        let path = Path::new(content);
        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned());
        let ext_name = path
            .extension()
            .map(|ext| ext.to_string_lossy().to_lowercase());
        let media_type = ext_name
            .as_deref()
            .and_then(media_types::from_extension)
            .map(str::to_string);
        let sniff_text = if is_output { None } else { read_head(path) };
        return Criteria {
            file_name,
            ext_name,
            media_type,
            sniff_text,
        };
    }

    if URI.is_match(content) {
        for (name, pattern) in URI_FORMATS.iter() {
            if pattern.is_match(content) {
                return Criteria {
                    ext_name: Some(name.to_string()),
                    ..Default::default()
                };
            }
        }
    }

    Criteria {
        sniff_text: Some(content.to_string()),
        ..Default::default()
    }
}

fn criteria_match(codec: &dyn Codec, criteria: &Criteria) -> bool {
    if let Some(file_name) = &criteria.file_name {
        if codec.file_names().contains(&file_name.as_str()) {
            return true;
        }
    }
    if let Some(ext) = &criteria.ext_name {
        if codec.ext_names().contains(&ext.as_str()) {
            return true;
        }
    }
    if let Some(media_type) = &criteria.media_type {
        if codec
            .media_types()
            .iter()
            .any(|m| m.eq_ignore_ascii_case(media_type))
        {
            return true;
        }
    }
    match &criteria.sniff_text {
        Some(text) if codec.sniffs() => codec.sniff(text),
        _ => false,
    }
}

/// Heuristic: a single line that is not a URI and either exists on disk, contains a path
/// separator, or ends in a short extension
pub fn is_path(content: &str) -> bool {
    if content.is_empty() || content.len() > 1024 || content.contains('\n') {
        return false;
    }
    if URI.is_match(content) {
        return false;
    }
    let path = Path::new(content);
    if path.exists() {
        return true;
    }
    if content.contains(char::is_whitespace) {
        return false;
    }
    if content.contains('/') || content.contains('\\') {
        return true;
    }
    path.extension()
        .map(|ext| {
            let ext = ext.to_string_lossy();
            (1..=10).contains(&ext.len()) && ext.chars().all(|c| c.is_ascii_alphanumeric())
        })
        .unwrap_or(false)
}

fn read_head(path: &Path) -> Option<String> {
    let file = File::open(path).ok()?;
    let mut buffer = Vec::with_capacity(SNIFF_BYTES);
    file.take(SNIFF_BYTES as u64).read_to_end(&mut buffer).ok()?;
    Some(String::from_utf8_lossy(&buffer).into_owned())
}

fn searched_display(content: Option<&str>, format: Option<&str>) -> String {
    let content = content.map(|content| {
        if content.chars().count() > SEARCHED_DISPLAY {
            let truncated: String = content.chars().take(SEARCHED_DISPLAY).collect();
            format!("{truncated}...")
        } else {
            content.to_string()
        }
    });
    match (content, format) {
        (Some(content), Some(format)) => format!("{content}' with format '{format}"),
        (Some(content), None) => content,
        (None, Some(format)) => format.to_string(),
        (None, None) => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct TestCodec;
    impl Codec for TestCodec {
        fn name(&self) -> &str {
            "test"
        }
        fn description(&self) -> &str {
            "Test codec"
        }
        fn ext_names(&self) -> &[&str] {
            &["tst"]
        }
        fn sniffs(&self) -> bool {
            true
        }
        fn sniff(&self, content: &str) -> bool {
            content.starts_with("TEST")
        }
        fn supports_decoding(&self) -> bool {
            true
        }
        fn decode(&self, _file: &VFile, _options: &DecodeOptions) -> Result<Node, CodecError> {
            Ok(Node::from("test"))
        }
    }

    struct OtherCodec;
    impl Codec for OtherCodec {
        fn name(&self) -> &str {
            "other"
        }
        fn ext_names(&self) -> &[&str] {
            &["tst", "oth"]
        }
    }

    #[test]
    fn test_registry_creation() {
        let registry = CodecRegistry::new();
        assert_eq!(registry.codecs.len(), 0);
    }

    #[test]
    fn test_registry_register() {
        let mut registry = CodecRegistry::new();
        registry.register(TestCodec);

        assert!(registry.has("test"));
        assert_eq!(registry.list_codecs(), vec!["test"]);
    }

    #[test]
    fn test_registry_replace_keeps_position() {
        let mut registry = CodecRegistry::new();
        registry.register(TestCodec);
        registry.register(OtherCodec);
        registry.register(TestCodec);

        assert_eq!(registry.list_codecs(), vec!["test", "other"]);
    }

    #[test]
    fn test_registry_get_nonexistent() {
        let registry = CodecRegistry::new();
        match registry.get("nonexistent") {
            Err(CodecError::NoCodecMatch { searched }) => assert_eq!(searched, "nonexistent"),
            _ => panic!("Expected NoCodecMatch error"),
        }
    }

    #[test]
    fn test_scan_order_decides_ties() {
        let mut registry = CodecRegistry::new();
        registry.register(OtherCodec);
        registry.register(TestCodec);

        let codec = registry.match_codec(Some("a.tst"), None, false).unwrap();
        assert_eq!(codec.name(), "other");
    }

    #[test]
    fn test_sniffing_raw_content() {
        let mut registry = CodecRegistry::new();
        registry.register(OtherCodec);
        registry.register(TestCodec);

        let codec = registry
            .match_codec(Some("TEST content\nmore"), None, false)
            .unwrap();
        assert_eq!(codec.name(), "test");
        assert!(!registry.handled(Some("nothing\nhere"), None));
    }

    #[test]
    fn test_decode_rejects_encode_only_codec() {
        let mut registry = CodecRegistry::new();
        registry.register(OtherCodec);

        let file = VFile::text("x").with_path("a.oth");
        match registry.decode(&file, &DecodeOptions::default()) {
            Err(CodecError::UnsupportedOperation { codec, .. }) => assert_eq!(codec, "other"),
            other => panic!("Expected UnsupportedOperation, got {other:?}"),
        }
    }

    #[test]
    fn test_encode_requires_target() {
        let registry = CodecRegistry::new();
        let result = registry.encode(&Node::Null, &EncodeOptions::default());
        assert!(matches!(result, Err(CodecError::MissingTarget)));
    }

    #[test]
    fn test_format_hint_beats_path() {
        let c = criteria(Some("a.md"), Some("application/jats+xml"), false);
        assert_eq!(c.media_type.as_deref(), Some("application/jats+xml"));
        assert_eq!(c.ext_name, None);
        assert_eq!(c.file_name, None);
    }

    #[test]
    fn test_uri_selects_pseudo_format() {
        let c = criteria(Some("https://example.org/a.md"), None, false);
        assert_eq!(c.ext_name.as_deref(), Some("http"));
    }

    #[test]
    fn test_is_path() {
        assert!(is_path("docs/readme"));
        assert!(is_path("paper.jats.xml"));
        assert!(!is_path("https://example.org/a.md"));
        assert!(!is_path("# Title\n\nText"));
        assert!(!is_path("just some words."));
    }

    #[test]
    fn test_searched_is_truncated() {
        let long = "x".repeat(200);
        let searched = searched_display(Some(&long), None);
        assert_eq!(searched.len(), SEARCHED_DISPLAY + 3);
    }
}
