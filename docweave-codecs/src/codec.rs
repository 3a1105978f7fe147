//! Codec trait definition
//!
//! Every format implements [`Codec`]: a bidirectional bridge between a [`VFile`] and the
//! canonical [`Node`] tree, plus the metadata the matcher uses to pick it.
//!
//! Metadata
//!
//!     - `media_types`, `ext_names`, `file_names`: tested in that order by the matcher.
//!     - `sniffs` / `sniff`: content inspection, only tried when the metadata missed.
//!
//! Codecs hold no per-call state. Anything a call needs (output path, standalone flag, math
//! converter, fetcher) arrives through [`DecodeOptions`] or [`EncodeOptions`], so one codec value
//! can serve every thread.

use crate::error::CodecError;
use crate::fetch::Fetcher;
use crate::math::MathConverter;
use crate::vfile::VFile;
use docweave_schema::Node;
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

pub trait Codec: Send + Sync {
    /// Short name, also the key for the matcher's fast path (e.g. "md", "jats")
    fn name(&self) -> &str;

    fn description(&self) -> &str {
        ""
    }

    fn media_types(&self) -> &[&str] {
        &[]
    }

    fn ext_names(&self) -> &[&str] {
        &[]
    }

    /// Exact file names this codec claims regardless of extension
    fn file_names(&self) -> &[&str] {
        &[]
    }

    fn sniffs(&self) -> bool {
        false
    }

    /// Whether `content` (or the head of a file) looks like this format
    fn sniff(&self, _content: &str) -> bool {
        false
    }

    fn supports_decoding(&self) -> bool {
        false
    }

    fn supports_encoding(&self) -> bool {
        false
    }

    fn decode(&self, _file: &VFile, _options: &DecodeOptions) -> Result<Node, CodecError> {
        Err(CodecError::unsupported(self.name(), "decoding"))
    }

    fn encode(&self, _node: &Node, _options: &EncodeOptions) -> Result<VFile, CodecError> {
        Err(CodecError::unsupported(self.name(), "encoding"))
    }
}

#[derive(Clone, Default)]
pub struct DecodeOptions {
    /// Explicit format, overriding the file's path and media type
    pub format: Option<String>,
    /// Network access for remote content; without one the `http` codec refuses to decode
    pub fetcher: Option<Arc<dyn Fetcher>>,
}

impl fmt::Debug for DecodeOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DecodeOptions")
            .field("format", &self.format)
            .field("fetcher", &self.fetcher.is_some())
            .finish()
    }
}

#[derive(Clone)]
pub struct EncodeOptions {
    pub file_path: Option<PathBuf>,
    pub format: Option<String>,
    /// Wrap HTML output in a complete document
    pub standalone: bool,
    /// Column to wrap markdown at, 0 for no wrapping
    pub markdown_width: usize,
    pub pdf: PdfOptions,
    /// Converter for non-TeX math; defaults to [`crate::math::DefaultMathConverter`]
    pub math: Option<Arc<dyn MathConverter>>,
}

impl Default for EncodeOptions {
    fn default() -> Self {
        Self {
            file_path: None,
            format: None,
            standalone: true,
            markdown_width: 0,
            pdf: PdfOptions::default(),
            math: None,
        }
    }
}

impl fmt::Debug for EncodeOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EncodeOptions")
            .field("file_path", &self.file_path)
            .field("format", &self.format)
            .field("standalone", &self.standalone)
            .field("markdown_width", &self.markdown_width)
            .field("pdf", &self.pdf)
            .field("math", &self.math.is_some())
            .finish()
    }
}

impl EncodeOptions {
    pub fn to_format(format: impl Into<String>) -> Self {
        Self {
            format: Some(format.into()),
            ..Default::default()
        }
    }

    pub fn to_path(path: impl Into<PathBuf>) -> Self {
        Self {
            file_path: Some(path.into()),
            ..Default::default()
        }
    }

    pub fn math_converter(&self) -> Arc<dyn MathConverter> {
        self.math
            .clone()
            .unwrap_or_else(|| Arc::new(crate::math::DefaultMathConverter))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PdfOptions {
    /// Browser executable; searched for on `PATH` when unset
    pub browser: Option<PathBuf>,
    pub timeout: Duration,
}

impl Default for PdfOptions {
    fn default() -> Self {
        Self {
            browser: None,
            timeout: Duration::from_secs(30),
        }
    }
}
